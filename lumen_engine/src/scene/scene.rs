/// Scene graph - an arena of nodes, each owning renderable objects
///
/// Nodes and objects live in `slotmap` arenas and are addressed by stable
/// keys. Traversal is always depth-first: a node's own objects in insertion
/// order, then its children in insertion order.

use std::sync::Arc;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::device::{GraphicsDevice, CommandListHandle};
use crate::memory::BufferAllocator;
use crate::scene::{MeshData, DynamicMesh, RenderableKind, RenderableObject};
use crate::{engine_debug, engine_invalid_err, engine_trace};

new_key_type! {
    /// Key of a scene node
    pub struct SceneNodeKey;
    /// Key of a renderable object
    pub struct RenderableKey;
}

/// Creation parameters of a renderable object
#[derive(Debug, Clone, Copy)]
pub enum RenderableDesc<'a> {
    DynamicMesh(&'a MeshData),
}

#[derive(Debug, Default)]
struct SceneNode {
    parent: Option<SceneNodeKey>,
    children: Vec<SceneNodeKey>,
    objects: Vec<RenderableKey>,
}

pub struct Scene {
    device: Arc<dyn GraphicsDevice>,
    allocator: BufferAllocator,
    nodes: SlotMap<SceneNodeKey, SceneNode>,
    objects: SlotMap<RenderableKey, RenderableObject>,
    root: SceneNodeKey,
}

impl Scene {
    /// Empty scene with a root node
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        let allocator = BufferAllocator::new(Arc::clone(&device));
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::default());
        Self {
            device,
            allocator,
            nodes,
            objects: SlotMap::with_key(),
            root,
        }
    }

    pub fn root(&self) -> SceneNodeKey {
        self.root
    }

    pub fn allocator(&self) -> &BufferAllocator {
        &self.allocator
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn contains_node(&self, node: SceneNodeKey) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn parent(&self, node: SceneNodeKey) -> Option<SceneNodeKey> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Children of `node` in insertion order (empty for an unknown key)
    pub fn children(&self, node: SceneNodeKey) -> &[SceneNodeKey] {
        self.nodes.get(node).map_or(&[], |n| n.children.as_slice())
    }

    /// Objects owned by `node` in insertion order (empty for an unknown key)
    pub fn objects_of(&self, node: SceneNodeKey) -> &[RenderableKey] {
        self.nodes.get(node).map_or(&[], |n| n.objects.as_slice())
    }

    pub fn object(&self, key: RenderableKey) -> Option<&RenderableObject> {
        self.objects.get(key)
    }

    pub fn object_mut(&mut self, key: RenderableKey) -> Option<&mut RenderableObject> {
        self.objects.get_mut(key)
    }

    /// Add a child node under `parent`
    pub fn create_child_scene(&mut self, parent: SceneNodeKey) -> Result<SceneNodeKey> {
        if !self.nodes.contains_key(parent) {
            return Err(engine_invalid_err!("lumen::Scene", "Unknown parent node {:?}", parent));
        }
        let child = self.nodes.insert(SceneNode {
            parent: Some(parent),
            ..SceneNode::default()
        });
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        Ok(child)
    }

    /// Build a renderable object and append it to `node`'s objects
    ///
    /// On failure nothing is added and every resource created for the object
    /// is released.
    pub fn create_renderable_object(&mut self, node: SceneNodeKey, desc: RenderableDesc<'_>) -> Result<RenderableKey> {
        if !self.nodes.contains_key(node) {
            return Err(engine_invalid_err!("lumen::Scene", "Unknown node {:?}", node));
        }

        let kind = match desc {
            RenderableDesc::DynamicMesh(mesh) => {
                RenderableKind::DynamicMesh(DynamicMesh::new(&self.allocator, mesh)?)
            }
        };
        let object = RenderableObject::new(Arc::clone(&self.device), kind)?;

        let key = self.objects.insert(object);
        if let Some(n) = self.nodes.get_mut(node) {
            n.objects.push(key);
        }
        engine_trace!("lumen::Scene", "Created renderable {:?} in node {:?}", key, node);
        Ok(key)
    }

    pub fn create_dynamic_mesh(&mut self, node: SceneNodeKey, mesh: &MeshData) -> Result<RenderableKey> {
        self.create_renderable_object(node, RenderableDesc::DynamicMesh(mesh))
    }

    /// Remove an object from its node and release it
    pub fn remove_object(&mut self, key: RenderableKey) -> Result<()> {
        if self.objects.remove(key).is_none() {
            return Err(engine_invalid_err!("lumen::Scene", "Unknown renderable {:?}", key));
        }
        for node in self.nodes.values_mut() {
            node.objects.retain(|&k| k != key);
        }
        Ok(())
    }

    /// Remove a node, its objects and every descendant node
    ///
    /// The root cannot be removed.
    pub fn remove_node(&mut self, node: SceneNodeKey) -> Result<()> {
        if node == self.root {
            return Err(engine_invalid_err!("lumen::Scene", "The root node cannot be removed"));
        }
        let parent = match self.nodes.get(node) {
            Some(n) => n.parent,
            None => return Err(engine_invalid_err!("lumen::Scene", "Unknown node {:?}", node)),
        };
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.retain(|&c| c != node);
        }

        let mut pending = vec![node];
        let mut removed_nodes = 0usize;
        let mut removed_objects = 0usize;
        while let Some(key) = pending.pop() {
            if let Some(removed) = self.nodes.remove(key) {
                removed_nodes += 1;
                for object in removed.objects {
                    if self.objects.remove(object).is_some() {
                        removed_objects += 1;
                    }
                }
                pending.extend(removed.children);
            }
        }

        engine_debug!("lumen::Scene", "Removed {} nodes and {} objects", removed_nodes, removed_objects);
        Ok(())
    }

    /// Update every object of the whole scene
    pub fn update(&mut self) -> Result<()> {
        self.update_node(self.root)
    }

    /// Update `node`'s objects, then its children's, depth first
    pub fn update_node(&mut self, node: SceneNodeKey) -> Result<()> {
        let (objects, children) = self.node_lists(node)?;
        for key in objects {
            if let Some(object) = self.objects.get_mut(key) {
                object.update()?;
            }
        }
        for child in children {
            self.update_node(child)?;
        }
        Ok(())
    }

    /// Append the active command list of every bound object in the scene
    ///
    /// Objects without a surface or pipeline are skipped.
    pub fn collect_command_lists(&mut self, out: &mut Vec<CommandListHandle>, force_rebuild: bool) -> Result<()> {
        self.collect_node_command_lists(self.root, out, force_rebuild)
    }

    /// Same as `collect_command_lists`, starting at `node`
    pub fn collect_node_command_lists(
        &mut self,
        node: SceneNodeKey,
        out: &mut Vec<CommandListHandle>,
        force_rebuild: bool,
    ) -> Result<()> {
        let (objects, children) = self.node_lists(node)?;
        for key in objects {
            if let Some(object) = self.objects.get_mut(key) {
                if object.is_bound() {
                    out.push(object.get_active_command_list(force_rebuild)?);
                }
            }
        }
        for child in children {
            self.collect_node_command_lists(child, out, force_rebuild)?;
        }
        Ok(())
    }

    fn node_lists(&self, node: SceneNodeKey) -> Result<(Vec<RenderableKey>, Vec<SceneNodeKey>)> {
        self.nodes
            .get(node)
            .map(|n| (n.objects.clone(), n.children.clone()))
            .ok_or_else(|| engine_invalid_err!("lumen::Scene", "Unknown node {:?}", node))
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("objects", &self.objects.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
