/// Renderable objects - drawable scene content with cached secondary lists
///
/// Each object records one secondary command list per frame slot of the
/// surface it is bound to, and keeps them until something they depend on
/// changes: the bound surface, the bound pipeline, the surface's render
/// targets (a new `SurfaceTargets` generation) or the pipeline's GPU objects
/// (a new `PipelineState` generation).

use std::sync::Arc;
use crate::error::Result;
use crate::device::{
    GraphicsDevice, CommandDevice, CommandPoolHandle, CommandListHandle, CommandListLevel,
    CommandListBegin, CommandListInheritance,
};
use crate::pipeline::PipelineState;
use crate::surface::SurfaceTargets;
use crate::scene::DynamicMesh;
use crate::{engine_invalid_err, engine_trace};

/// Capabilities every renderable variant provides
pub trait Renderable {
    /// Push CPU-side state to GPU-visible memory
    fn update(&mut self) -> Result<()>;

    /// Record the variant's draw commands into a secondary list whose
    /// pipeline is already bound
    fn record(&self, device: &dyn GraphicsDevice, list: CommandListHandle) -> Result<()>;
}

/// Closed set of renderable variants
#[derive(Debug)]
pub enum RenderableKind {
    DynamicMesh(DynamicMesh),
}

impl RenderableKind {
    fn as_renderable(&self) -> &dyn Renderable {
        match self {
            RenderableKind::DynamicMesh(mesh) => mesh,
        }
    }

    fn as_renderable_mut(&mut self) -> &mut dyn Renderable {
        match self {
            RenderableKind::DynamicMesh(mesh) => mesh,
        }
    }
}

impl Renderable for RenderableKind {
    fn update(&mut self) -> Result<()> {
        self.as_renderable_mut().update()
    }

    fn record(&self, device: &dyn GraphicsDevice, list: CommandListHandle) -> Result<()> {
        self.as_renderable().record(device, list)
    }
}

/// A renderable variant plus its surface/pipeline binding and list cache
pub struct RenderableObject {
    device: Arc<dyn GraphicsDevice>,
    kind: RenderableKind,
    surface: Option<Arc<SurfaceTargets>>,
    pipeline: Option<Arc<PipelineState>>,
    dirty: bool,
    command_pool: CommandPoolHandle,
    command_lists: Vec<CommandListHandle>,
    recorded_generation: u64,
    recorded_pipeline_generation: u64,
    rebuild_count: u64,
}

impl RenderableObject {
    /// Wrap `kind` and create the object's private command pool
    pub(crate) fn new(device: Arc<dyn GraphicsDevice>, kind: RenderableKind) -> Result<Self> {
        let command_pool = device.create_command_pool()?;
        Ok(Self {
            device,
            kind,
            surface: None,
            pipeline: None,
            dirty: true,
            command_pool,
            command_lists: Vec::new(),
            recorded_generation: 0,
            recorded_pipeline_generation: 0,
            rebuild_count: 0,
        })
    }

    pub fn kind(&self) -> &RenderableKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut RenderableKind {
        &mut self.kind
    }

    /// The mesh, when this object is a dynamic mesh
    pub fn as_dynamic_mesh(&self) -> Option<&DynamicMesh> {
        match &self.kind {
            RenderableKind::DynamicMesh(mesh) => Some(mesh),
        }
    }

    pub fn as_dynamic_mesh_mut(&mut self) -> Option<&mut DynamicMesh> {
        match &mut self.kind {
            RenderableKind::DynamicMesh(mesh) => Some(mesh),
        }
    }

    pub fn surface(&self) -> Option<&Arc<SurfaceTargets>> {
        self.surface.as_ref()
    }

    pub fn pipeline(&self) -> Option<&Arc<PipelineState>> {
        self.pipeline.as_ref()
    }

    /// Bind the object to a window's render targets
    pub fn set_surface(&mut self, surface: Arc<SurfaceTargets>) {
        if self.surface.as_ref().is_some_and(|current| Arc::ptr_eq(current, &surface)) {
            return;
        }
        self.surface = Some(surface);
        self.dirty = true;
    }

    /// Bind the object to a pipeline
    pub fn set_pipeline(&mut self, pipeline: Arc<PipelineState>) {
        if self.pipeline.as_ref().is_some_and(|current| Arc::ptr_eq(current, &pipeline)) {
            return;
        }
        self.pipeline = Some(pipeline);
        self.dirty = true;
    }

    /// True when both a surface and a pipeline are bound
    pub fn is_bound(&self) -> bool {
        self.surface.is_some() && self.pipeline.is_some()
    }

    /// True when the cached lists must be re-recorded before use
    pub fn is_dirty(&self) -> bool {
        self.dirty
            || self.surface
                .as_ref()
                .is_some_and(|surface| surface.generation() != self.recorded_generation)
            || self.pipeline
                .as_ref()
                .is_some_and(|pipeline| pipeline.generation() != self.recorded_pipeline_generation)
    }

    /// Number of times the lists have been recorded
    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Cached lists, one per frame slot of the last recording
    pub fn command_lists(&self) -> &[CommandListHandle] {
        &self.command_lists
    }

    pub fn update(&mut self) -> Result<()> {
        self.kind.update()
    }

    /// The list to execute for the surface's current frame slot
    ///
    /// Re-records every slot first when the cache is dirty, when
    /// `force_rebuild` is set, or when the surface or the pipeline was rebuilt
    /// since the last recording.
    pub fn get_active_command_list(&mut self, force_rebuild: bool) -> Result<CommandListHandle> {
        let surface = self.surface.as_ref().ok_or_else(|| engine_invalid_err!(
            "lumen::RenderableObject",
            "Renderable object has no surface bound"
        ))?;
        let snapshot = surface.snapshot()?;

        if force_rebuild
            || self.is_dirty()
            || snapshot.slot_count() as usize != self.command_lists.len()
        {
            self.rebuild_command_lists()?;
        }

        self.command_lists
            .get(snapshot.current_slot as usize)
            .copied()
            .ok_or_else(|| engine_invalid_err!(
                "lumen::RenderableObject",
                "Frame slot {} has no recorded command list ({} recorded)",
                snapshot.current_slot, self.command_lists.len()
            ))
    }

    /// Re-record one secondary list per frame slot of the bound surface
    ///
    /// The object stays dirty if any step fails.
    pub fn rebuild_command_lists(&mut self) -> Result<()> {
        self.dirty = true;

        let (surface, pipeline) = match (&self.surface, &self.pipeline) {
            (Some(surface), Some(pipeline)) => (surface, pipeline),
            _ => {
                return Err(engine_invalid_err!(
                    "lumen::RenderableObject",
                    "Cannot record: surface bound {}, pipeline bound {}",
                    self.surface.is_some(), self.pipeline.is_some()
                ));
            }
        };
        let snapshot = surface.snapshot()?;
        let pipeline_generation = pipeline.generation();
        let pipeline_handle = pipeline.handle()?;

        if self.command_lists.len() != snapshot.framebuffers.len() {
            if !self.command_lists.is_empty() {
                self.device.free_command_lists(self.command_pool, &self.command_lists);
                self.command_lists.clear();
            }
            self.command_lists = self.device.allocate_command_lists(
                self.command_pool,
                CommandListLevel::Secondary,
                snapshot.slot_count(),
            )?;
        }

        let device = self.device.as_ref();
        for (&list, &framebuffer) in self.command_lists.iter().zip(&snapshot.framebuffers) {
            let begin = CommandListBegin::render_pass_continue(CommandListInheritance {
                render_pass: snapshot.render_pass,
                subpass: 0,
                framebuffer,
            });
            device.begin_command_list(list, &begin)?;
            device.cmd_bind_pipeline(list, pipeline_handle);
            self.kind.record(device, list)?;
            device.end_command_list(list)?;
        }

        self.recorded_generation = snapshot.generation;
        self.recorded_pipeline_generation = pipeline_generation;
        self.rebuild_count += 1;
        self.dirty = false;

        engine_trace!("lumen::RenderableObject",
            "Recorded {} secondary lists for '{}' (generation {})",
            self.command_lists.len(), pipeline.name(), snapshot.generation);
        Ok(())
    }
}

impl Drop for RenderableObject {
    fn drop(&mut self) {
        // Destroying the pool frees its lists
        self.device.destroy_command_pool(self.command_pool);
    }
}

impl std::fmt::Debug for RenderableObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderableObject")
            .field("kind", &self.kind)
            .field("bound", &self.is_bound())
            .field("dirty", &self.dirty)
            .field("command_lists", &self.command_lists)
            .field("rebuild_count", &self.rebuild_count)
            .finish()
    }
}

#[cfg(test)]
#[path = "renderable_tests.rs"]
mod tests;
