/// Dynamic mesh - triangle mesh whose vertices and polygons are edited on the CPU
///
/// Both buffers live in HOST_VISIBLE | HOST_COHERENT memory so that `update`
/// is a plain copy with no staging buffer and no flush. Vertex and polygon
/// counts are fixed at creation.

use crate::error::Result;
use crate::device::{
    GraphicsDevice, CommandDevice, CommandListHandle, BufferUsageFlags,
    MemoryPropertyFlags, IndexType,
};
use crate::memory::{BufferAllocator, DeviceBuffer};
use crate::scene::{MeshData, MeshVertex, MeshPolygon, Renderable};
use crate::engine_invalid_err;

/// Memory properties of CPU-updated mesh buffers
pub const DYNAMIC_MESH_MEMORY: MemoryPropertyFlags =
    MemoryPropertyFlags::HOST_VISIBLE.union(MemoryPropertyFlags::HOST_COHERENT);

pub struct DynamicMesh {
    vertices: Vec<MeshVertex>,
    polygons: Vec<MeshPolygon>,
    vertex_buffer: DeviceBuffer,
    index_buffer: DeviceBuffer,
}

impl DynamicMesh {
    /// Copy the mesh, create both buffers and upload the initial data
    pub fn new(allocator: &BufferAllocator, mesh: &MeshData) -> Result<Self> {
        mesh.validate()?;

        let vertex_bytes = std::mem::size_of_val(mesh.vertices.as_slice()) as u64;
        let index_bytes = std::mem::size_of_val(mesh.polygons.as_slice()) as u64;

        let vertex_buffer = allocator.create_buffer(
            vertex_bytes,
            BufferUsageFlags::VERTEX_BUFFER,
            DYNAMIC_MESH_MEMORY,
        )?;
        vertex_buffer.write_pod(0, &mesh.vertices)?;

        // vertex_buffer is dropped (and released) if this fails
        let index_buffer = allocator.create_buffer(
            index_bytes,
            BufferUsageFlags::INDEX_BUFFER,
            DYNAMIC_MESH_MEMORY,
        )?;
        index_buffer.write_pod(0, &mesh.polygons)?;

        Ok(Self {
            vertices: mesh.vertices.clone(),
            polygons: mesh.polygons.clone(),
            vertex_buffer,
            index_buffer,
        })
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    /// Editable vertices; changes reach the GPU on the next `update`
    pub fn vertices_mut(&mut self) -> &mut [MeshVertex] {
        &mut self.vertices
    }

    pub fn set_vertex(&mut self, index: usize, vertex: MeshVertex) -> Result<()> {
        let count = self.vertices.len();
        let slot = self.vertices.get_mut(index).ok_or_else(|| engine_invalid_err!(
            "lumen::DynamicMesh",
            "Vertex index {} out of range (mesh has {} vertices)",
            index, count
        ))?;
        *slot = vertex;
        Ok(())
    }

    pub fn polygons(&self) -> &[MeshPolygon] {
        &self.polygons
    }

    /// Editable polygons; checked and uploaded on the next `update`
    pub fn polygons_mut(&mut self) -> &mut [MeshPolygon] {
        &mut self.polygons
    }

    pub fn set_polygon(&mut self, index: usize, polygon: MeshPolygon) -> Result<()> {
        let vertex_count = self.vertices.len() as u32;
        if let Some(&id) = polygon.vertex_ids.iter().find(|&&id| id >= vertex_count) {
            return Err(engine_invalid_err!("lumen::DynamicMesh",
                "Polygon references vertex {} (mesh has {} vertices)", id, vertex_count));
        }
        let count = self.polygons.len();
        let slot = self.polygons.get_mut(index).ok_or_else(|| engine_invalid_err!(
            "lumen::DynamicMesh",
            "Polygon index {} out of range (mesh has {} polygons)",
            index, count
        ))?;
        *slot = polygon;
        Ok(())
    }

    pub fn polygon_count(&self) -> u32 {
        self.polygons.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.polygon_count() * 3
    }

    pub fn vertex_buffer(&self) -> &DeviceBuffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &DeviceBuffer {
        &self.index_buffer
    }
}

impl Renderable for DynamicMesh {
    /// Copy the vertices and polygons into their buffers
    ///
    /// Nothing is written when a polygon references a missing vertex.
    fn update(&mut self) -> Result<()> {
        let vertex_count = self.vertices.len() as u32;
        if let Some((index, polygon)) = self.polygons
            .iter()
            .enumerate()
            .find(|(_, polygon)| polygon.vertex_ids.iter().any(|&id| id >= vertex_count))
        {
            return Err(engine_invalid_err!("lumen::DynamicMesh",
                "Polygon {} {:?} references a vertex outside 0..{}",
                index, polygon.vertex_ids, vertex_count));
        }
        self.vertex_buffer.write_pod(0, &self.vertices)?;
        self.index_buffer.write_pod(0, &self.polygons)
    }

    fn record(&self, device: &dyn GraphicsDevice, list: CommandListHandle) -> Result<()> {
        device.cmd_bind_vertex_buffer(list, 0, self.vertex_buffer.buffer(), 0);
        device.cmd_bind_index_buffer(list, self.index_buffer.buffer(), 0, IndexType::U32);
        device.cmd_draw_indexed(list, self.index_count(), 1, 0, 0, 0);
        Ok(())
    }
}

impl std::fmt::Debug for DynamicMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicMesh")
            .field("vertices", &self.vertices.len())
            .field("polygons", &self.polygons.len())
            .field("vertex_buffer", &self.vertex_buffer.buffer())
            .field("index_buffer", &self.index_buffer.buffer())
            .finish()
    }
}
