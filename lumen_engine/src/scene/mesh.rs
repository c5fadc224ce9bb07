/// Mesh data - CPU-side geometry handed to renderable objects

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use crate::error::Result;
use crate::engine_config_err;

/// Vertex: a 3×f32 position (12 bytes, matches the pipeline vertex stride)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: Vec3,
}

impl MeshVertex {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { position: Vec3::new(x, y, z) }
    }
}

/// Triangle: three indices into the vertex list
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct MeshPolygon {
    pub vertex_ids: [u32; 3],
}

impl MeshPolygon {
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { vertex_ids: [a, b, c] }
    }
}

/// Vertex and polygon lists of one mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub polygons: Vec<MeshPolygon>,
}

impl MeshData {
    pub fn new(vertices: Vec<MeshVertex>, polygons: Vec<MeshPolygon>) -> Self {
        Self { vertices, polygons }
    }

    /// Single triangle: (0,-1), (-1,1), (1,1) at depth 0.5
    pub fn triangle() -> Self {
        Self {
            vertices: vec![
                MeshVertex::new(0.0, -1.0, 0.5),
                MeshVertex::new(-1.0, 1.0, 0.5),
                MeshVertex::new(1.0, 1.0, 0.5),
            ],
            polygons: vec![MeshPolygon::new(0, 1, 2)],
        }
    }

    /// Number of indices drawn (3 per polygon)
    pub fn index_count(&self) -> u32 {
        self.polygons.len() as u32 * 3
    }

    /// Require at least one polygon and only in-range vertex ids
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() || self.polygons.is_empty() {
            return Err(engine_config_err!("lumen::MeshData",
                "Mesh needs at least one vertex and one polygon ({} vertices, {} polygons)",
                self.vertices.len(), self.polygons.len()));
        }
        let vertex_count = self.vertices.len() as u32;
        if let Some((index, polygon)) = self.polygons
            .iter()
            .enumerate()
            .find(|(_, polygon)| polygon.vertex_ids.iter().any(|&id| id >= vertex_count))
        {
            return Err(engine_config_err!("lumen::MeshData",
                "Polygon {} {:?} references a vertex outside 0..{}",
                index, polygon.vertex_ids, vertex_count));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_vertex_layout_is_twelve_bytes() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 12);
        assert_eq!(std::mem::size_of::<MeshPolygon>(), 12);
    }

    #[test]
    fn test_triangle() {
        let mesh = MeshData::triangle();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.index_count(), 3);
        assert_eq!(mesh.vertices[0].position, Vec3::new(0.0, -1.0, 0.5));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_out_of_range() {
        assert!(matches!(MeshData::default().validate(), Err(Error::ConfigurationError(_))));

        let mut mesh = MeshData::triangle();
        mesh.polygons.push(MeshPolygon::new(0, 1, 3));
        assert!(matches!(mesh.validate(), Err(Error::ConfigurationError(_))));
    }
}
