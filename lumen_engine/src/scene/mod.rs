/// Scene module - scene graph, renderable objects and mesh data

pub mod mesh;
pub mod renderable;
pub mod dynamic_mesh;
pub mod scene;

pub use mesh::*;
pub use renderable::*;
pub use dynamic_mesh::*;
pub use scene::*;
