/// Pipeline module - shader binary loading and per-window pipeline states

pub mod shader_loader;
pub mod pipeline_state;

pub use shader_loader::{ShaderBinaries, ShaderLoader, FileShaderLoader, InMemoryShaderLoader};
pub use pipeline_state::{PipelineState, default_pipeline_desc};
