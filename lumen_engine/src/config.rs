//! Renderer configuration

use std::path::PathBuf;
use crate::device::Format;

/// Configuration shared by the renderer context and every window it opens
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Application name reported to the graphics driver
    pub app_name: String,
    /// Directory holding one sub-directory of shader binaries per pipeline name
    pub pipeline_root: PathBuf,
    /// Buffered image count requested from the surface (clamped to its limits)
    pub preferred_slot_count: u32,
    /// Color attachment clear value (RGBA)
    pub clear_color: [f32; 4],
    /// Depth attachment clear value
    pub clear_depth: f32,
    /// Stencil attachment clear value
    pub clear_stencil: u32,
    /// Depth/stencil formats tried in order when building a surface
    pub depth_format_candidates: Vec<Format>,
    /// Image acquisition timeout in nanoseconds
    pub acquire_timeout: u64,
    /// Enable the backend validation layers (only honored when the backend
    /// is compiled with its `vulkan-validation` feature)
    pub enable_validation: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Lumen Application".to_string(),
            pipeline_root: PathBuf::from("pipelines"),
            preferred_slot_count: 2,
            clear_color: [0.10, 0.15, 0.20, 1.0],
            clear_depth: 1.0,
            clear_stencil: 0,
            depth_format_candidates: vec![
                Format::D32_SFLOAT_S8_UINT,
                Format::D24_UNORM_S8_UINT,
                Format::D16_UNORM_S8_UINT,
            ],
            acquire_timeout: u64::MAX,
            enable_validation: cfg!(debug_assertions),
        }
    }
}
