/*!
# Lumen Engine

Core of the Lumen real-time renderer.

The engine drives a Vulkan-style device through the `GraphicsDevice` trait and
never touches a graphics API directly; backends (see
`lumen_engine_renderer_vulkan`) implement the trait.

## Architecture

- **Renderer**: context that opens windows and creates scenes
- **Window**: presentation surface with one frame slot per swapchain image
- **Scene**: arena of nodes owning renderable objects
- **RenderableObject**: drawable content with cached secondary command lists
- **PipelineState**: named graphics pipeline, rebuilt with its window
- **BufferAllocator**: memory-type search and buffer backing
*/

// Internal modules
mod error;
mod engine;
mod renderer;
pub mod log;
pub mod config;
pub mod device;
pub mod memory;
pub mod pipeline;
pub mod surface;
pub mod scene;

// Main lumen namespace module
pub mod lumen {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging entry point
    pub use crate::engine::Engine;

    // Renderer context
    pub use crate::renderer::Renderer;

    pub use crate::config::RendererConfig;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod device {
        pub use crate::device::*;
    }

    pub mod memory {
        pub use crate::memory::*;
    }

    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    pub mod surface {
        pub use crate::surface::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
