/// Device module - backend-neutral GPU interface consumed by the engine

pub mod handles;
pub mod memory;
pub mod render_target;
pub mod command;
pub mod presentation;
pub mod pipeline;
pub mod graphics_device;

pub use handles::*;
pub use memory::*;
pub use render_target::*;
pub use command::*;
pub use presentation::*;
pub use pipeline::*;
pub use graphics_device::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
