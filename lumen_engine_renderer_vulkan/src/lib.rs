/*!
# Lumen Engine - Vulkan Backend

Vulkan implementation of the `GraphicsDevice` trait of `lumen_engine`, built
on the Ash bindings. Engine handles carry raw Vulkan handles, so the
conversions in this crate are free.

Validation layers and the debug messenger are compiled in only with the
`vulkan-validation` feature; messages are routed into the engine logger.
*/

mod vulkan_context;
mod vulkan_format;
mod vulkan_device;
mod vulkan_command;
mod vulkan_presentation;
mod vulkan_render_target;
mod vulkan_pipeline;
#[cfg(feature = "vulkan-validation")]
mod debug;

// Main lumen namespace module
pub mod lumen {
    pub use crate::vulkan_device::VulkanGraphicsDevice;

    #[cfg(feature = "vulkan-validation")]
    pub use crate::debug::{get_validation_stats, ValidationStats};
}
