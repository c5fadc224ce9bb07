/// The complete device interface consumed by the engine

use crate::device::{
    MemoryDevice, CommandDevice, QueueDevice, PresentationDevice,
    RenderTargetDevice, PipelineDevice,
};

/// A logical device with one graphics/present queue
///
/// Backends implement the six capability traits; this trait is blanket
/// implemented on top of them and is what the engine holds as
/// `Arc<dyn GraphicsDevice>`.
pub trait GraphicsDevice:
    MemoryDevice
    + CommandDevice
    + QueueDevice
    + PresentationDevice
    + RenderTargetDevice
    + PipelineDevice
    + Send
    + Sync
{
}

impl<T> GraphicsDevice for T where
    T: MemoryDevice
        + CommandDevice
        + QueueDevice
        + PresentationDevice
        + RenderTargetDevice
        + PipelineDevice
        + Send
        + Sync
{
}
