/// Opaque device object handles
///
/// Every object created through a `GraphicsDevice` is named by a small `Copy`
/// handle. The value is backend-defined (the Vulkan backend stores the raw
/// `VkXxx` handle); zero is reserved for "no object".

macro_rules! define_handle {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $name(u64);

            impl $name {
                /// The null handle
                pub const NULL: Self = Self(0);

                /// Wrap a raw backend value
                pub const fn from_raw(raw: u64) -> Self {
                    Self(raw)
                }

                /// Raw backend value
                pub const fn as_raw(self) -> u64 {
                    self.0
                }

                /// True for the null handle
                pub const fn is_null(self) -> bool {
                    self.0 == 0
                }
            }
        )*
    };
}

define_handle! {
    /// GPU buffer object
    BufferHandle;
    /// Device memory allocation
    MemoryHandle;
    /// Image (swapchain image or depth target)
    ImageHandle;
    /// View over an image
    ImageViewHandle;
    /// Command list pool
    CommandPoolHandle;
    /// Primary or secondary command list
    CommandListHandle;
    /// GPU-GPU synchronization signal
    SemaphoreHandle;
    /// GPU-CPU synchronization signal
    FenceHandle;
    /// OS presentation surface
    SurfaceHandle;
    /// Buffered image chain
    SwapchainHandle;
    /// Render-target configuration
    RenderPassHandle;
    /// Attachment set bound to a render pass
    FramebufferHandle;
    /// Compiled shader stage
    ShaderModuleHandle;
    /// Pipeline resource layout
    PipelineLayoutHandle;
    /// Graphics pipeline object
    PipelineHandle;
}
