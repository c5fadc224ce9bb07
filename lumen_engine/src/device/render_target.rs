/// Images, render passes and framebuffers

use bitflags::bitflags;
use crate::error::Result;
use crate::device::{ImageHandle, ImageViewHandle, RenderPassHandle, FramebufferHandle};

/// Two-dimensional size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel and vertex attribute formats
///
/// Names follow the Vulkan format names. `Other` carries a raw backend value
/// for formats the engine does not need to name (e.g. exotic surface formats).
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    UNDEFINED,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    D16_UNORM_S8_UINT,
    D24_UNORM_S8_UINT,
    D32_SFLOAT_S8_UINT,
    D32_SFLOAT,
    R32G32B32_SFLOAT,
    Other(i32),
}

impl Format {
    /// True for combined depth/stencil formats
    pub fn has_stencil(&self) -> bool {
        matches!(
            self,
            Format::D16_UNORM_S8_UINT | Format::D24_UNORM_S8_UINT | Format::D32_SFLOAT_S8_UINT
        )
    }

    /// True for any format with a depth component
    pub fn has_depth(&self) -> bool {
        self.has_stencil() || *self == Format::D32_SFLOAT
    }
}

/// Surface color space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonlinear,
    Other(i32),
}

/// Format + color space pair supported by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub format: Format,
    pub color_space: ColorSpace,
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    /// Undefined layout (initial state, contents discarded)
    Undefined,
    /// Layout for color attachment
    ColorAttachment,
    /// Layout for depth/stencil attachment
    DepthStencilAttachment,
    /// Layout for presenting to the surface
    PresentSrc,
}

bitflags! {
    /// Image aspects addressed by a view or barrier (bit values match Vulkan)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageAspectFlags: u32 {
        const COLOR = 0x1;
        const DEPTH = 0x2;
        const STENCIL = 0x4;
    }
}

bitflags! {
    /// Image usage flags (bit values match Vulkan)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsageFlags: u32 {
        const TRANSFER_SRC = 0x1;
        const TRANSFER_DST = 0x2;
        const SAMPLED = 0x4;
        const COLOR_ATTACHMENT = 0x10;
        const DEPTH_STENCIL_ATTACHMENT = 0x20;
    }
}

/// 2D, single-mip, single-layer, single-sample, optimally tiled image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDesc {
    pub extent: Extent2D,
    pub format: Format,
    pub usage: ImageUsageFlags,
}

/// View over the single mip/layer of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageViewDesc {
    pub image: ImageHandle,
    pub format: Format,
    pub aspect: ImageAspectFlags,
}

/// Load operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    /// Load existing content
    Load,
    /// Clear the content
    Clear,
    /// Don't care about existing content
    DontCare,
}

/// Store operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Store the rendered content
    Store,
    /// Don't care about storing the content
    DontCare,
}

/// Descriptor for a single attachment in a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDesc {
    pub format: Format,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

/// Single-subpass render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPassDesc {
    /// Attachments in framebuffer order
    pub attachments: Vec<AttachmentDesc>,
    /// Index of the color attachment
    pub color_attachment: u32,
    /// Index of the depth/stencil attachment, if any
    pub depth_attachment: Option<u32>,
}

/// Framebuffer descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferDesc {
    pub render_pass: RenderPassHandle,
    /// Views in the same order as the render pass attachments
    pub attachments: Vec<ImageViewHandle>,
    pub extent: Extent2D,
}

/// Image, render pass and framebuffer creation
pub trait RenderTargetDevice {
    /// True when `format` supports depth/stencil attachment with optimal tiling
    fn supports_depth_stencil_format(&self, format: Format) -> bool;

    fn create_image(&self, desc: &ImageDesc) -> Result<ImageHandle>;
    fn destroy_image(&self, image: ImageHandle);

    fn create_image_view(&self, desc: &ImageViewDesc) -> Result<ImageViewHandle>;
    fn destroy_image_view(&self, view: ImageViewHandle);

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<RenderPassHandle>;
    fn destroy_render_pass(&self, render_pass: RenderPassHandle);

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<FramebufferHandle>;
    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle);
}
