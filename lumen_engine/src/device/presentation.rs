/// Surfaces, swapchains and presentation

use raw_window_handle::{
    HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
};
use crate::error::Result;
use crate::device::{
    Extent2D, SurfaceFormat, ImageUsageFlags,
    ImageHandle, SemaphoreHandle, SurfaceHandle, SwapchainHandle,
};

/// Presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    Immediate,
    Mailbox,
    Fifo,
    FifoRelaxed,
}

/// Surface limits reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_image_count: u32,
    /// Zero means no upper limit
    pub max_image_count: u32,
    /// `None` when the surface size is decided by the swapchain extent
    pub current_extent: Option<Extent2D>,
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
}

/// Swapchain descriptor
///
/// Images are created exclusive to one queue, with identity transform, opaque
/// composite alpha and clipping enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapchainDesc {
    pub surface: SurfaceHandle,
    pub min_image_count: u32,
    pub format: SurfaceFormat,
    pub extent: Extent2D,
    pub present_mode: PresentMode,
    pub usage: ImageUsageFlags,
}

/// Result of an image acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Image `index` acquired, swapchain matches the surface
    Ready(u32),
    /// Image `index` acquired but the swapchain should be rebuilt
    Suboptimal(u32),
    /// Nothing acquired; the swapchain must be rebuilt
    OutOfDate,
}

/// Result of a presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    Suboptimal,
    OutOfDate,
}

/// Anything that can hand out raw OS window handles
///
/// Implemented for every `raw-window-handle` window (winit included). The
/// source must outlive every surface created from it.
pub trait SurfaceSource {
    fn raw_display_handle(&self) -> Result<RawDisplayHandle>;
    fn raw_window_handle(&self) -> Result<RawWindowHandle>;
}

impl<T: HasDisplayHandle + HasWindowHandle + ?Sized> SurfaceSource for T {
    fn raw_display_handle(&self) -> Result<RawDisplayHandle> {
        self.display_handle()
            .map(|handle| handle.as_raw())
            .map_err(|e| crate::engine_config_err!("lumen::Surface", "Failed to get display handle: {}", e))
    }

    fn raw_window_handle(&self) -> Result<RawWindowHandle> {
        self.window_handle()
            .map(|handle| handle.as_raw())
            .map_err(|e| crate::engine_config_err!("lumen::Surface", "Failed to get window handle: {}", e))
    }
}

/// Surface and swapchain operations
pub trait PresentationDevice {
    /// Create an OS presentation surface for a window
    fn create_surface(&self, display: RawDisplayHandle, window: RawWindowHandle) -> Result<SurfaceHandle>;
    fn destroy_surface(&self, surface: SurfaceHandle);

    /// True when the device queue can present to `surface`
    fn surface_present_support(&self, surface: SurfaceHandle) -> Result<bool>;
    fn surface_capabilities(&self, surface: SurfaceHandle) -> Result<SurfaceCapabilities>;
    fn surface_formats(&self, surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>>;
    fn surface_present_modes(&self, surface: SurfaceHandle) -> Result<Vec<PresentMode>>;

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle>;
    fn destroy_swapchain(&self, swapchain: SwapchainHandle);
    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>>;

    /// Request the next image; `signal` fires once it is ready for rendering
    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        timeout: u64,
        signal: SemaphoreHandle,
    ) -> Result<AcquireOutcome>;

    /// Present `image_index` once every `wait` semaphore has fired
    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait: &[SemaphoreHandle],
    ) -> Result<PresentOutcome>;
}
