/// Surfaces, swapchains and presentation for VulkanGraphicsDevice

use ash::vk;
use ash::vk::Handle;
use raw_window_handle::{RawDisplayHandle, RawWindowHandle};
use lumen_engine::lumen::Result;
use lumen_engine::lumen::device::{
    PresentationDevice, SurfaceCapabilities, SurfaceFormat, PresentMode, SwapchainDesc,
    AcquireOutcome, PresentOutcome, ImageHandle, SemaphoreHandle, SurfaceHandle, SwapchainHandle,
};
use lumen_engine::{engine_err, engine_trace};

use crate::vulkan_device::VulkanGraphicsDevice;
use crate::vulkan_format::{
    capabilities_from_vk, color_space_to_vk, extent_to_vk, format_to_vk, present_mode_from_vk,
    present_mode_to_vk, surface_format_from_vk,
};

fn surface(handle: SurfaceHandle) -> vk::SurfaceKHR {
    vk::SurfaceKHR::from_raw(handle.as_raw())
}

fn swapchain(handle: SwapchainHandle) -> vk::SwapchainKHR {
    vk::SwapchainKHR::from_raw(handle.as_raw())
}

impl PresentationDevice for VulkanGraphicsDevice {
    fn create_surface(&self, display: RawDisplayHandle, window: RawWindowHandle) -> Result<SurfaceHandle> {
        let surface = unsafe {
            ash_window::create_surface(&self.context.entry, &self.context.instance, display, window, None)
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to create surface: {:?}", e))?;
        Ok(SurfaceHandle::from_raw(surface.as_raw()))
    }

    fn destroy_surface(&self, handle: SurfaceHandle) {
        unsafe { self.context.surface_loader.destroy_surface(surface(handle), None) };
    }

    fn surface_present_support(&self, handle: SurfaceHandle) -> Result<bool> {
        unsafe {
            self.context.surface_loader.get_physical_device_surface_support(
                self.context.physical_device,
                self.context.queue_family,
                surface(handle),
            )
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to query surface support: {:?}", e))
    }

    fn surface_capabilities(&self, handle: SurfaceHandle) -> Result<SurfaceCapabilities> {
        let caps = unsafe {
            self.context.surface_loader
                .get_physical_device_surface_capabilities(self.context.physical_device, surface(handle))
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to query surface capabilities: {:?}", e))?;
        Ok(capabilities_from_vk(&caps))
    }

    fn surface_formats(&self, handle: SurfaceHandle) -> Result<Vec<SurfaceFormat>> {
        let formats = unsafe {
            self.context.surface_loader
                .get_physical_device_surface_formats(self.context.physical_device, surface(handle))
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to query surface formats: {:?}", e))?;
        Ok(formats.iter().map(surface_format_from_vk).collect())
    }

    fn surface_present_modes(&self, handle: SurfaceHandle) -> Result<Vec<PresentMode>> {
        let modes = unsafe {
            self.context.surface_loader
                .get_physical_device_surface_present_modes(self.context.physical_device, surface(handle))
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to query present modes: {:?}", e))?;
        Ok(modes.into_iter().filter_map(present_mode_from_vk).collect())
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle> {
        let info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface(desc.surface))
            .min_image_count(desc.min_image_count)
            .image_format(format_to_vk(desc.format.format))
            .image_color_space(color_space_to_vk(desc.format.color_space))
            .image_extent(extent_to_vk(desc.extent))
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::from_raw(desc.usage.bits()))
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(vk::SurfaceTransformFlagsKHR::IDENTITY)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode_to_vk(desc.present_mode))
            .clipped(true);

        let created = unsafe { self.context.swapchain_loader.create_swapchain(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create swapchain: {:?}", e))?;
        engine_trace!("lumen::vulkan", "Created swapchain {}x{} ({} images requested)",
            desc.extent.width, desc.extent.height, desc.min_image_count);
        Ok(SwapchainHandle::from_raw(created.as_raw()))
    }

    fn destroy_swapchain(&self, handle: SwapchainHandle) {
        unsafe { self.context.swapchain_loader.destroy_swapchain(swapchain(handle), None) };
    }

    fn swapchain_images(&self, handle: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        let images = unsafe { self.context.swapchain_loader.get_swapchain_images(swapchain(handle)) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to get swapchain images: {:?}", e))?;
        Ok(images.into_iter().map(|image| ImageHandle::from_raw(image.as_raw())).collect())
    }

    fn acquire_next_image(
        &self,
        handle: SwapchainHandle,
        timeout: u64,
        signal: SemaphoreHandle,
    ) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.context.swapchain_loader.acquire_next_image(
                swapchain(handle),
                timeout,
                vk::Semaphore::from_raw(signal.as_raw()),
                vk::Fence::null(),
            )
        };
        match result {
            Ok((index, false)) => Ok(AcquireOutcome::Ready(index)),
            Ok((index, true)) => Ok(AcquireOutcome::Suboptimal(index)),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(engine_err!("lumen::vulkan", "Failed to acquire next swapchain image: {:?}", e)),
        }
    }

    fn queue_present(
        &self,
        handle: SwapchainHandle,
        image_index: u32,
        wait: &[SemaphoreHandle],
    ) -> Result<PresentOutcome> {
        let wait_semaphores: Vec<vk::Semaphore> = wait
            .iter()
            .map(|semaphore| vk::Semaphore::from_raw(semaphore.as_raw()))
            .collect();
        let swapchains = [swapchain(handle)];
        let image_indices = [image_index];
        let info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.context.swapchain_loader.queue_present(self.context.queue, &info) } {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(engine_err!("lumen::vulkan", "Failed to present swapchain image: {:?}", e)),
        }
    }
}
