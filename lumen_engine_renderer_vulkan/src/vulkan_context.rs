/// VulkanContext - instance, physical device, logical device and the queue
///
/// One graphics queue is used for both submission and presentation. Whether
/// it can present to a particular surface is checked per surface
/// (`surface_present_support`), not at startup.

use ash::vk;
use raw_window_handle::RawDisplayHandle;
use lumen_engine::lumen::{Result, RendererConfig};
use lumen_engine::{engine_config_err, engine_err, engine_info};

pub(crate) struct VulkanContext {
    /// Keeps the Vulkan library loaded
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,
    pub queue: vk::Queue,
    pub queue_family: u32,
    pub surface_loader: ash::khr::surface::Instance,
    pub swapchain_loader: ash::khr::swapchain::Device,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
    #[cfg(feature = "vulkan-validation")]
    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanContext {
    /// Create the instance (with the extensions `display` needs) and the device
    pub fn new(config: &RendererConfig, display: RawDisplayHandle) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| engine_err!("lumen::vulkan", "Failed to load Vulkan library: {:?}", e))?;

            let app_name = std::ffi::CString::new(config.app_name.as_str())
                .map_err(|e| engine_config_err!("lumen::vulkan", "Invalid application name: {}", e))?;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Lumen")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_0);

            #[allow(unused_mut)]
            let mut extension_names = ash_window::enumerate_required_extensions(display)
                .map_err(|e| engine_err!("lumen::vulkan", "Failed to get required extensions: {:?}", e))?
                .to_vec();
            #[allow(unused_mut)]
            let mut layer_names: Vec<*const std::ffi::c_char> = Vec::new();

            #[cfg(feature = "vulkan-validation")]
            if config.enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                layer_names.push(c"VK_LAYER_KHRONOS_validation".as_ptr());
            }

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| engine_err!("lumen::vulkan", "Failed to create Vulkan instance: {:?}", e))?;

            #[cfg(feature = "vulkan-validation")]
            let debug_utils = if config.enable_validation {
                match crate::debug::create_messenger(&entry, &instance) {
                    Ok(messenger) => Some(messenger),
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                None
            };

            let bootstrap = Self::create_device(&instance);
            let (physical_device, device, queue_family) = match bootstrap {
                Ok(created) => created,
                Err(e) => {
                    #[cfg(feature = "vulkan-validation")]
                    if let Some((loader, messenger)) = &debug_utils {
                        loader.destroy_debug_utils_messenger(*messenger, None);
                    }
                    instance.destroy_instance(None);
                    return Err(e);
                }
            };

            let queue = device.get_device_queue(queue_family, 0);
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
            let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);
            let memory_properties = instance.get_physical_device_memory_properties(physical_device);

            let properties = instance.get_physical_device_properties(physical_device);
            engine_info!("lumen::vulkan", "Using GPU '{}' (queue family {})",
                properties.device_name_as_c_str().map(|name| name.to_string_lossy()).unwrap_or_default(),
                queue_family);

            Ok(Self {
                entry,
                instance,
                physical_device,
                device,
                queue,
                queue_family,
                surface_loader,
                swapchain_loader,
                memory_properties,
                #[cfg(feature = "vulkan-validation")]
                debug_utils,
            })
        }
    }

    /// Pick the first GPU with a graphics queue family and create the device
    unsafe fn create_device(instance: &ash::Instance) -> Result<(vk::PhysicalDevice, ash::Device, u32)> {
        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to enumerate physical devices: {:?}", e))?;

        let (physical_device, queue_family) = physical_devices
            .into_iter()
            .find_map(|physical_device| {
                instance
                    .get_physical_device_queue_family_properties(physical_device)
                    .iter()
                    .position(|family| family.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                    .map(|index| (physical_device, index as u32))
            })
            .ok_or_else(|| engine_config_err!("lumen::vulkan", "No GPU with a graphics queue found"))?;

        let queue_priorities = [1.0];
        let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)];
        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create logical device: {:?}", e))?;

        Ok((physical_device, device, queue_family))
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);

            #[cfg(feature = "vulkan-validation")]
            if let Some((loader, messenger)) = self.debug_utils.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}
