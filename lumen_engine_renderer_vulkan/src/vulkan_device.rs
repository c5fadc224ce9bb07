/// VulkanGraphicsDevice - Vulkan implementation of the engine device interface
///
/// Engine handles carry the raw `VkXxx` values. The capability traits are
/// implemented across this file (memory, queue) and the `vulkan_command`,
/// `vulkan_presentation`, `vulkan_render_target` and `vulkan_pipeline`
/// modules.

use ash::vk;
use ash::vk::Handle;
use std::sync::{Mutex, MutexGuard, PoisonError};
use rustc_hash::FxHashMap;
use lumen_engine::lumen::{Result, RendererConfig};
use lumen_engine::lumen::device::{
    MemoryDevice, QueueDevice, SurfaceSource, MemoryType, MemoryRequirements, BufferUsageFlags,
    SubmitInfo, BufferHandle, ImageHandle, MemoryHandle, SemaphoreHandle, FenceHandle,
    ShaderModuleHandle,
};
use lumen_engine::{engine_err, engine_invalid_err, engine_trace, engine_warn};

use crate::vulkan_context::VulkanContext;
use crate::vulkan_format::memory_types_from_vk;

/// Vulkan graphics device
pub struct VulkanGraphicsDevice {
    pub(crate) context: VulkanContext,
    memory_types: Vec<MemoryType>,
    /// Size of each live allocation (for whole-allocation flushes)
    allocation_sizes: Mutex<FxHashMap<u64, u64>>,
    /// Entry points declared by each live shader module
    shader_entry_points: Mutex<FxHashMap<u64, Vec<String>>>,
}

impl VulkanGraphicsDevice {
    /// Create the instance and device able to present to windows like `source`
    pub fn new(source: &dyn SurfaceSource, config: &RendererConfig) -> Result<Self> {
        let context = VulkanContext::new(config, source.raw_display_handle()?)?;
        let memory_types = memory_types_from_vk(&context.memory_properties);
        Ok(Self {
            context,
            memory_types,
            allocation_sizes: Mutex::new(FxHashMap::default()),
            shader_entry_points: Mutex::new(FxHashMap::default()),
        })
    }

    /// Device that owns every handle this backend returns
    pub fn raw_device(&self) -> &ash::Device {
        &self.context.device
    }

    pub fn queue_family(&self) -> u32 {
        self.context.queue_family
    }

    pub(crate) fn shader_entry_points(&self) -> MutexGuard<'_, FxHashMap<u64, Vec<String>>> {
        self.shader_entry_points.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn allocation_sizes(&self) -> MutexGuard<'_, FxHashMap<u64, u64>> {
        self.allocation_sizes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Memory
// ============================================================================

impl MemoryDevice for VulkanGraphicsDevice {
    fn memory_types(&self) -> Vec<MemoryType> {
        self.memory_types.clone()
    }

    fn create_buffer(&self, size: u64, usage: BufferUsageFlags) -> Result<BufferHandle> {
        let info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(vk::BufferUsageFlags::from_raw(usage.bits()))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);
        let buffer = unsafe { self.context.device.create_buffer(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create buffer of {} bytes: {:?}", size, e))?;
        Ok(BufferHandle::from_raw(buffer.as_raw()))
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        unsafe { self.context.device.destroy_buffer(vk::Buffer::from_raw(buffer.as_raw()), None) };
    }

    fn buffer_memory_requirements(&self, buffer: BufferHandle) -> MemoryRequirements {
        let requirements = unsafe {
            self.context.device.get_buffer_memory_requirements(vk::Buffer::from_raw(buffer.as_raw()))
        };
        MemoryRequirements {
            size: requirements.size,
            alignment: requirements.alignment,
            memory_type_bits: requirements.memory_type_bits,
        }
    }

    fn image_memory_requirements(&self, image: ImageHandle) -> MemoryRequirements {
        let requirements = unsafe {
            self.context.device.get_image_memory_requirements(vk::Image::from_raw(image.as_raw()))
        };
        MemoryRequirements {
            size: requirements.size,
            alignment: requirements.alignment,
            memory_type_bits: requirements.memory_type_bits,
        }
    }

    fn allocate_memory(&self, size: u64, memory_type_index: u32) -> Result<MemoryHandle> {
        let info = vk::MemoryAllocateInfo::default()
            .allocation_size(size)
            .memory_type_index(memory_type_index);
        let memory = unsafe { self.context.device.allocate_memory(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan",
                "Failed to allocate {} bytes from memory type {}: {:?}", size, memory_type_index, e))?;
        self.allocation_sizes().insert(memory.as_raw(), size);
        Ok(MemoryHandle::from_raw(memory.as_raw()))
    }

    fn free_memory(&self, memory: MemoryHandle) {
        self.allocation_sizes().remove(&memory.as_raw());
        unsafe { self.context.device.free_memory(vk::DeviceMemory::from_raw(memory.as_raw()), None) };
    }

    fn bind_buffer_memory(&self, buffer: BufferHandle, memory: MemoryHandle, offset: u64) -> Result<()> {
        unsafe {
            self.context.device.bind_buffer_memory(
                vk::Buffer::from_raw(buffer.as_raw()),
                vk::DeviceMemory::from_raw(memory.as_raw()),
                offset,
            )
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to bind buffer memory: {:?}", e))
    }

    fn bind_image_memory(&self, image: ImageHandle, memory: MemoryHandle, offset: u64) -> Result<()> {
        unsafe {
            self.context.device.bind_image_memory(
                vk::Image::from_raw(image.as_raw()),
                vk::DeviceMemory::from_raw(memory.as_raw()),
                offset,
            )
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to bind image memory: {:?}", e))
    }

    fn write_memory(&self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let memory = vk::DeviceMemory::from_raw(memory.as_raw());
        unsafe {
            let mapped = self.context.device
                .map_memory(memory, offset, data.len() as u64, vk::MemoryMapFlags::empty())
                .map_err(|e| engine_err!("lumen::vulkan", "Failed to map memory: {:?}", e))?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.cast::<u8>(), data.len());
            self.context.device.unmap_memory(memory);
        }
        Ok(())
    }

    fn flush_memory(&self, memory: MemoryHandle) -> Result<()> {
        if !self.allocation_sizes().contains_key(&memory.as_raw()) {
            return Err(engine_invalid_err!("lumen::vulkan", "Flush of unknown allocation {:?}", memory));
        }
        let range = vk::MappedMemoryRange::default()
            .memory(vk::DeviceMemory::from_raw(memory.as_raw()))
            .offset(0)
            .size(vk::WHOLE_SIZE);
        unsafe { self.context.device.flush_mapped_memory_ranges(&[range]) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to flush memory: {:?}", e))
    }
}

// ============================================================================
// Queue
// ============================================================================

impl QueueDevice for VulkanGraphicsDevice {
    fn create_semaphore(&self) -> Result<SemaphoreHandle> {
        let semaphore = unsafe {
            self.context.device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to create semaphore: {:?}", e))?;
        Ok(SemaphoreHandle::from_raw(semaphore.as_raw()))
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle) {
        unsafe {
            self.context.device.destroy_semaphore(vk::Semaphore::from_raw(semaphore.as_raw()), None)
        };
    }

    fn create_fence(&self) -> Result<FenceHandle> {
        let fence = unsafe { self.context.device.create_fence(&vk::FenceCreateInfo::default(), None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create fence: {:?}", e))?;
        Ok(FenceHandle::from_raw(fence.as_raw()))
    }

    fn wait_for_fence(&self, fence: FenceHandle, timeout: u64) -> Result<()> {
        unsafe {
            self.context.device.wait_for_fences(&[vk::Fence::from_raw(fence.as_raw())], true, timeout)
        }
        .map_err(|e| engine_err!("lumen::vulkan", "Failed to wait for fence: {:?}", e))
    }

    fn destroy_fence(&self, fence: FenceHandle) {
        unsafe { self.context.device.destroy_fence(vk::Fence::from_raw(fence.as_raw()), None) };
    }

    fn queue_submit(&self, submit: &SubmitInfo<'_>, fence: Option<FenceHandle>) -> Result<()> {
        let command_buffers: Vec<vk::CommandBuffer> = submit.command_lists
            .iter()
            .map(|list| vk::CommandBuffer::from_raw(list.as_raw()))
            .collect();
        let wait_semaphores: Vec<vk::Semaphore> = submit.wait_semaphores
            .iter()
            .map(|wait| vk::Semaphore::from_raw(wait.semaphore.as_raw()))
            .collect();
        let wait_stages: Vec<vk::PipelineStageFlags> = submit.wait_semaphores
            .iter()
            .map(|wait| vk::PipelineStageFlags::from_raw(wait.stage.bits()))
            .collect();
        let signal_semaphores: Vec<vk::Semaphore> = submit.signal_semaphores
            .iter()
            .map(|semaphore| vk::Semaphore::from_raw(semaphore.as_raw()))
            .collect();

        let info = vk::SubmitInfo::default()
            .command_buffers(&command_buffers)
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .signal_semaphores(&signal_semaphores);
        let fence = fence.map_or(vk::Fence::null(), |fence| vk::Fence::from_raw(fence.as_raw()));

        engine_trace!("lumen::vulkan", "Submitting {} command buffers", command_buffers.len());
        unsafe { self.context.device.queue_submit(self.context.queue, &[info], fence) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to submit commands to GPU queue: {:?}", e))
    }

    fn queue_wait_idle(&self) -> Result<()> {
        unsafe { self.context.device.queue_wait_idle(self.context.queue) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to wait for queue idle: {:?}", e))
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        let leaked = self.allocation_sizes().len();
        if leaked > 0 {
            engine_warn!("lumen::vulkan", "{} device allocations still live at shutdown", leaked);
        }
        let modules: Vec<u64> = self.shader_entry_points().keys().copied().collect();
        for module in modules {
            unsafe {
                self.context.device.destroy_shader_module(vk::ShaderModule::from_raw(module), None)
            };
        }
    }
}

pub(crate) fn shader_module(handle: ShaderModuleHandle) -> vk::ShaderModule {
    vk::ShaderModule::from_raw(handle.as_raw())
}
