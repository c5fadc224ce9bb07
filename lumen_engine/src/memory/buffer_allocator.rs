/// Buffer allocator - memory-type search, allocation and binding
///
/// There is no sub-allocation and no fallback: every buffer gets its own
/// allocation of exactly the size the device reports, from the first memory
/// type that is allowed by the requirement bitmask and carries every
/// requested property bit.

use std::sync::Arc;
use crate::error::Result;
use crate::device::{
    GraphicsDevice, MemoryDevice, MemoryType, MemoryPropertyFlags, BufferUsageFlags,
    BufferHandle, ImageHandle, MemoryHandle,
};
use crate::{engine_exhausted_err, engine_invalid_err, engine_trace};

/// First memory-type index allowed by `type_bits` whose flags contain `required`
pub fn find_memory_type_index(
    memory_types: &[MemoryType],
    type_bits: u32,
    required: MemoryPropertyFlags,
) -> Option<u32> {
    memory_types
        .iter()
        .enumerate()
        .take(32)
        .find(|(index, memory_type)| {
            type_bits & (1 << index) != 0 && memory_type.property_flags.contains(required)
        })
        .map(|(index, _)| index as u32)
}

// ===== DEVICE BUFFER =====

/// Buffer bound to its own memory allocation
///
/// Owns both handles: dropping it destroys the buffer and frees the memory.
pub struct DeviceBuffer {
    device: Arc<dyn GraphicsDevice>,
    buffer: BufferHandle,
    memory: MemoryHandle,
    size: u64,
    required: MemoryPropertyFlags,
    memory_flags: MemoryPropertyFlags,
    memory_type_index: u32,
}

impl DeviceBuffer {
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }

    pub fn memory(&self) -> MemoryHandle {
        self.memory
    }

    /// Allocation size in bytes (as reported by the device)
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Property mask the buffer was allocated with
    pub fn required_flags(&self) -> MemoryPropertyFlags {
        self.required
    }

    /// Full property flags of the chosen memory type
    pub fn memory_flags(&self) -> MemoryPropertyFlags {
        self.memory_flags
    }

    pub fn memory_type_index(&self) -> u32 {
        self.memory_type_index
    }

    /// Copy bytes into the allocation at `offset`
    ///
    /// Requires host-visible memory. Non-coherent memory is flushed after
    /// the copy.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.memory_flags.contains(MemoryPropertyFlags::HOST_VISIBLE) {
            return Err(engine_invalid_err!(
                "lumen::DeviceBuffer",
                "Buffer memory (type {}) is not host visible",
                self.memory_type_index
            ));
        }
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.size) {
            return Err(engine_invalid_err!(
                "lumen::DeviceBuffer",
                "Write of {} bytes at offset {} exceeds buffer size {}",
                data.len(), offset, self.size
            ));
        }

        self.device.write_memory(self.memory, offset, data)?;
        if !self.memory_flags.contains(MemoryPropertyFlags::HOST_COHERENT) {
            self.device.flush_memory(self.memory)?;
        }
        Ok(())
    }

    /// Copy a slice of plain-old-data values into the allocation at `offset`
    pub fn write_pod<T: bytemuck::Pod>(&self, offset: u64, values: &[T]) -> Result<()> {
        self.write(offset, bytemuck::cast_slice(values))
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.device.destroy_buffer(self.buffer);
        self.device.free_memory(self.memory);
    }
}

// ===== BUFFER ALLOCATOR =====

/// Allocates and binds device memory for buffers and images
pub struct BufferAllocator {
    device: Arc<dyn GraphicsDevice>,
    memory_types: Vec<MemoryType>,
}

impl BufferAllocator {
    /// Snapshot the device's memory-type table
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        let memory_types = device.memory_types();
        Self { device, memory_types }
    }

    pub fn memory_types(&self) -> &[MemoryType] {
        &self.memory_types
    }

    /// Allocate and bind memory for an existing buffer
    ///
    /// On success the returned `DeviceBuffer` owns `buffer`. On failure the
    /// caller keeps ownership of `buffer`; no memory is left allocated.
    pub fn allocate(&self, buffer: BufferHandle, required: MemoryPropertyFlags) -> Result<DeviceBuffer> {
        let requirements = self.device.buffer_memory_requirements(buffer);
        let memory_type_index = find_memory_type_index(
            &self.memory_types,
            requirements.memory_type_bits,
            required,
        )
        .ok_or_else(|| engine_exhausted_err!(
            "lumen::BufferAllocator",
            "No memory type satisfies {:?} (allowed type bits {:#b})",
            required, requirements.memory_type_bits
        ))?;

        let memory = self.device.allocate_memory(requirements.size, memory_type_index)?;
        if let Err(e) = self.device.bind_buffer_memory(buffer, memory, 0) {
            self.device.free_memory(memory);
            return Err(e);
        }

        engine_trace!(
            "lumen::BufferAllocator",
            "Allocated {} bytes from memory type {} for {:?}",
            requirements.size, memory_type_index, required
        );

        Ok(DeviceBuffer {
            device: Arc::clone(&self.device),
            buffer,
            memory,
            size: requirements.size,
            required,
            memory_flags: self.memory_types[memory_type_index as usize].property_flags,
            memory_type_index,
        })
    }

    /// Create a buffer of `size` bytes and back it with memory of `required` properties
    pub fn create_buffer(
        &self,
        size: u64,
        usage: BufferUsageFlags,
        required: MemoryPropertyFlags,
    ) -> Result<DeviceBuffer> {
        let buffer = self.device.create_buffer(size, usage)?;
        self.allocate(buffer, required).map_err(|e| {
            self.device.destroy_buffer(buffer);
            e
        })
    }

    /// Allocate and bind memory for an image; the caller frees it
    pub fn allocate_image_memory(&self, image: ImageHandle, required: MemoryPropertyFlags) -> Result<MemoryHandle> {
        let requirements = self.device.image_memory_requirements(image);
        let memory_type_index = find_memory_type_index(
            &self.memory_types,
            requirements.memory_type_bits,
            required,
        )
        .ok_or_else(|| engine_exhausted_err!(
            "lumen::BufferAllocator",
            "No memory type satisfies {:?} for image (allowed type bits {:#b})",
            required, requirements.memory_type_bits
        ))?;

        let memory = self.device.allocate_memory(requirements.size, memory_type_index)?;
        if let Err(e) = self.device.bind_image_memory(image, memory, 0) {
            self.device.free_memory(memory);
            return Err(e);
        }
        Ok(memory)
    }
}

#[cfg(test)]
#[path = "buffer_allocator_tests.rs"]
mod tests;
