/// Device memory types and the memory half of the device interface

use bitflags::bitflags;
use crate::error::Result;
use crate::device::{BufferHandle, MemoryHandle, ImageHandle};

bitflags! {
    /// Memory property flags (bit values match Vulkan)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryPropertyFlags: u32 {
        const DEVICE_LOCAL = 0x1;
        const HOST_VISIBLE = 0x2;
        const HOST_COHERENT = 0x4;
        const HOST_CACHED = 0x8;
        const LAZILY_ALLOCATED = 0x10;
    }
}

bitflags! {
    /// Buffer usage flags (bit values match Vulkan)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsageFlags: u32 {
        const TRANSFER_SRC = 0x1;
        const TRANSFER_DST = 0x2;
        const UNIFORM_BUFFER = 0x10;
        const STORAGE_BUFFER = 0x20;
        const INDEX_BUFFER = 0x40;
        const VERTEX_BUFFER = 0x80;
    }
}

/// One entry of the device memory-type table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryType {
    /// Properties of memory allocated from this type
    pub property_flags: MemoryPropertyFlags,
    /// Heap the type allocates from
    pub heap_index: u32,
}

impl MemoryType {
    pub fn new(property_flags: MemoryPropertyFlags, heap_index: u32) -> Self {
        Self { property_flags, heap_index }
    }
}

/// Memory requirements reported for a buffer or image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRequirements {
    /// Size to allocate (may exceed the requested object size)
    pub size: u64,
    /// Required alignment of the binding offset
    pub alignment: u64,
    /// Bit `i` set when memory type `i` may back the object
    pub memory_type_bits: u32,
}

/// Buffers, allocations and host access
pub trait MemoryDevice {
    /// The device memory-type table, in device order
    fn memory_types(&self) -> Vec<MemoryType>;

    /// Create an unbound buffer of `size` bytes
    fn create_buffer(&self, size: u64, usage: BufferUsageFlags) -> Result<BufferHandle>;

    /// Destroy a buffer
    fn destroy_buffer(&self, buffer: BufferHandle);

    /// Memory requirements of a buffer
    fn buffer_memory_requirements(&self, buffer: BufferHandle) -> MemoryRequirements;

    /// Memory requirements of an image
    fn image_memory_requirements(&self, image: ImageHandle) -> MemoryRequirements;

    /// Allocate `size` bytes from memory type `memory_type_index`
    fn allocate_memory(&self, size: u64, memory_type_index: u32) -> Result<MemoryHandle>;

    /// Free an allocation
    fn free_memory(&self, memory: MemoryHandle);

    /// Bind a buffer to an allocation
    fn bind_buffer_memory(&self, buffer: BufferHandle, memory: MemoryHandle, offset: u64) -> Result<()>;

    /// Bind an image to an allocation
    fn bind_image_memory(&self, image: ImageHandle, memory: MemoryHandle, offset: u64) -> Result<()>;

    /// Map, copy `data` at `offset`, unmap. The allocation must be host visible.
    fn write_memory(&self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()>;

    /// Flush the whole allocation (needed for non-coherent host memory)
    fn flush_memory(&self, memory: MemoryHandle) -> Result<()>;
}
