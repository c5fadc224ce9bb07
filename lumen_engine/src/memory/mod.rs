/// Device memory allocation for GPU-visible buffers and images

pub mod buffer_allocator;

pub use buffer_allocator::{BufferAllocator, DeviceBuffer, find_memory_type_index};
