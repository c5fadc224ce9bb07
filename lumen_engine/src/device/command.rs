/// Command recording, synchronization and queue submission

use bitflags::bitflags;
use crate::error::Result;
use crate::device::{
    Extent2D, ImageLayout, ImageAspectFlags,
    BufferHandle, ImageHandle, CommandPoolHandle, CommandListHandle, SemaphoreHandle,
    FenceHandle, RenderPassHandle, FramebufferHandle, PipelineHandle,
};

/// Command list level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandListLevel {
    /// Submitted directly to a queue
    Primary,
    /// Executed from inside a primary list's render pass
    Secondary,
}

/// Render pass state a secondary list continues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandListInheritance {
    pub render_pass: RenderPassHandle,
    pub subpass: u32,
    pub framebuffer: FramebufferHandle,
}

/// Begin parameters for a command list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandListBegin {
    /// The list is submitted once before being re-recorded
    pub one_time_submit: bool,
    /// Secondary lists recorded entirely inside a render pass
    pub inheritance: Option<CommandListInheritance>,
}

impl CommandListBegin {
    /// Primary list recorded for a single submission
    pub fn one_time_submit() -> Self {
        Self { one_time_submit: true, inheritance: None }
    }

    /// Secondary list continuing `inheritance`'s render pass
    pub fn render_pass_continue(inheritance: CommandListInheritance) -> Self {
        Self { one_time_submit: false, inheritance: Some(inheritance) }
    }
}

bitflags! {
    /// Memory access types (bit values match Vulkan)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const COLOR_ATTACHMENT_WRITE = 0x100;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 0x400;
        const MEMORY_READ = 0x8000;
        const MEMORY_WRITE = 0x10000;
    }
}

bitflags! {
    /// Pipeline stages (bit values match Vulkan)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStageFlags: u32 {
        const TOP_OF_PIPE = 0x1;
        const FRAGMENT_SHADER = 0x80;
        const EARLY_FRAGMENT_TESTS = 0x100;
        const COLOR_ATTACHMENT_OUTPUT = 0x400;
        const BOTTOM_OF_PIPE = 0x2000;
        const ALL_COMMANDS = 0x10000;
    }
}

/// Layout transition of a whole image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBarrier {
    pub image: ImageHandle,
    pub aspect: ImageAspectFlags,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
    pub src_stage: PipelineStageFlags,
    pub dst_stage: PipelineStageFlags,
}

/// Clear value for render pass attachments
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}

/// How the first subpass contents are provided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubpassContents {
    /// Commands recorded directly in the primary list
    Inline,
    /// Commands come from executed secondary lists only
    SecondaryCommandLists,
}

/// Render pass begin parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassBegin<'a> {
    pub render_pass: RenderPassHandle,
    pub framebuffer: FramebufferHandle,
    /// Render area, anchored at the origin
    pub extent: Extent2D,
    /// One per attachment, in attachment order
    pub clear_values: &'a [ClearValue],
    pub contents: SubpassContents,
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Semaphore a submission waits on, and the stage that waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemaphoreWait {
    pub semaphore: SemaphoreHandle,
    pub stage: PipelineStageFlags,
}

/// One queue submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubmitInfo<'a> {
    pub command_lists: &'a [CommandListHandle],
    pub wait_semaphores: &'a [SemaphoreWait],
    pub signal_semaphores: &'a [SemaphoreHandle],
}

/// Command pools and command recording
pub trait CommandDevice {
    /// Create a pool whose lists can be individually re-recorded
    fn create_command_pool(&self) -> Result<CommandPoolHandle>;
    /// Destroy a pool and every list allocated from it
    fn destroy_command_pool(&self, pool: CommandPoolHandle);

    fn allocate_command_lists(
        &self,
        pool: CommandPoolHandle,
        level: CommandListLevel,
        count: u32,
    ) -> Result<Vec<CommandListHandle>>;
    fn free_command_lists(&self, pool: CommandPoolHandle, lists: &[CommandListHandle]);

    /// Begin recording (implicitly resets a previously recorded list)
    fn begin_command_list(&self, list: CommandListHandle, begin: &CommandListBegin) -> Result<()>;
    fn end_command_list(&self, list: CommandListHandle) -> Result<()>;

    fn cmd_image_barrier(&self, list: CommandListHandle, barrier: &ImageBarrier);
    fn cmd_begin_render_pass(&self, list: CommandListHandle, begin: &RenderPassBegin<'_>);
    fn cmd_end_render_pass(&self, list: CommandListHandle);
    fn cmd_execute_commands(&self, list: CommandListHandle, secondary: &[CommandListHandle]);
    fn cmd_bind_pipeline(&self, list: CommandListHandle, pipeline: PipelineHandle);
    fn cmd_bind_vertex_buffer(&self, list: CommandListHandle, binding: u32, buffer: BufferHandle, offset: u64);
    fn cmd_bind_index_buffer(&self, list: CommandListHandle, buffer: BufferHandle, offset: u64, index_type: IndexType);
    fn cmd_draw_indexed(
        &self,
        list: CommandListHandle,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
}

/// Synchronization objects and the single graphics/present queue
pub trait QueueDevice {
    fn create_semaphore(&self) -> Result<SemaphoreHandle>;
    fn destroy_semaphore(&self, semaphore: SemaphoreHandle);

    /// Create an unsignaled fence
    fn create_fence(&self) -> Result<FenceHandle>;
    fn wait_for_fence(&self, fence: FenceHandle, timeout: u64) -> Result<()>;
    fn destroy_fence(&self, fence: FenceHandle);

    /// Submit work, optionally signaling `fence` on completion
    fn queue_submit(&self, submit: &SubmitInfo<'_>, fence: Option<FenceHandle>) -> Result<()>;

    /// Block until the queue has no pending work
    fn queue_wait_idle(&self) -> Result<()>;
}
