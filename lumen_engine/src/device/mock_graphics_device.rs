/// Mock graphics device for unit tests (no GPU required)
///
/// Hands out sequential handles, records every command into a per-list
/// string log, and keeps enough bookkeeping (live objects, allocations,
/// submissions, presents) for tests to assert on what the engine did.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::device::*;
use crate::error::{Error, Result};

// ============================================================================
// Recorded state
// ============================================================================

/// Recorded state of one command list
#[derive(Debug, Clone)]
pub struct MockCommandList {
    pub pool: CommandPoolHandle,
    pub level: CommandListLevel,
    /// Commands of the latest recording ("begin" .. "end")
    pub commands: Vec<String>,
    /// Number of times recording was started
    pub begin_count: u32,
    pub inheritance: Option<CommandListInheritance>,
}

/// One recorded queue submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSubmit {
    pub command_lists: Vec<CommandListHandle>,
    pub waits: Vec<SemaphoreWait>,
    pub signals: Vec<SemaphoreHandle>,
    pub fenced: bool,
}

#[derive(Debug)]
struct MockAllocation {
    size: u64,
    memory_type_index: u32,
    data: Vec<u8>,
    flushes: u32,
}

#[derive(Debug)]
struct MockSwapchain {
    images: Vec<ImageHandle>,
    next_image: u32,
}

struct MockState {
    next_handle: u64,

    // Configuration
    memory_types: Vec<MemoryType>,
    buffer_alignment: u64,
    memory_type_bits: Option<u32>,
    capabilities: SurfaceCapabilities,
    surface_formats: Vec<SurfaceFormat>,
    present_modes: Vec<PresentMode>,
    present_support: bool,
    depth_formats: Vec<Format>,
    failures: FxHashSet<String>,
    acquire_script: VecDeque<AcquireOutcome>,
    present_script: VecDeque<PresentOutcome>,

    // Bookkeeping
    live: FxHashMap<u64, &'static str>,
    bindings: FxHashMap<BufferHandle, MemoryHandle>,
    allocations: FxHashMap<MemoryHandle, MockAllocation>,
    command_lists: FxHashMap<CommandListHandle, MockCommandList>,
    swapchains: FxHashMap<SwapchainHandle, MockSwapchain>,
    submits: Vec<MockSubmit>,
    presents: Vec<(SwapchainHandle, u32)>,
    wait_idle_count: u32,
    executed_batches: Vec<Vec<CommandListHandle>>,
    barriers: Vec<ImageBarrier>,
    render_pass_clears: Vec<Vec<ClearValue>>,
    swapchain_descs: Vec<SwapchainDesc>,
    image_descs: Vec<ImageDesc>,
    render_pass_descs: Vec<RenderPassDesc>,
    framebuffer_descs: Vec<FramebufferDesc>,
    pipeline_descs: Vec<GraphicsPipelineDesc>,
    shader_module_sizes: Vec<usize>,
}

impl MockState {
    fn create(&mut self, kind: &'static str) -> u64 {
        self.next_handle += 1;
        self.live.insert(self.next_handle, kind);
        self.next_handle
    }

    fn destroy(&mut self, raw: u64) {
        self.live.remove(&raw);
    }

    fn check(&self, op: &str) -> Result<()> {
        if self.failures.contains(op) {
            return Err(Error::DeviceError(format!("mock failure: {}", op)));
        }
        Ok(())
    }

    fn record(&mut self, list: CommandListHandle, command: String) {
        if let Some(entry) = self.command_lists.get_mut(&list) {
            entry.commands.push(command);
        }
    }
}

// ============================================================================
// Mock surface source
// ============================================================================

/// OS window stand-in handing out fixed Xlib handles
#[derive(Debug, Default, Clone, Copy)]
pub struct MockSurfaceSource;

impl SurfaceSource for MockSurfaceSource {
    fn raw_display_handle(&self) -> Result<RawDisplayHandle> {
        Ok(RawDisplayHandle::Xlib(XlibDisplayHandle::new(None, 0)))
    }

    fn raw_window_handle(&self) -> Result<RawWindowHandle> {
        Ok(RawWindowHandle::Xlib(XlibWindowHandle::new(1)))
    }
}

// ============================================================================
// Mock Graphics Device
// ============================================================================

pub struct MockGraphicsDevice {
    state: Mutex<MockState>,
}

impl MockGraphicsDevice {
    /// Device with three memory types (DEVICE_LOCAL, HOST_VISIBLE|HOST_COHERENT,
    /// DEVICE_LOCAL|HOST_VISIBLE|HOST_COHERENT), a 800x600 surface accepting
    /// 2..=3 images, FIFO only, and D24_UNORM_S8_UINT as the only depth format.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_handle: 0,
                memory_types: vec![
                    MemoryType::new(MemoryPropertyFlags::DEVICE_LOCAL, 0),
                    MemoryType::new(MemoryPropertyFlags::HOST_VISIBLE | MemoryPropertyFlags::HOST_COHERENT, 1),
                    MemoryType::new(
                        MemoryPropertyFlags::DEVICE_LOCAL
                            | MemoryPropertyFlags::HOST_VISIBLE
                            | MemoryPropertyFlags::HOST_COHERENT,
                        0,
                    ),
                ],
                buffer_alignment: 256,
                memory_type_bits: None,
                capabilities: SurfaceCapabilities {
                    min_image_count: 2,
                    max_image_count: 3,
                    current_extent: Some(Extent2D::new(800, 600)),
                    min_image_extent: Extent2D::new(1, 1),
                    max_image_extent: Extent2D::new(4096, 4096),
                },
                surface_formats: vec![SurfaceFormat {
                    format: Format::B8G8R8A8_UNORM,
                    color_space: ColorSpace::SrgbNonlinear,
                }],
                present_modes: vec![PresentMode::Fifo],
                present_support: true,
                depth_formats: vec![Format::D24_UNORM_S8_UINT],
                failures: FxHashSet::default(),
                acquire_script: VecDeque::new(),
                present_script: VecDeque::new(),
                live: FxHashMap::default(),
                bindings: FxHashMap::default(),
                allocations: FxHashMap::default(),
                command_lists: FxHashMap::default(),
                swapchains: FxHashMap::default(),
                submits: Vec::new(),
                presents: Vec::new(),
                wait_idle_count: 0,
                executed_batches: Vec::new(),
                barriers: Vec::new(),
                render_pass_clears: Vec::new(),
                swapchain_descs: Vec::new(),
                image_descs: Vec::new(),
                render_pass_descs: Vec::new(),
                framebuffer_descs: Vec::new(),
                pipeline_descs: Vec::new(),
                shader_module_sizes: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    // ===== CONFIGURATION =====

    pub fn with_memory_types(self, memory_types: Vec<MemoryType>) -> Self {
        self.state().memory_types = memory_types;
        self
    }

    pub fn with_buffer_alignment(self, alignment: u64) -> Self {
        self.state().buffer_alignment = alignment;
        self
    }

    /// Override the type bitmask reported for buffers (default: every type)
    pub fn with_memory_type_bits(self, bits: u32) -> Self {
        self.state().memory_type_bits = Some(bits);
        self
    }

    pub fn with_capabilities(self, capabilities: SurfaceCapabilities) -> Self {
        self.set_capabilities(capabilities);
        self
    }

    pub fn with_surface_formats(self, formats: Vec<SurfaceFormat>) -> Self {
        self.state().surface_formats = formats;
        self
    }

    pub fn with_present_modes(self, modes: Vec<PresentMode>) -> Self {
        self.state().present_modes = modes;
        self
    }

    pub fn with_present_support(self, supported: bool) -> Self {
        self.state().present_support = supported;
        self
    }

    pub fn with_depth_formats(self, formats: Vec<Format>) -> Self {
        self.state().depth_formats = formats;
        self
    }

    pub fn set_capabilities(&self, capabilities: SurfaceCapabilities) {
        self.state().capabilities = capabilities;
    }

    /// Make every later call of `op` (trait method name) fail
    pub fn fail_on(&self, op: &str) {
        self.state().failures.insert(op.to_string());
    }

    pub fn clear_failures(&self) {
        self.state().failures.clear();
    }

    /// Queue the outcome of the next acquisition
    pub fn script_acquire(&self, outcome: AcquireOutcome) {
        self.state().acquire_script.push_back(outcome);
    }

    /// Queue the outcome of the next presentation
    pub fn script_present(&self, outcome: PresentOutcome) {
        self.state().present_script.push_back(outcome);
    }

    // ===== INSPECTION =====

    /// Commands of the latest recording of `list`
    pub fn commands(&self, list: CommandListHandle) -> Vec<String> {
        self.state()
            .command_lists
            .get(&list)
            .map(|entry| entry.commands.clone())
            .unwrap_or_default()
    }

    pub fn command_list(&self, list: CommandListHandle) -> Option<MockCommandList> {
        self.state().command_lists.get(&list).cloned()
    }

    pub fn begin_count(&self, list: CommandListHandle) -> u32 {
        self.state()
            .command_lists
            .get(&list)
            .map(|entry| entry.begin_count)
            .unwrap_or(0)
    }

    /// Number of objects created and not yet destroyed
    pub fn live_objects(&self) -> usize {
        self.state().live.len()
    }

    pub fn live_count(&self, kind: &str) -> usize {
        self.state().live.values().filter(|k| **k == kind).count()
    }

    /// (size, memory type index) of an allocation
    pub fn allocation(&self, memory: MemoryHandle) -> Option<(u64, u32)> {
        self.state()
            .allocations
            .get(&memory)
            .map(|a| (a.size, a.memory_type_index))
    }

    pub fn memory_contents(&self, memory: MemoryHandle) -> Vec<u8> {
        self.state()
            .allocations
            .get(&memory)
            .map(|a| a.data.clone())
            .unwrap_or_default()
    }

    pub fn flush_count(&self, memory: MemoryHandle) -> u32 {
        self.state().allocations.get(&memory).map(|a| a.flushes).unwrap_or(0)
    }

    pub fn buffer_binding(&self, buffer: BufferHandle) -> Option<MemoryHandle> {
        self.state().bindings.get(&buffer).copied()
    }

    pub fn submits(&self) -> Vec<MockSubmit> {
        self.state().submits.clone()
    }

    pub fn submit_count(&self) -> usize {
        self.state().submits.len()
    }

    pub fn presents(&self) -> Vec<(SwapchainHandle, u32)> {
        self.state().presents.clone()
    }

    pub fn present_count(&self) -> usize {
        self.state().presents.len()
    }

    pub fn wait_idle_count(&self) -> u32 {
        self.state().wait_idle_count
    }

    /// Secondary lists passed to each `cmd_execute_commands` call
    pub fn executed_batches(&self) -> Vec<Vec<CommandListHandle>> {
        self.state().executed_batches.clone()
    }

    pub fn barriers(&self) -> Vec<ImageBarrier> {
        self.state().barriers.clone()
    }

    pub fn render_pass_clears(&self) -> Vec<Vec<ClearValue>> {
        self.state().render_pass_clears.clone()
    }

    pub fn swapchain_descs(&self) -> Vec<SwapchainDesc> {
        self.state().swapchain_descs.clone()
    }

    pub fn image_descs(&self) -> Vec<ImageDesc> {
        self.state().image_descs.clone()
    }

    pub fn render_pass_descs(&self) -> Vec<RenderPassDesc> {
        self.state().render_pass_descs.clone()
    }

    pub fn framebuffer_descs(&self) -> Vec<FramebufferDesc> {
        self.state().framebuffer_descs.clone()
    }

    pub fn pipeline_descs(&self) -> Vec<GraphicsPipelineDesc> {
        self.state().pipeline_descs.clone()
    }

    pub fn shader_module_sizes(&self) -> Vec<usize> {
        self.state().shader_module_sizes.clone()
    }
}

// ============================================================================
// Memory
// ============================================================================

impl MemoryDevice for MockGraphicsDevice {
    fn memory_types(&self) -> Vec<MemoryType> {
        self.state().memory_types.clone()
    }

    fn create_buffer(&self, size: u64, _usage: BufferUsageFlags) -> Result<BufferHandle> {
        let mut state = self.state();
        state.check("create_buffer")?;
        if size == 0 {
            return Err(Error::DeviceError("zero-sized buffer".to_string()));
        }
        Ok(BufferHandle::from_raw(state.create("buffer")))
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        let mut state = self.state();
        state.bindings.remove(&buffer);
        state.destroy(buffer.as_raw());
    }

    fn buffer_memory_requirements(&self, _buffer: BufferHandle) -> MemoryRequirements {
        let state = self.state();
        let all_types = (1u32 << state.memory_types.len().min(31)) - 1;
        MemoryRequirements {
            size: state.buffer_alignment,
            alignment: state.buffer_alignment,
            memory_type_bits: state.memory_type_bits.unwrap_or(all_types),
        }
    }

    fn image_memory_requirements(&self, _image: ImageHandle) -> MemoryRequirements {
        let state = self.state();
        let all_types = (1u32 << state.memory_types.len().min(31)) - 1;
        MemoryRequirements {
            size: 4096,
            alignment: 4096,
            memory_type_bits: all_types,
        }
    }

    fn allocate_memory(&self, size: u64, memory_type_index: u32) -> Result<MemoryHandle> {
        let mut state = self.state();
        state.check("allocate_memory")?;
        if memory_type_index as usize >= state.memory_types.len() {
            return Err(Error::DeviceError(format!("bad memory type {}", memory_type_index)));
        }
        let memory = MemoryHandle::from_raw(state.create("memory"));
        state.allocations.insert(memory, MockAllocation {
            size,
            memory_type_index,
            data: vec![0; size as usize],
            flushes: 0,
        });
        Ok(memory)
    }

    fn free_memory(&self, memory: MemoryHandle) {
        let mut state = self.state();
        state.allocations.remove(&memory);
        state.destroy(memory.as_raw());
    }

    fn bind_buffer_memory(&self, buffer: BufferHandle, memory: MemoryHandle, _offset: u64) -> Result<()> {
        let mut state = self.state();
        state.check("bind_buffer_memory")?;
        state.bindings.insert(buffer, memory);
        Ok(())
    }

    fn bind_image_memory(&self, _image: ImageHandle, _memory: MemoryHandle, _offset: u64) -> Result<()> {
        self.state().check("bind_image_memory")
    }

    fn write_memory(&self, memory: MemoryHandle, offset: u64, data: &[u8]) -> Result<()> {
        let mut state = self.state();
        state.check("write_memory")?;
        let memory_types = state.memory_types.clone();
        let allocation = state
            .allocations
            .get_mut(&memory)
            .ok_or_else(|| Error::InvalidResource("unknown allocation".to_string()))?;
        let flags = memory_types[allocation.memory_type_index as usize].property_flags;
        if !flags.contains(MemoryPropertyFlags::HOST_VISIBLE) {
            return Err(Error::DeviceError("memory is not host visible".to_string()));
        }
        let start = offset as usize;
        let end = start + data.len();
        if end > allocation.data.len() {
            return Err(Error::DeviceError("write past the end of the allocation".to_string()));
        }
        allocation.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn flush_memory(&self, memory: MemoryHandle) -> Result<()> {
        let mut state = self.state();
        if let Some(allocation) = state.allocations.get_mut(&memory) {
            allocation.flushes += 1;
        }
        Ok(())
    }
}

// ============================================================================
// Commands
// ============================================================================

impl CommandDevice for MockGraphicsDevice {
    fn create_command_pool(&self) -> Result<CommandPoolHandle> {
        let mut state = self.state();
        state.check("create_command_pool")?;
        Ok(CommandPoolHandle::from_raw(state.create("command_pool")))
    }

    fn destroy_command_pool(&self, pool: CommandPoolHandle) {
        let mut state = self.state();
        let owned: Vec<CommandListHandle> = state
            .command_lists
            .iter()
            .filter(|(_, entry)| entry.pool == pool)
            .map(|(handle, _)| *handle)
            .collect();
        for list in owned {
            state.command_lists.remove(&list);
            state.destroy(list.as_raw());
        }
        state.destroy(pool.as_raw());
    }

    fn allocate_command_lists(
        &self,
        pool: CommandPoolHandle,
        level: CommandListLevel,
        count: u32,
    ) -> Result<Vec<CommandListHandle>> {
        let mut state = self.state();
        state.check("allocate_command_lists")?;
        let mut lists = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let list = CommandListHandle::from_raw(state.create("command_list"));
            state.command_lists.insert(list, MockCommandList {
                pool,
                level,
                commands: Vec::new(),
                begin_count: 0,
                inheritance: None,
            });
            lists.push(list);
        }
        Ok(lists)
    }

    fn free_command_lists(&self, _pool: CommandPoolHandle, lists: &[CommandListHandle]) {
        let mut state = self.state();
        for list in lists {
            state.command_lists.remove(list);
            state.destroy(list.as_raw());
        }
    }

    fn begin_command_list(&self, list: CommandListHandle, begin: &CommandListBegin) -> Result<()> {
        let mut state = self.state();
        state.check("begin_command_list")?;
        let entry = state
            .command_lists
            .get_mut(&list)
            .ok_or_else(|| Error::InvalidResource("unknown command list".to_string()))?;
        entry.commands.clear();
        entry.begin_count += 1;
        entry.inheritance = begin.inheritance;
        let command = match (begin.one_time_submit, begin.inheritance) {
            (_, Some(inheritance)) => format!(
                "begin(continue rp={} fb={})",
                inheritance.render_pass.as_raw(),
                inheritance.framebuffer.as_raw()
            ),
            (true, None) => "begin(one_time)".to_string(),
            (false, None) => "begin".to_string(),
        };
        entry.commands.push(command);
        Ok(())
    }

    fn end_command_list(&self, list: CommandListHandle) -> Result<()> {
        let mut state = self.state();
        state.check("end_command_list")?;
        state.record(list, "end".to_string());
        Ok(())
    }

    fn cmd_image_barrier(&self, list: CommandListHandle, barrier: &ImageBarrier) {
        let mut state = self.state();
        state.barriers.push(*barrier);
        state.record(list, format!("barrier({:?}->{:?})", barrier.old_layout, barrier.new_layout));
    }

    fn cmd_begin_render_pass(&self, list: CommandListHandle, begin: &RenderPassBegin<'_>) {
        let mut state = self.state();
        state.render_pass_clears.push(begin.clear_values.to_vec());
        state.record(list, format!("begin_render_pass(fb={})", begin.framebuffer.as_raw()));
    }

    fn cmd_end_render_pass(&self, list: CommandListHandle) {
        self.state().record(list, "end_render_pass".to_string());
    }

    fn cmd_execute_commands(&self, list: CommandListHandle, secondary: &[CommandListHandle]) {
        let mut state = self.state();
        state.executed_batches.push(secondary.to_vec());
        state.record(list, format!("execute_commands({})", secondary.len()));
    }

    fn cmd_bind_pipeline(&self, list: CommandListHandle, pipeline: PipelineHandle) {
        self.state().record(list, format!("bind_pipeline({})", pipeline.as_raw()));
    }

    fn cmd_bind_vertex_buffer(&self, list: CommandListHandle, binding: u32, buffer: BufferHandle, offset: u64) {
        self.state().record(
            list,
            format!("bind_vertex_buffer({}, {}, {})", binding, buffer.as_raw(), offset),
        );
    }

    fn cmd_bind_index_buffer(&self, list: CommandListHandle, buffer: BufferHandle, offset: u64, index_type: IndexType) {
        self.state().record(
            list,
            format!("bind_index_buffer({}, {}, {:?})", buffer.as_raw(), offset, index_type),
        );
    }

    fn cmd_draw_indexed(
        &self,
        list: CommandListHandle,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        self.state().record(
            list,
            format!(
                "draw_indexed({}, {}, {}, {}, {})",
                index_count, instance_count, first_index, vertex_offset, first_instance
            ),
        );
    }
}

// ============================================================================
// Queue
// ============================================================================

impl QueueDevice for MockGraphicsDevice {
    fn create_semaphore(&self) -> Result<SemaphoreHandle> {
        let mut state = self.state();
        state.check("create_semaphore")?;
        Ok(SemaphoreHandle::from_raw(state.create("semaphore")))
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle) {
        self.state().destroy(semaphore.as_raw());
    }

    fn create_fence(&self) -> Result<FenceHandle> {
        let mut state = self.state();
        state.check("create_fence")?;
        Ok(FenceHandle::from_raw(state.create("fence")))
    }

    fn wait_for_fence(&self, _fence: FenceHandle, _timeout: u64) -> Result<()> {
        self.state().check("wait_for_fence")
    }

    fn destroy_fence(&self, fence: FenceHandle) {
        self.state().destroy(fence.as_raw());
    }

    fn queue_submit(&self, submit: &SubmitInfo<'_>, fence: Option<FenceHandle>) -> Result<()> {
        let mut state = self.state();
        state.check("queue_submit")?;
        state.submits.push(MockSubmit {
            command_lists: submit.command_lists.to_vec(),
            waits: submit.wait_semaphores.to_vec(),
            signals: submit.signal_semaphores.to_vec(),
            fenced: fence.is_some(),
        });
        Ok(())
    }

    fn queue_wait_idle(&self) -> Result<()> {
        let mut state = self.state();
        state.check("queue_wait_idle")?;
        state.wait_idle_count += 1;
        Ok(())
    }
}

// ============================================================================
// Presentation
// ============================================================================

impl PresentationDevice for MockGraphicsDevice {
    fn create_surface(&self, _display: RawDisplayHandle, _window: RawWindowHandle) -> Result<SurfaceHandle> {
        let mut state = self.state();
        state.check("create_surface")?;
        Ok(SurfaceHandle::from_raw(state.create("surface")))
    }

    fn destroy_surface(&self, surface: SurfaceHandle) {
        self.state().destroy(surface.as_raw());
    }

    fn surface_present_support(&self, _surface: SurfaceHandle) -> Result<bool> {
        Ok(self.state().present_support)
    }

    fn surface_capabilities(&self, _surface: SurfaceHandle) -> Result<SurfaceCapabilities> {
        Ok(self.state().capabilities)
    }

    fn surface_formats(&self, _surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>> {
        Ok(self.state().surface_formats.clone())
    }

    fn surface_present_modes(&self, _surface: SurfaceHandle) -> Result<Vec<PresentMode>> {
        Ok(self.state().present_modes.clone())
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle> {
        let mut state = self.state();
        state.check("create_swapchain")?;
        let swapchain = SwapchainHandle::from_raw(state.create("swapchain"));
        let mut images = Vec::with_capacity(desc.min_image_count as usize);
        for _ in 0..desc.min_image_count {
            // Owned by the swapchain, not tracked as live objects
            state.next_handle += 1;
            images.push(ImageHandle::from_raw(state.next_handle));
        }
        state.swapchains.insert(swapchain, MockSwapchain { images, next_image: 0 });
        state.swapchain_descs.push(*desc);
        Ok(swapchain)
    }

    fn destroy_swapchain(&self, swapchain: SwapchainHandle) {
        let mut state = self.state();
        state.swapchains.remove(&swapchain);
        state.destroy(swapchain.as_raw());
    }

    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        self.state()
            .swapchains
            .get(&swapchain)
            .map(|sc| sc.images.clone())
            .ok_or_else(|| Error::InvalidResource("unknown swapchain".to_string()))
    }

    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        _timeout: u64,
        _signal: SemaphoreHandle,
    ) -> Result<AcquireOutcome> {
        let mut state = self.state();
        state.check("acquire_next_image")?;
        let scripted = state.acquire_script.pop_front();
        let sc = state
            .swapchains
            .get_mut(&swapchain)
            .ok_or_else(|| Error::InvalidResource("unknown swapchain".to_string()))?;
        let outcome = scripted.unwrap_or(AcquireOutcome::Ready(sc.next_image));
        if let AcquireOutcome::Ready(index) | AcquireOutcome::Suboptimal(index) = outcome {
            sc.next_image = (index + 1) % sc.images.len() as u32;
        }
        Ok(outcome)
    }

    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        _wait: &[SemaphoreHandle],
    ) -> Result<PresentOutcome> {
        let mut state = self.state();
        state.check("queue_present")?;
        state.presents.push((swapchain, image_index));
        Ok(state.present_script.pop_front().unwrap_or(PresentOutcome::Presented))
    }
}

// ============================================================================
// Render targets
// ============================================================================

impl RenderTargetDevice for MockGraphicsDevice {
    fn supports_depth_stencil_format(&self, format: Format) -> bool {
        self.state().depth_formats.contains(&format)
    }

    fn create_image(&self, desc: &ImageDesc) -> Result<ImageHandle> {
        let mut state = self.state();
        state.check("create_image")?;
        state.image_descs.push(*desc);
        Ok(ImageHandle::from_raw(state.create("image")))
    }

    fn destroy_image(&self, image: ImageHandle) {
        self.state().destroy(image.as_raw());
    }

    fn create_image_view(&self, _desc: &ImageViewDesc) -> Result<ImageViewHandle> {
        let mut state = self.state();
        state.check("create_image_view")?;
        Ok(ImageViewHandle::from_raw(state.create("image_view")))
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        self.state().destroy(view.as_raw());
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<RenderPassHandle> {
        let mut state = self.state();
        state.check("create_render_pass")?;
        state.render_pass_descs.push(desc.clone());
        Ok(RenderPassHandle::from_raw(state.create("render_pass")))
    }

    fn destroy_render_pass(&self, render_pass: RenderPassHandle) {
        self.state().destroy(render_pass.as_raw());
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<FramebufferHandle> {
        let mut state = self.state();
        state.check("create_framebuffer")?;
        state.framebuffer_descs.push(desc.clone());
        Ok(FramebufferHandle::from_raw(state.create("framebuffer")))
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle) {
        self.state().destroy(framebuffer.as_raw());
    }
}

// ============================================================================
// Pipelines
// ============================================================================

impl PipelineDevice for MockGraphicsDevice {
    fn create_shader_module(&self, code: &[u8]) -> Result<ShaderModuleHandle> {
        let mut state = self.state();
        state.check("create_shader_module")?;
        state.shader_module_sizes.push(code.len());
        Ok(ShaderModuleHandle::from_raw(state.create("shader_module")))
    }

    fn destroy_shader_module(&self, module: ShaderModuleHandle) {
        self.state().destroy(module.as_raw());
    }

    fn create_pipeline_layout(&self) -> Result<PipelineLayoutHandle> {
        let mut state = self.state();
        state.check("create_pipeline_layout")?;
        Ok(PipelineLayoutHandle::from_raw(state.create("pipeline_layout")))
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle) {
        self.state().destroy(layout.as_raw());
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc) -> Result<PipelineHandle> {
        let mut state = self.state();
        state.check("create_graphics_pipeline")?;
        state.pipeline_descs.push(desc.clone());
        Ok(PipelineHandle::from_raw(state.create("pipeline")))
    }

    fn destroy_pipeline(&self, pipeline: PipelineHandle) {
        self.state().destroy(pipeline.as_raw());
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
