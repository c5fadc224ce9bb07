/// Window - presentation surface and per-frame acquire/record/submit/present
///
/// A window owns everything tied to one OS surface: the swapchain, one
/// `FrameSlot` per swapchain image, the depth target, the render pass and the
/// window's pipeline states. It is either fully built or fully torn down;
/// `resize` is the only way to go from one build to the next.
///
/// Frame protocol (single queue, single driving thread):
///
/// ```text
/// acquire(image_available) -> record primary list of current slot
///   -> submit(wait image_available @ ALL_COMMANDS, signal render_complete[slot])
///   -> present(wait render_complete[slot]) -> acquire next -> queue idle
/// ```

use std::sync::Arc;
use crate::config::RendererConfig;
use crate::error::Result;
use crate::device::{
    GraphicsDevice, CommandDevice, QueueDevice, PresentationDevice, RenderTargetDevice,
    SurfaceSource, AcquireOutcome, PresentOutcome, PresentMode, SwapchainDesc,
    Extent2D, Format, SurfaceFormat, ImageLayout, ImageAspectFlags, ImageUsageFlags,
    ImageDesc, ImageViewDesc, AttachmentDesc, LoadOp, StoreOp, RenderPassDesc, FramebufferDesc,
    CommandListLevel, CommandListBegin, ImageBarrier, AccessFlags, PipelineStageFlags,
    ClearValue, RenderPassBegin, SubpassContents, SemaphoreWait, SubmitInfo,
    MemoryPropertyFlags, CommandListHandle, CommandPoolHandle, FramebufferHandle, ImageHandle,
    ImageViewHandle, MemoryHandle, RenderPassHandle, SemaphoreHandle, SurfaceHandle,
    SwapchainHandle,
};
use crate::memory::BufferAllocator;
use crate::pipeline::{PipelineState, ShaderLoader};
use crate::scene::Scene;
use crate::surface::negotiation::{
    FALLBACK_SURFACE_FORMAT, choose_depth_format, choose_extent, choose_present_mode,
    choose_slot_count, choose_surface_format,
};
use crate::surface::SurfaceTargets;
use crate::{
    engine_config_err, engine_debug, engine_err, engine_error, engine_info, engine_invalid_err,
    engine_trace, engine_warn,
};

// ===== STATE =====

/// Lifecycle state of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    /// Built, no image acquired
    Built,
    /// An image has been requested and will be rendered next
    AcquirePending,
    Recording,
    Submitted,
    Presented,
    TornDown,
}

/// Resources of one swapchain image
#[derive(Debug, Clone, Copy, Default)]
struct FrameSlot {
    image: ImageHandle,
    view: ImageViewHandle,
    framebuffer: FramebufferHandle,
    command_list: CommandListHandle,
    render_complete: SemaphoreHandle,
}

/// Everything created by one build
///
/// Handles start out null; release only touches the ones that were created.
struct FrameResources {
    surface: SurfaceHandle,
    surface_format: SurfaceFormat,
    present_mode: PresentMode,
    extent: Extent2D,
    swapchain: SwapchainHandle,
    command_pool: CommandPoolHandle,
    slots: Vec<FrameSlot>,
    depth_format: Format,
    depth_image: ImageHandle,
    depth_memory: MemoryHandle,
    depth_view: ImageViewHandle,
    render_pass: RenderPassHandle,
    image_available: SemaphoreHandle,
    acquire_pending: bool,
}

impl FrameResources {
    fn empty() -> Self {
        Self {
            surface: SurfaceHandle::NULL,
            surface_format: FALLBACK_SURFACE_FORMAT,
            present_mode: PresentMode::Fifo,
            extent: Extent2D::default(),
            swapchain: SwapchainHandle::NULL,
            command_pool: CommandPoolHandle::NULL,
            slots: Vec::new(),
            depth_format: Format::UNDEFINED,
            depth_image: ImageHandle::NULL,
            depth_memory: MemoryHandle::NULL,
            depth_view: ImageViewHandle::NULL,
            render_pass: RenderPassHandle::NULL,
            image_available: SemaphoreHandle::NULL,
            acquire_pending: false,
        }
    }
}

/// Construction parameters, filled in by `Renderer::open_window`
pub(crate) struct WindowDesc {
    pub id: u64,
    pub name: String,
    pub device: Arc<dyn GraphicsDevice>,
    pub config: RendererConfig,
    pub loader: Arc<dyn ShaderLoader>,
    pub pipeline_names: Vec<String>,
    pub source: Arc<dyn SurfaceSource + Send + Sync>,
    pub dimensions: Extent2D,
}

// ===== WINDOW =====

pub struct Window {
    id: u64,
    name: String,
    device: Arc<dyn GraphicsDevice>,
    allocator: BufferAllocator,
    config: RendererConfig,
    loader: Arc<dyn ShaderLoader>,
    pipeline_names: Vec<String>,
    source: Arc<dyn SurfaceSource + Send + Sync>,
    requested_extent: Extent2D,
    state: SurfaceState,
    targets: Arc<SurfaceTargets>,
    pipelines: Vec<Arc<PipelineState>>,
    frame: Option<FrameResources>,
    stale: bool,
    frames_presented: u64,
}

impl Window {
    /// Build the window and issue the first image acquisition
    pub(crate) fn open(desc: WindowDesc) -> Result<Self> {
        let mut window = Self {
            id: desc.id,
            name: desc.name,
            allocator: BufferAllocator::new(Arc::clone(&desc.device)),
            device: desc.device,
            config: desc.config,
            loader: desc.loader,
            pipeline_names: desc.pipeline_names,
            source: desc.source,
            requested_extent: desc.dimensions,
            state: SurfaceState::Uninitialized,
            targets: Arc::new(SurfaceTargets::new(desc.id)),
            pipelines: Vec::new(),
            frame: None,
            stale: false,
            frames_presented: 0,
        };
        // On failure, Drop releases whatever was built
        window.build(desc.dimensions)?;
        Ok(window)
    }

    // ===== ACCESSORS =====

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Size of the render targets (the capability-clamped size)
    pub fn extent(&self) -> Extent2D {
        self.frame.as_ref().map(|f| f.extent).unwrap_or_default()
    }

    /// Size last asked for by `open` or `resize`
    pub fn requested_extent(&self) -> Extent2D {
        self.requested_extent
    }

    pub fn slot_count(&self) -> u32 {
        self.frame.as_ref().map(|f| f.slots.len() as u32).unwrap_or(0)
    }

    pub fn current_slot(&self) -> u32 {
        self.targets.current_slot()
    }

    pub fn surface_format(&self) -> Option<SurfaceFormat> {
        self.frame.as_ref().map(|f| f.surface_format)
    }

    pub fn present_mode(&self) -> Option<PresentMode> {
        self.frame.as_ref().map(|f| f.present_mode)
    }

    pub fn depth_format(&self) -> Option<Format> {
        self.frame.as_ref().map(|f| f.depth_format)
    }

    /// True once the surface reported out-of-date or suboptimal; `resize` clears it
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Render targets shared with the renderable objects bound to this window
    pub fn targets(&self) -> &Arc<SurfaceTargets> {
        &self.targets
    }

    pub fn pipelines(&self) -> &[Arc<PipelineState>] {
        &self.pipelines
    }

    /// Pipeline state by name
    pub fn find_pipeline(&self, name: &str) -> Option<Arc<PipelineState>> {
        self.pipelines.iter().find(|p| p.name() == name).cloned()
    }

    // ===== FRAME LOOP =====

    /// Record, submit and present one frame executing `command_lists` in order
    ///
    /// Blocks until the queue is idle. Returns the outcome of the next image
    /// acquisition; `OutOfDate` or `Suboptimal` means the caller should
    /// `resize`. When no image could be acquired the frame is skipped and
    /// `OutOfDate` is returned.
    pub fn render(&mut self, command_lists: &[CommandListHandle]) -> Result<AcquireOutcome> {
        let frame = self.frame.as_ref().ok_or_else(|| engine_invalid_err!("lumen::Window",
            "Window '{}' is torn down", self.name))?;

        if !frame.acquire_pending {
            engine_debug!("lumen::Window", "Window '{}' has no acquired image, skipping frame", self.name);
            return Ok(AcquireOutcome::OutOfDate);
        }

        let slot_index = self.targets.current_slot();
        let slot = frame.slots[slot_index as usize];
        let swapchain = frame.swapchain;
        let image_available = frame.image_available;
        let render_pass = frame.render_pass;
        let extent = frame.extent;

        self.set_state(SurfaceState::Recording);
        if let Err(e) = self.record_frame(&slot, render_pass, extent, command_lists) {
            // The acquired image is still pending
            self.set_state(SurfaceState::AcquirePending);
            return Err(e);
        }

        let waits = [SemaphoreWait {
            semaphore: image_available,
            stage: PipelineStageFlags::ALL_COMMANDS,
        }];
        self.device.queue_submit(
            &SubmitInfo {
                command_lists: &[slot.command_list],
                wait_semaphores: &waits,
                signal_semaphores: &[slot.render_complete],
            },
            None,
        )?;
        if let Some(frame) = self.frame.as_mut() {
            frame.acquire_pending = false;
        }
        self.set_state(SurfaceState::Submitted);

        let presented = self.device.queue_present(swapchain, slot_index, &[slot.render_complete])?;
        self.set_state(SurfaceState::Presented);
        self.frames_presented += 1;
        if presented != PresentOutcome::Presented {
            engine_warn!("lumen::Window", "Window '{}' presentation reported {:?}", self.name, presented);
            self.stale = true;
        }

        let next = self.acquire()?;

        // Simple synchronization: the next frame starts from an idle queue
        self.device.queue_wait_idle()?;
        Ok(next)
    }

    /// Collect the scene's command lists and render them
    pub fn render_scene(&mut self, scene: &mut Scene, force_rebuild: bool) -> Result<AcquireOutcome> {
        let mut command_lists = Vec::new();
        scene.collect_command_lists(&mut command_lists, force_rebuild)?;
        self.render(&command_lists)
    }

    /// Tear down every per-surface resource and rebuild at `dimensions`
    ///
    /// Pipelines are rebuilt in place; every object bound to this window sees
    /// a new target generation and re-records on its next use. Returns the
    /// size actually used.
    pub fn resize(&mut self, dimensions: Extent2D) -> Result<Extent2D> {
        engine_info!("lumen::Window", "Resizing window '{}' to {}x{}",
            self.name, dimensions.width, dimensions.height);
        self.teardown();
        self.requested_extent = dimensions;
        self.build(dimensions)?;
        Ok(self.extent())
    }

    fn record_frame(
        &self,
        slot: &FrameSlot,
        render_pass: RenderPassHandle,
        extent: Extent2D,
        command_lists: &[CommandListHandle],
    ) -> Result<()> {
        let device = self.device.as_ref();
        let list = slot.command_list;

        device.begin_command_list(list, &CommandListBegin::one_time_submit())?;

        device.cmd_image_barrier(list, &ImageBarrier {
            image: slot.image,
            aspect: ImageAspectFlags::COLOR,
            old_layout: ImageLayout::PresentSrc,
            new_layout: ImageLayout::ColorAttachment,
            src_access: AccessFlags::MEMORY_READ,
            dst_access: AccessFlags::COLOR_ATTACHMENT_WRITE | AccessFlags::MEMORY_WRITE,
            src_stage: PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: PipelineStageFlags::FRAGMENT_SHADER,
        });

        let clear_values = [
            ClearValue::DepthStencil {
                depth: self.config.clear_depth,
                stencil: self.config.clear_stencil,
            },
            ClearValue::Color(self.config.clear_color),
        ];
        device.cmd_begin_render_pass(list, &RenderPassBegin {
            render_pass,
            framebuffer: slot.framebuffer,
            extent,
            clear_values: &clear_values,
            contents: SubpassContents::SecondaryCommandLists,
        });
        if !command_lists.is_empty() {
            device.cmd_execute_commands(list, command_lists);
        }
        device.cmd_end_render_pass(list);

        device.cmd_image_barrier(list, &ImageBarrier {
            image: slot.image,
            aspect: ImageAspectFlags::COLOR,
            old_layout: ImageLayout::ColorAttachment,
            new_layout: ImageLayout::PresentSrc,
            src_access: AccessFlags::COLOR_ATTACHMENT_WRITE | AccessFlags::MEMORY_WRITE,
            dst_access: AccessFlags::MEMORY_READ,
            src_stage: PipelineStageFlags::BOTTOM_OF_PIPE,
            dst_stage: PipelineStageFlags::BOTTOM_OF_PIPE,
        });

        device.end_command_list(list)
    }

    /// Request the next image into "image available"
    fn acquire(&mut self) -> Result<AcquireOutcome> {
        let frame = self.frame.as_mut().ok_or_else(|| engine_invalid_err!("lumen::Window",
            "Window '{}' is torn down", self.name))?;

        let outcome = self.device.acquire_next_image(
            frame.swapchain,
            self.config.acquire_timeout,
            frame.image_available,
        )?;

        match outcome {
            AcquireOutcome::Ready(index) | AcquireOutcome::Suboptimal(index) => {
                if index as usize >= frame.slots.len() {
                    return Err(engine_err!("lumen::Window",
                        "Acquired image {} but window '{}' has {} slots",
                        index, self.name, frame.slots.len()));
                }
                frame.acquire_pending = true;
                self.targets.set_current_slot(index);
                if let AcquireOutcome::Suboptimal(_) = outcome {
                    engine_warn!("lumen::Window", "Window '{}' surface is suboptimal", self.name);
                    self.stale = true;
                }
                self.set_state(SurfaceState::AcquirePending);
            }
            AcquireOutcome::OutOfDate => {
                engine_warn!("lumen::Window", "Window '{}' surface is out of date", self.name);
                frame.acquire_pending = false;
                self.stale = true;
                self.set_state(SurfaceState::Built);
            }
        }
        Ok(outcome)
    }

    fn set_state(&mut self, state: SurfaceState) {
        engine_trace!("lumen::Window", "Window '{}': {:?} -> {:?}", self.name, self.state, state);
        self.state = state;
    }

    // ===== BUILD / TEARDOWN =====

    fn build(&mut self, dimensions: Extent2D) -> Result<()> {
        let frame = self.create_frame(dimensions)?;
        let render_pass = frame.render_pass;
        let extent = frame.extent;
        let framebuffers = frame.slots.iter().map(|slot| slot.framebuffer).collect();
        let generation = self.targets.publish(render_pass, framebuffers, extent);

        engine_info!("lumen::Window",
            "Built window '{}': {}x{}, {} slots, {:?}, {:?}, depth {:?} (generation {})",
            self.name, extent.width, extent.height, frame.slots.len(),
            frame.surface_format.format, frame.present_mode, frame.depth_format, generation);

        self.frame = Some(frame);
        self.stale = false;
        self.set_state(SurfaceState::Built);

        let finished = self.build_pipelines(render_pass, extent).and_then(|()| self.acquire());
        if let Err(e) = finished {
            engine_error!("lumen::Window", "Failed to finish building window '{}': {}", self.name, e);
            self.teardown();
            return Err(e);
        }
        Ok(())
    }

    fn build_pipelines(&mut self, render_pass: RenderPassHandle, extent: Extent2D) -> Result<()> {
        if self.pipelines.is_empty() {
            for name in &self.pipeline_names {
                let pipeline = PipelineState::create(
                    Arc::clone(&self.device),
                    self.loader.as_ref(),
                    name,
                    render_pass,
                    extent,
                )?;
                self.pipelines.push(pipeline);
            }
        } else {
            for pipeline in &self.pipelines {
                pipeline.rebuild(self.loader.as_ref(), render_pass, extent)?;
            }
        }
        Ok(())
    }

    fn create_frame(&self, dimensions: Extent2D) -> Result<FrameResources> {
        let mut frame = FrameResources::empty();
        match self.populate_frame(&mut frame, dimensions) {
            Ok(()) => Ok(frame),
            Err(e) => {
                engine_error!("lumen::Window", "Failed to build window '{}': {}", self.name, e);
                self.release_frame(frame);
                Err(e)
            }
        }
    }

    fn populate_frame(&self, frame: &mut FrameResources, dimensions: Extent2D) -> Result<()> {
        let device = self.device.as_ref();

        // ========== SURFACE NEGOTIATION ==========
        frame.surface = device.create_surface(
            self.source.raw_display_handle()?,
            self.source.raw_window_handle()?,
        )?;
        if !device.surface_present_support(frame.surface)? {
            return Err(engine_config_err!("lumen::Window",
                "Queue cannot present to the surface of window '{}'", self.name));
        }
        let capabilities = device.surface_capabilities(frame.surface)?;
        frame.surface_format = choose_surface_format(&device.surface_formats(frame.surface)?)?;
        frame.present_mode = choose_present_mode(&device.surface_present_modes(frame.surface)?)?;
        frame.extent = choose_extent(dimensions, &capabilities)?;
        frame.depth_format = choose_depth_format(
            &self.config.depth_format_candidates,
            |format| device.supports_depth_stencil_format(format),
        )?;
        let slot_count = choose_slot_count(self.config.preferred_slot_count, &capabilities);

        frame.command_pool = device.create_command_pool()?;

        // ========== SWAPCHAIN ==========
        frame.swapchain = device.create_swapchain(&SwapchainDesc {
            surface: frame.surface,
            min_image_count: slot_count,
            format: frame.surface_format,
            extent: frame.extent,
            present_mode: frame.present_mode,
            usage: ImageUsageFlags::COLOR_ATTACHMENT | ImageUsageFlags::TRANSFER_DST,
        })?;
        let images = device.swapchain_images(frame.swapchain)?;
        if images.is_empty() {
            return Err(engine_err!("lumen::Window", "Swapchain of window '{}' has no images", self.name));
        }
        frame.slots = images
            .into_iter()
            .map(|image| FrameSlot { image, ..FrameSlot::default() })
            .collect();

        let color_format = frame.surface_format.format;
        for slot in &mut frame.slots {
            slot.view = device.create_image_view(&ImageViewDesc {
                image: slot.image,
                format: color_format,
                aspect: ImageAspectFlags::COLOR,
            })?;
        }

        // ========== DEPTH TARGET ==========
        let depth_aspect = depth_aspect(frame.depth_format);
        frame.depth_image = device.create_image(&ImageDesc {
            extent: frame.extent,
            format: frame.depth_format,
            usage: ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT | ImageUsageFlags::TRANSFER_SRC,
        })?;
        frame.depth_memory = self.allocator.allocate_image_memory(
            frame.depth_image,
            MemoryPropertyFlags::DEVICE_LOCAL,
        )?;
        frame.depth_view = device.create_image_view(&ImageViewDesc {
            image: frame.depth_image,
            format: frame.depth_format,
            aspect: depth_aspect,
        })?;

        self.run_setup_pass(frame, depth_aspect)?;

        // ========== RENDER PASS + FRAMEBUFFERS ==========
        frame.render_pass = device.create_render_pass(&render_pass_desc(color_format, frame.depth_format))?;
        let render_pass = frame.render_pass;
        let depth_view = frame.depth_view;
        let extent = frame.extent;
        for slot in &mut frame.slots {
            slot.framebuffer = device.create_framebuffer(&FramebufferDesc {
                render_pass,
                attachments: vec![depth_view, slot.view],
                extent,
            })?;
        }

        // ========== FRAME COMMANDS + SYNC ==========
        let lists = device.allocate_command_lists(
            frame.command_pool,
            CommandListLevel::Primary,
            frame.slots.len() as u32,
        )?;
        for (slot, list) in frame.slots.iter_mut().zip(lists) {
            slot.command_list = list;
        }
        for slot in &mut frame.slots {
            slot.render_complete = device.create_semaphore()?;
        }
        frame.image_available = device.create_semaphore()?;
        Ok(())
    }

    /// Move every swapchain image to PRESENT_SRC and the depth image to
    /// DEPTH_STENCIL_ATTACHMENT, waiting on a fence
    fn run_setup_pass(&self, frame: &FrameResources, depth_aspect: ImageAspectFlags) -> Result<()> {
        let device = self.device.as_ref();
        let list = device
            .allocate_command_lists(frame.command_pool, CommandListLevel::Primary, 1)?
            .into_iter()
            .next()
            .ok_or_else(|| engine_err!("lumen::Window", "No setup command list allocated"))?;

        let result = self.record_setup_pass(list, frame, depth_aspect).and_then(|()| {
            let fence = device.create_fence()?;
            let submitted = device
                .queue_submit(&SubmitInfo { command_lists: &[list], ..SubmitInfo::default() }, Some(fence))
                .and_then(|()| device.wait_for_fence(fence, u64::MAX));
            device.destroy_fence(fence);
            submitted
        });

        device.free_command_lists(frame.command_pool, &[list]);
        result
    }

    fn record_setup_pass(&self, list: CommandListHandle, frame: &FrameResources, depth_aspect: ImageAspectFlags) -> Result<()> {
        let device = self.device.as_ref();
        device.begin_command_list(list, &CommandListBegin::one_time_submit())?;

        for slot in &frame.slots {
            device.cmd_image_barrier(list, &ImageBarrier {
                image: slot.image,
                aspect: ImageAspectFlags::COLOR,
                old_layout: ImageLayout::Undefined,
                new_layout: ImageLayout::PresentSrc,
                src_access: AccessFlags::empty(),
                dst_access: AccessFlags::MEMORY_READ,
                src_stage: PipelineStageFlags::TOP_OF_PIPE,
                dst_stage: PipelineStageFlags::TOP_OF_PIPE,
            });
        }
        device.cmd_image_barrier(list, &ImageBarrier {
            image: frame.depth_image,
            aspect: depth_aspect,
            old_layout: ImageLayout::Undefined,
            new_layout: ImageLayout::DepthStencilAttachment,
            src_access: AccessFlags::empty(),
            dst_access: AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            src_stage: PipelineStageFlags::TOP_OF_PIPE,
            dst_stage: PipelineStageFlags::TOP_OF_PIPE,
        });

        device.end_command_list(list)
    }

    /// Drain the queue and destroy everything `build` created
    fn teardown(&mut self) {
        let Some(frame) = self.frame.take() else {
            self.state = SurfaceState::TornDown;
            return;
        };

        let device = self.device.as_ref();
        if frame.acquire_pending {
            // The pending acquisition still signals "image available"
            let waits = [SemaphoreWait {
                semaphore: frame.image_available,
                stage: PipelineStageFlags::TOP_OF_PIPE,
            }];
            let drain = SubmitInfo { wait_semaphores: &waits, ..SubmitInfo::default() };
            if let Err(e) = device.queue_submit(&drain, None) {
                engine_warn!("lumen::Window", "Failed to drain pending acquisition: {}", e);
            }
        }
        if let Err(e) = device.queue_wait_idle() {
            engine_warn!("lumen::Window", "Queue wait before teardown failed: {}", e);
        }

        for pipeline in &self.pipelines {
            pipeline.destroy();
        }
        self.targets.retire();
        self.release_frame(frame);

        engine_debug!("lumen::Window", "Tore down window '{}'", self.name);
        self.set_state(SurfaceState::TornDown);
    }

    fn release_frame(&self, frame: FrameResources) {
        let device = self.device.as_ref();

        if !frame.image_available.is_null() {
            device.destroy_semaphore(frame.image_available);
        }
        for slot in &frame.slots {
            if !slot.render_complete.is_null() {
                device.destroy_semaphore(slot.render_complete);
            }
            if !slot.framebuffer.is_null() {
                device.destroy_framebuffer(slot.framebuffer);
            }
        }
        if !frame.render_pass.is_null() {
            device.destroy_render_pass(frame.render_pass);
        }
        if !frame.depth_view.is_null() {
            device.destroy_image_view(frame.depth_view);
        }
        if !frame.depth_image.is_null() {
            device.destroy_image(frame.depth_image);
        }
        if !frame.depth_memory.is_null() {
            device.free_memory(frame.depth_memory);
        }
        for slot in &frame.slots {
            if !slot.view.is_null() {
                device.destroy_image_view(slot.view);
            }
        }
        // Frees the primary lists with it
        if !frame.command_pool.is_null() {
            device.destroy_command_pool(frame.command_pool);
        }
        if !frame.swapchain.is_null() {
            device.destroy_swapchain(frame.swapchain);
        }
        if !frame.surface.is_null() {
            device.destroy_surface(frame.surface);
        }
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn depth_aspect(format: Format) -> ImageAspectFlags {
    if format.has_stencil() {
        ImageAspectFlags::DEPTH | ImageAspectFlags::STENCIL
    } else {
        ImageAspectFlags::DEPTH
    }
}

/// Attachment 0 is depth/stencil, attachment 1 is color; one graphics subpass
fn render_pass_desc(color_format: Format, depth_format: Format) -> RenderPassDesc {
    RenderPassDesc {
        attachments: vec![
            AttachmentDesc {
                format: depth_format,
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                stencil_load_op: LoadOp::Load,
                stencil_store_op: StoreOp::Store,
                initial_layout: ImageLayout::DepthStencilAttachment,
                final_layout: ImageLayout::DepthStencilAttachment,
            },
            AttachmentDesc {
                format: color_format,
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                stencil_load_op: LoadOp::DontCare,
                stencil_store_op: StoreOp::DontCare,
                initial_layout: ImageLayout::ColorAttachment,
                final_layout: ImageLayout::ColorAttachment,
            },
        ],
        color_attachment: 1,
        depth_attachment: Some(0),
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
