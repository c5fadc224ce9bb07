/// Command pools and command recording for VulkanGraphicsDevice

use ash::vk;
use ash::vk::Handle;
use lumen_engine::lumen::Result;
use lumen_engine::lumen::device::{
    CommandDevice, CommandListLevel, CommandListBegin, ImageBarrier, RenderPassBegin,
    ClearValue, SubpassContents, IndexType, BufferHandle, CommandPoolHandle, CommandListHandle,
    PipelineHandle,
};
use lumen_engine::engine_err;

use crate::vulkan_device::VulkanGraphicsDevice;
use crate::vulkan_format::{extent_to_vk, image_layout_to_vk, index_type_to_vk};

fn command_buffer(list: CommandListHandle) -> vk::CommandBuffer {
    vk::CommandBuffer::from_raw(list.as_raw())
}

fn clear_value_to_vk(value: &ClearValue) -> vk::ClearValue {
    match *value {
        ClearValue::Color(float32) => vk::ClearValue {
            color: vk::ClearColorValue { float32 },
        },
        ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
        },
    }
}

impl CommandDevice for VulkanGraphicsDevice {
    fn create_command_pool(&self) -> Result<CommandPoolHandle> {
        // Lists are re-recorded individually
        let info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(self.context.queue_family)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let pool = unsafe { self.context.device.create_command_pool(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create command pool: {:?}", e))?;
        Ok(CommandPoolHandle::from_raw(pool.as_raw()))
    }

    fn destroy_command_pool(&self, pool: CommandPoolHandle) {
        unsafe {
            self.context.device.destroy_command_pool(vk::CommandPool::from_raw(pool.as_raw()), None)
        };
    }

    fn allocate_command_lists(
        &self,
        pool: CommandPoolHandle,
        level: CommandListLevel,
        count: u32,
    ) -> Result<Vec<CommandListHandle>> {
        let level = match level {
            CommandListLevel::Primary => vk::CommandBufferLevel::PRIMARY,
            CommandListLevel::Secondary => vk::CommandBufferLevel::SECONDARY,
        };
        let info = vk::CommandBufferAllocateInfo::default()
            .command_pool(vk::CommandPool::from_raw(pool.as_raw()))
            .level(level)
            .command_buffer_count(count);
        let buffers = unsafe { self.context.device.allocate_command_buffers(&info) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to allocate {} command buffers: {:?}", count, e))?;
        Ok(buffers.into_iter().map(|buffer| CommandListHandle::from_raw(buffer.as_raw())).collect())
    }

    fn free_command_lists(&self, pool: CommandPoolHandle, lists: &[CommandListHandle]) {
        let buffers: Vec<vk::CommandBuffer> = lists.iter().map(|list| command_buffer(*list)).collect();
        unsafe {
            self.context.device.free_command_buffers(vk::CommandPool::from_raw(pool.as_raw()), &buffers)
        };
    }

    fn begin_command_list(&self, list: CommandListHandle, begin: &CommandListBegin) -> Result<()> {
        let mut flags = vk::CommandBufferUsageFlags::empty();
        if begin.one_time_submit {
            flags |= vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT;
        }

        let inheritance = begin.inheritance.map(|inheritance| {
            vk::CommandBufferInheritanceInfo::default()
                .render_pass(vk::RenderPass::from_raw(inheritance.render_pass.as_raw()))
                .subpass(inheritance.subpass)
                .framebuffer(vk::Framebuffer::from_raw(inheritance.framebuffer.as_raw()))
        });

        let mut info = vk::CommandBufferBeginInfo::default();
        if let Some(inheritance) = inheritance.as_ref() {
            flags |= vk::CommandBufferUsageFlags::RENDER_PASS_CONTINUE;
            info = info.inheritance_info(inheritance);
        }
        let info = info.flags(flags);

        unsafe { self.context.device.begin_command_buffer(command_buffer(list), &info) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to begin command buffer: {:?}", e))
    }

    fn end_command_list(&self, list: CommandListHandle) -> Result<()> {
        unsafe { self.context.device.end_command_buffer(command_buffer(list)) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to end command buffer: {:?}", e))
    }

    fn cmd_image_barrier(&self, list: CommandListHandle, barrier: &ImageBarrier) {
        let image_barrier = vk::ImageMemoryBarrier::default()
            .src_access_mask(vk::AccessFlags::from_raw(barrier.src_access.bits()))
            .dst_access_mask(vk::AccessFlags::from_raw(barrier.dst_access.bits()))
            .old_layout(image_layout_to_vk(barrier.old_layout))
            .new_layout(image_layout_to_vk(barrier.new_layout))
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(vk::Image::from_raw(barrier.image.as_raw()))
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::from_raw(barrier.aspect.bits()),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe {
            self.context.device.cmd_pipeline_barrier(
                command_buffer(list),
                vk::PipelineStageFlags::from_raw(barrier.src_stage.bits()),
                vk::PipelineStageFlags::from_raw(barrier.dst_stage.bits()),
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[image_barrier],
            );
        }
    }

    fn cmd_begin_render_pass(&self, list: CommandListHandle, begin: &RenderPassBegin<'_>) {
        let clear_values: Vec<vk::ClearValue> = begin.clear_values.iter().map(clear_value_to_vk).collect();
        let info = vk::RenderPassBeginInfo::default()
            .render_pass(vk::RenderPass::from_raw(begin.render_pass.as_raw()))
            .framebuffer(vk::Framebuffer::from_raw(begin.framebuffer.as_raw()))
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: extent_to_vk(begin.extent),
            })
            .clear_values(&clear_values);
        let contents = match begin.contents {
            SubpassContents::Inline => vk::SubpassContents::INLINE,
            SubpassContents::SecondaryCommandLists => vk::SubpassContents::SECONDARY_COMMAND_BUFFERS,
        };
        unsafe { self.context.device.cmd_begin_render_pass(command_buffer(list), &info, contents) };
    }

    fn cmd_end_render_pass(&self, list: CommandListHandle) {
        unsafe { self.context.device.cmd_end_render_pass(command_buffer(list)) };
    }

    fn cmd_execute_commands(&self, list: CommandListHandle, secondary: &[CommandListHandle]) {
        let buffers: Vec<vk::CommandBuffer> = secondary.iter().map(|list| command_buffer(*list)).collect();
        unsafe { self.context.device.cmd_execute_commands(command_buffer(list), &buffers) };
    }

    fn cmd_bind_pipeline(&self, list: CommandListHandle, pipeline: PipelineHandle) {
        unsafe {
            self.context.device.cmd_bind_pipeline(
                command_buffer(list),
                vk::PipelineBindPoint::GRAPHICS,
                vk::Pipeline::from_raw(pipeline.as_raw()),
            );
        }
    }

    fn cmd_bind_vertex_buffer(&self, list: CommandListHandle, binding: u32, buffer: BufferHandle, offset: u64) {
        unsafe {
            self.context.device.cmd_bind_vertex_buffers(
                command_buffer(list),
                binding,
                &[vk::Buffer::from_raw(buffer.as_raw())],
                &[offset],
            );
        }
    }

    fn cmd_bind_index_buffer(&self, list: CommandListHandle, buffer: BufferHandle, offset: u64, index_type: IndexType) {
        unsafe {
            self.context.device.cmd_bind_index_buffer(
                command_buffer(list),
                vk::Buffer::from_raw(buffer.as_raw()),
                offset,
                index_type_to_vk(index_type),
            );
        }
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
        unsafe {
            self.context.device.cmd_draw_indexed(
                command_buffer(list),
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            );
        }
    }
}
