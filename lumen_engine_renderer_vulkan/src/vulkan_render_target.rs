/// Images, render passes and framebuffers for VulkanGraphicsDevice

use ash::vk;
use ash::vk::Handle;
use lumen_engine::lumen::Result;
use lumen_engine::lumen::device::{
    RenderTargetDevice, Format, ImageDesc, ImageViewDesc, RenderPassDesc, FramebufferDesc,
    ImageLayout, ImageHandle, ImageViewHandle, RenderPassHandle, FramebufferHandle,
};
use lumen_engine::engine_err;

use crate::vulkan_device::VulkanGraphicsDevice;
use crate::vulkan_format::{extent_to_vk, format_to_vk, image_layout_to_vk, load_op_to_vk, store_op_to_vk};

impl RenderTargetDevice for VulkanGraphicsDevice {
    fn supports_depth_stencil_format(&self, format: Format) -> bool {
        let properties = unsafe {
            self.context.instance.get_physical_device_format_properties(
                self.context.physical_device,
                format_to_vk(format),
            )
        };
        properties
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
    }

    fn create_image(&self, desc: &ImageDesc) -> Result<ImageHandle> {
        let info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format_to_vk(desc.format))
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(vk::ImageUsageFlags::from_raw(desc.usage.bits()))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);
        let image = unsafe { self.context.device.create_image(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create image: {:?}", e))?;
        Ok(ImageHandle::from_raw(image.as_raw()))
    }

    fn destroy_image(&self, image: ImageHandle) {
        unsafe { self.context.device.destroy_image(vk::Image::from_raw(image.as_raw()), None) };
    }

    fn create_image_view(&self, desc: &ImageViewDesc) -> Result<ImageViewHandle> {
        let info = vk::ImageViewCreateInfo::default()
            .image(vk::Image::from_raw(desc.image.as_raw()))
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format_to_vk(desc.format))
            .components(vk::ComponentMapping::default())
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::from_raw(desc.aspect.bits()),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        let view = unsafe { self.context.device.create_image_view(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create image view: {:?}", e))?;
        Ok(ImageViewHandle::from_raw(view.as_raw()))
    }

    fn destroy_image_view(&self, view: ImageViewHandle) {
        unsafe { self.context.device.destroy_image_view(vk::ImageView::from_raw(view.as_raw()), None) };
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<RenderPassHandle> {
        let attachments: Vec<vk::AttachmentDescription> = desc.attachments
            .iter()
            .map(|attachment| vk::AttachmentDescription {
                format: format_to_vk(attachment.format),
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: load_op_to_vk(attachment.load_op),
                store_op: store_op_to_vk(attachment.store_op),
                stencil_load_op: load_op_to_vk(attachment.stencil_load_op),
                stencil_store_op: store_op_to_vk(attachment.stencil_store_op),
                initial_layout: image_layout_to_vk(attachment.initial_layout),
                final_layout: image_layout_to_vk(attachment.final_layout),
                ..Default::default()
            })
            .collect();

        let color_refs = [vk::AttachmentReference {
            attachment: desc.color_attachment,
            layout: image_layout_to_vk(ImageLayout::ColorAttachment),
        }];
        let depth_ref = desc.depth_attachment.map(|attachment| vk::AttachmentReference {
            attachment,
            layout: image_layout_to_vk(ImageLayout::DepthStencilAttachment),
        });

        let mut subpass = vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs);
        if let Some(depth_ref) = depth_ref.as_ref() {
            subpass = subpass.depth_stencil_attachment(depth_ref);
        }
        let subpasses = [subpass];

        let info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses);
        let render_pass = unsafe { self.context.device.create_render_pass(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create render pass: {:?}", e))?;
        Ok(RenderPassHandle::from_raw(render_pass.as_raw()))
    }

    fn destroy_render_pass(&self, render_pass: RenderPassHandle) {
        unsafe {
            self.context.device.destroy_render_pass(vk::RenderPass::from_raw(render_pass.as_raw()), None)
        };
    }

    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<FramebufferHandle> {
        let attachments: Vec<vk::ImageView> = desc.attachments
            .iter()
            .map(|view| vk::ImageView::from_raw(view.as_raw()))
            .collect();
        let extent = extent_to_vk(desc.extent);
        let info = vk::FramebufferCreateInfo::default()
            .render_pass(vk::RenderPass::from_raw(desc.render_pass.as_raw()))
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);
        let framebuffer = unsafe { self.context.device.create_framebuffer(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create framebuffer: {:?}", e))?;
        Ok(FramebufferHandle::from_raw(framebuffer.as_raw()))
    }

    fn destroy_framebuffer(&self, framebuffer: FramebufferHandle) {
        unsafe {
            self.context.device.destroy_framebuffer(vk::Framebuffer::from_raw(framebuffer.as_raw()), None)
        };
    }
}
