/// Shader modules, pipeline layouts and graphics pipelines for VulkanGraphicsDevice
///
/// Every module is reflected with spirq when it is created; pipeline creation
/// checks that the requested entry point exists in both stages before handing
/// the description to the driver.

use ash::vk;
use ash::vk::Handle;
use std::ffi::CString;
use lumen_engine::lumen::Result;
use lumen_engine::lumen::device::{
    PipelineDevice, GraphicsPipelineDesc, ShaderModuleHandle, PipelineLayoutHandle, PipelineHandle,
};
use lumen_engine::{engine_config_err, engine_err, engine_trace};

use crate::vulkan_device::{shader_module, VulkanGraphicsDevice};
use crate::vulkan_format::{
    blend_factor_to_vk, blend_op_to_vk, color_write_mask_to_vk, compare_op_to_vk, cull_mode_to_vk,
    extent_to_vk, format_to_vk, front_face_to_vk, polygon_mode_to_vk, stencil_state_to_vk,
    topology_to_vk,
};

/// SPIR-V bytes to words (little endian, length a multiple of 4)
pub(crate) fn spirv_words(code: &[u8]) -> Result<Vec<u32>> {
    if code.is_empty() || code.len() % 4 != 0 {
        return Err(engine_config_err!("lumen::vulkan",
            "SPIR-V binary size {} is not a non-zero multiple of 4", code.len()));
    }
    Ok(code
        .chunks_exact(4)
        .map(|word| u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
        .collect())
}

/// Names of the entry points declared by a SPIR-V module
pub(crate) fn reflect_entry_points(words: &[u32]) -> Result<Vec<String>> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(words)
        .reflect()
        .map_err(|e| engine_config_err!("lumen::vulkan", "SPIR-V reflection failed: {:?}", e))?;
    Ok(entry_points.into_iter().map(|entry_point| entry_point.name).collect())
}

impl VulkanGraphicsDevice {
    fn require_entry_point(&self, module: ShaderModuleHandle, entry_point: &str) -> Result<()> {
        let entry_points = self.shader_entry_points();
        match entry_points.get(&module.as_raw()) {
            Some(names) if names.iter().any(|name| name == entry_point) => Ok(()),
            Some(names) => Err(engine_config_err!("lumen::vulkan",
                "Shader module has no entry point '{}' (found {:?})", entry_point, names)),
            None => Err(engine_config_err!("lumen::vulkan",
                "Unknown shader module {:?}", module)),
        }
    }
}

impl PipelineDevice for VulkanGraphicsDevice {
    fn create_shader_module(&self, code: &[u8]) -> Result<ShaderModuleHandle> {
        let words = spirv_words(code)?;
        let entry_points = reflect_entry_points(&words)?;

        let info = vk::ShaderModuleCreateInfo::default().code(&words);
        let module = unsafe { self.context.device.create_shader_module(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create shader module: {:?}", e))?;

        engine_trace!("lumen::vulkan", "Shader module with entry points {:?}", entry_points);
        self.shader_entry_points().insert(module.as_raw(), entry_points);
        Ok(ShaderModuleHandle::from_raw(module.as_raw()))
    }

    fn destroy_shader_module(&self, module: ShaderModuleHandle) {
        if self.shader_entry_points().remove(&module.as_raw()).is_some() {
            unsafe { self.context.device.destroy_shader_module(shader_module(module), None) };
        }
    }

    fn create_pipeline_layout(&self) -> Result<PipelineLayoutHandle> {
        let info = vk::PipelineLayoutCreateInfo::default();
        let layout = unsafe { self.context.device.create_pipeline_layout(&info, None) }
            .map_err(|e| engine_err!("lumen::vulkan", "Failed to create pipeline layout: {:?}", e))?;
        Ok(PipelineLayoutHandle::from_raw(layout.as_raw()))
    }

    fn destroy_pipeline_layout(&self, layout: PipelineLayoutHandle) {
        unsafe {
            self.context.device.destroy_pipeline_layout(vk::PipelineLayout::from_raw(layout.as_raw()), None)
        };
    }

    fn create_graphics_pipeline(&self, desc: &GraphicsPipelineDesc) -> Result<PipelineHandle> {
        self.require_entry_point(desc.vertex_shader, &desc.entry_point)?;
        self.require_entry_point(desc.fragment_shader, &desc.entry_point)?;

        let entry_point = CString::new(desc.entry_point.as_str())
            .map_err(|e| engine_config_err!("lumen::vulkan", "Invalid entry point name: {}", e))?;
        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(shader_module(desc.vertex_shader))
                .name(&entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(shader_module(desc.fragment_shader))
                .name(&entry_point),
        ];

        let bindings = [vk::VertexInputBindingDescription {
            binding: 0,
            stride: desc.vertex_stride,
            input_rate: vk::VertexInputRate::VERTEX,
        }];
        let attributes: Vec<vk::VertexInputAttributeDescription> = desc.vertex_attributes
            .iter()
            .map(|attribute| vk::VertexInputAttributeDescription {
                location: attribute.location,
                binding: 0,
                format: format_to_vk(attribute.format),
                offset: attribute.offset,
            })
            .collect();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&bindings)
            .vertex_attribute_descriptions(&attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(topology_to_vk(desc.topology))
            .primitive_restart_enable(false);

        let extent = extent_to_vk(desc.extent);
        let viewports = [vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }];
        let scissors = [vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        }];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        let raster = &desc.rasterization;
        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(polygon_mode_to_vk(raster.polygon_mode))
            .cull_mode(cull_mode_to_vk(raster.cull_mode))
            .front_face(front_face_to_vk(raster.front_face))
            .depth_bias_enable(false)
            .line_width(raster.line_width);

        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let depth = &desc.depth_stencil;
        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(depth.depth_test_enable)
            .depth_write_enable(depth.depth_write_enable)
            .depth_compare_op(compare_op_to_vk(depth.depth_compare_op))
            .depth_bounds_test_enable(depth.depth_bounds_test_enable)
            .stencil_test_enable(depth.stencil_test_enable)
            .front(stencil_state_to_vk(&depth.front))
            .back(stencil_state_to_vk(&depth.back));

        let blend = &desc.color_blend;
        let blend_attachments = [vk::PipelineColorBlendAttachmentState {
            blend_enable: blend.blend_enable.into(),
            src_color_blend_factor: blend_factor_to_vk(blend.src_color_factor),
            dst_color_blend_factor: blend_factor_to_vk(blend.dst_color_factor),
            color_blend_op: blend_op_to_vk(blend.color_blend_op),
            src_alpha_blend_factor: blend_factor_to_vk(blend.src_alpha_factor),
            dst_alpha_blend_factor: blend_factor_to_vk(blend.dst_alpha_factor),
            alpha_blend_op: blend_op_to_vk(blend.alpha_blend_op),
            color_write_mask: color_write_mask_to_vk(blend.color_write_mask),
        }];
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&blend_attachments)
            .blend_constants(desc.blend_constants);

        let flags = if desc.disable_optimization {
            vk::PipelineCreateFlags::DISABLE_OPTIMIZATION
        } else {
            vk::PipelineCreateFlags::empty()
        };

        let info = vk::GraphicsPipelineCreateInfo::default()
            .flags(flags)
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .layout(vk::PipelineLayout::from_raw(desc.layout.as_raw()))
            .render_pass(vk::RenderPass::from_raw(desc.render_pass.as_raw()))
            .subpass(desc.subpass);

        let pipelines = unsafe {
            self.context.device.create_graphics_pipelines(vk::PipelineCache::null(), &[info], None)
        }
        .map_err(|(_, e)| engine_err!("lumen::vulkan", "Failed to create graphics pipeline: {:?}", e))?;

        pipelines
            .into_iter()
            .next()
            .map(|pipeline| PipelineHandle::from_raw(pipeline.as_raw()))
            .ok_or_else(|| engine_err!("lumen::vulkan", "Driver returned no pipeline"))
    }

    fn destroy_pipeline(&self, pipeline: PipelineHandle) {
        unsafe { self.context.device.destroy_pipeline(vk::Pipeline::from_raw(pipeline.as_raw()), None) };
    }
}
