/// Pipeline state - one named graphics pipeline bound to a window's render pass
///
/// The fixed-function configuration is the same for every pipeline: triangle
/// lists of 3×f32 positions, no culling, counter-clockwise front faces,
/// depth test LESS and a disabled alpha-blend equation. Only the shader
/// binaries (looked up by name) differ.
///
/// A `PipelineState` is shared as `Arc<PipelineState>`; renderable objects
/// compare that `Arc` by identity to detect reassignment. A window resize
/// rebuilds the GPU objects in place so the identity survives; every rebuild
/// starts a new `generation`, which recordings compare against.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};
use crate::error::Result;
use crate::device::{
    GraphicsDevice, PipelineDevice,
    Extent2D, Format, GraphicsPipelineDesc, VertexAttribute, PrimitiveTopology,
    RasterizationState, CullMode, FrontFace, PolygonMode,
    DepthStencilState, StencilOpState, StencilOp, CompareOp,
    ColorBlendState, ColorWriteMask, BlendFactor, BlendOp,
    PipelineHandle, PipelineLayoutHandle, RenderPassHandle, ShaderModuleHandle,
};
use crate::pipeline::ShaderLoader;
use crate::{engine_debug, engine_invalid_err};

/// Shader entry point of both stages
pub const SHADER_ENTRY_POINT: &str = "main";

/// Byte stride of one vertex (3 × f32 position)
pub const VERTEX_STRIDE: u32 = 12;

/// Fixed-function description shared by every pipeline
pub fn default_pipeline_desc(
    vertex_shader: ShaderModuleHandle,
    fragment_shader: ShaderModuleHandle,
    layout: PipelineLayoutHandle,
    render_pass: RenderPassHandle,
    extent: Extent2D,
) -> GraphicsPipelineDesc {
    let stencil = StencilOpState {
        fail_op: StencilOp::Keep,
        pass_op: StencilOp::IncrementAndClamp,
        depth_fail_op: StencilOp::Keep,
        compare_op: CompareOp::GreaterOrEqual,
        compare_mask: 0xFFFF_FFFF,
        write_mask: 0xFFFF_FFFF,
        reference: 1,
    };

    GraphicsPipelineDesc {
        vertex_shader,
        fragment_shader,
        entry_point: SHADER_ENTRY_POINT.to_string(),
        layout,
        render_pass,
        subpass: 0,
        extent,
        vertex_stride: VERTEX_STRIDE,
        vertex_attributes: vec![VertexAttribute {
            location: 0,
            format: Format::R32G32B32_SFLOAT,
            offset: 0,
        }],
        topology: PrimitiveTopology::TriangleList,
        rasterization: RasterizationState {
            cull_mode: CullMode::None,
            front_face: FrontFace::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
            line_width: 1.0,
        },
        depth_stencil: DepthStencilState {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: CompareOp::Less,
            depth_bounds_test_enable: false,
            stencil_test_enable: false,
            front: stencil,
            back: stencil,
        },
        color_blend: ColorBlendState {
            blend_enable: false,
            src_color_factor: BlendFactor::SrcAlpha,
            dst_color_factor: BlendFactor::OneMinusSrcAlpha,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::OneMinusSrcAlpha,
            alpha_blend_op: BlendOp::Subtract,
            color_write_mask: ColorWriteMask::ALL,
        },
        blend_constants: [1.0; 4],
        disable_optimization: true,
    }
}

struct PipelineObjects {
    pipeline: PipelineHandle,
    layout: PipelineLayoutHandle,
}

/// Named graphics pipeline owned by a window
pub struct PipelineState {
    name: String,
    device: Arc<dyn GraphicsDevice>,
    objects: Mutex<Option<PipelineObjects>>,
    generation: AtomicU64,
}

impl PipelineState {
    /// Load the binaries for `name` and build the pipeline against `render_pass`
    pub fn create(
        device: Arc<dyn GraphicsDevice>,
        loader: &dyn ShaderLoader,
        name: &str,
        render_pass: RenderPassHandle,
        extent: Extent2D,
    ) -> Result<Arc<Self>> {
        let objects = build_objects(device.as_ref(), loader, name, render_pass, extent)?;
        engine_debug!("lumen::PipelineState", "Created pipeline '{}'", name);

        Ok(Arc::new(Self {
            name: name.to_string(),
            device,
            objects: Mutex::new(Some(objects)),
            generation: AtomicU64::new(1),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// GPU pipeline handle
    ///
    /// Fails with `InvalidResource` once the pipeline has been destroyed.
    pub fn handle(&self) -> Result<PipelineHandle> {
        self.lock()
            .as_ref()
            .map(|objects| objects.pipeline)
            .ok_or_else(|| engine_invalid_err!("lumen::PipelineState",
                "Pipeline '{}' has been destroyed", self.name))
    }

    /// Bumped by every rebuild; a list recorded at an older generation binds
    /// a pipeline that no longer exists
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().is_none()
    }

    /// Replace the GPU objects with new ones built against `render_pass`
    ///
    /// The old objects are destroyed first; on failure the state stays
    /// destroyed.
    pub(crate) fn rebuild(
        &self,
        loader: &dyn ShaderLoader,
        render_pass: RenderPassHandle,
        extent: Extent2D,
    ) -> Result<()> {
        let mut objects = self.lock();
        if let Some(old) = objects.take() {
            destroy_objects(self.device.as_ref(), old);
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        *objects = Some(build_objects(self.device.as_ref(), loader, &self.name, render_pass, extent)?);
        engine_debug!("lumen::PipelineState", "Rebuilt pipeline '{}' ({}x{})",
            self.name, extent.width, extent.height);
        Ok(())
    }

    /// Destroy the GPU objects (idempotent)
    pub fn destroy(&self) {
        if let Some(objects) = self.lock().take() {
            destroy_objects(self.device.as_ref(), objects);
            engine_debug!("lumen::PipelineState", "Destroyed pipeline '{}'", self.name);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<PipelineObjects>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PipelineState {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineState")
            .field("name", &self.name)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

fn build_objects(
    device: &dyn GraphicsDevice,
    loader: &dyn ShaderLoader,
    name: &str,
    render_pass: RenderPassHandle,
    extent: Extent2D,
) -> Result<PipelineObjects> {
    let binaries = loader.load(name)?;

    let vertex_shader = device.create_shader_module(&binaries.vertex)?;
    let fragment_shader = match device.create_shader_module(&binaries.fragment) {
        Ok(module) => module,
        Err(e) => {
            device.destroy_shader_module(vertex_shader);
            return Err(e);
        }
    };

    let result = device.create_pipeline_layout().and_then(|layout| {
        let desc = default_pipeline_desc(vertex_shader, fragment_shader, layout, render_pass, extent);
        match device.create_graphics_pipeline(&desc) {
            Ok(pipeline) => Ok(PipelineObjects { pipeline, layout }),
            Err(e) => {
                device.destroy_pipeline_layout(layout);
                Err(e)
            }
        }
    });

    // Modules are only needed while the pipeline is compiled
    device.destroy_shader_module(vertex_shader);
    device.destroy_shader_module(fragment_shader);
    result
}

fn destroy_objects(device: &dyn GraphicsDevice, objects: PipelineObjects) {
    device.destroy_pipeline(objects.pipeline);
    device.destroy_pipeline_layout(objects.layout);
}

#[cfg(test)]
#[path = "pipeline_state_tests.rs"]
mod tests;
