/// Renderer - the context that opens windows and creates scenes
///
/// Holds the device, the configuration, the shader loader and the list of
/// pipeline names every window builds. Window ids come from a counter owned
/// by the renderer, so two renderers never share state.

use std::sync::Arc;
use rustc_hash::FxHashSet;
use crate::config::RendererConfig;
use crate::error::Result;
use crate::device::{GraphicsDevice, SurfaceSource, Extent2D};
use crate::pipeline::{FileShaderLoader, ShaderLoader};
use crate::scene::Scene;
use crate::surface::{Window, WindowDesc};
use crate::{engine_config_err, engine_info};

pub struct Renderer {
    device: Arc<dyn GraphicsDevice>,
    config: RendererConfig,
    loader: Arc<dyn ShaderLoader>,
    pipeline_names: Vec<String>,
    next_window_id: u64,
}

impl Renderer {
    /// Create a renderer reading shader binaries from `config.pipeline_root`
    ///
    /// Pipeline names must be unique.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        config: RendererConfig,
        pipeline_names: &[&str],
    ) -> Result<Self> {
        let mut seen = FxHashSet::default();
        if let Some(duplicate) = pipeline_names.iter().find(|name| !seen.insert(**name)) {
            return Err(engine_config_err!("lumen::Renderer",
                "Pipeline '{}' is listed more than once", duplicate));
        }

        let loader = Arc::new(FileShaderLoader::new(config.pipeline_root.clone()));
        engine_info!("lumen::Renderer", "Renderer '{}' created with pipelines {:?}",
            config.app_name, pipeline_names);

        Ok(Self {
            device,
            config,
            loader,
            pipeline_names: pipeline_names.iter().map(|name| name.to_string()).collect(),
            next_window_id: 1,
        })
    }

    /// Replace the shader loader used by windows opened afterwards
    pub fn with_shader_loader(mut self, loader: Arc<dyn ShaderLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn pipeline_names(&self) -> &[String] {
        &self.pipeline_names
    }

    /// Id the next opened window will get
    pub fn next_window_id(&self) -> u64 {
        self.next_window_id
    }

    /// Build a window over `source` with one pipeline state per pipeline name
    ///
    /// A failed open still consumes an id.
    pub fn open_window(
        &mut self,
        source: Arc<dyn SurfaceSource + Send + Sync>,
        dimensions: Extent2D,
        name: &str,
    ) -> Result<Window> {
        let id = self.next_window_id;
        self.next_window_id += 1;

        Window::open(WindowDesc {
            id,
            name: name.to_string(),
            device: Arc::clone(&self.device),
            config: self.config.clone(),
            loader: Arc::clone(&self.loader),
            pipeline_names: self.pipeline_names.clone(),
            source,
            dimensions,
        })
    }

    /// Empty scene whose objects are created on this renderer's device
    pub fn create_scene(&self) -> Scene {
        Scene::new(Arc::clone(&self.device))
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
