/// Shader binary loading
///
/// A pipeline name maps to a pair of SPIR-V binaries (vertex + fragment).
/// `FileShaderLoader` reads them from `<root>/<name>/vert.spv` and
/// `<root>/<name>/frag.spv`; `InMemoryShaderLoader` serves pre-registered
/// binaries (tests, embedded shaders).

use std::path::{Path, PathBuf};
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_config_err;

/// File name of the vertex binary inside a pipeline directory
pub const VERTEX_SHADER_FILE: &str = "vert.spv";
/// File name of the fragment binary inside a pipeline directory
pub const FRAGMENT_SHADER_FILE: &str = "frag.spv";

/// Vertex and fragment binaries of one pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBinaries {
    pub vertex: Vec<u8>,
    pub fragment: Vec<u8>,
}

impl ShaderBinaries {
    /// Reject empty binaries
    fn validate(self, name: &str) -> Result<Self> {
        if self.vertex.is_empty() {
            return Err(engine_config_err!("lumen::ShaderLoader",
                "Vertex shader binary for pipeline '{}' is empty", name));
        }
        if self.fragment.is_empty() {
            return Err(engine_config_err!("lumen::ShaderLoader",
                "Fragment shader binary for pipeline '{}' is empty", name));
        }
        Ok(self)
    }
}

/// Source of shader binaries, keyed by pipeline name
pub trait ShaderLoader: Send + Sync {
    /// Load both binaries for `name`
    ///
    /// A missing or empty binary is a `ConfigurationError`.
    fn load(&self, name: &str) -> Result<ShaderBinaries>;
}

// ===== FILE LOADER =====

/// Reads binaries from one sub-directory per pipeline name
#[derive(Debug, Clone)]
pub struct FileShaderLoader {
    root: PathBuf,
}

impl FileShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the binaries of pipeline `name`
    pub fn pipeline_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn read_binary(path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            engine_config_err!("lumen::ShaderLoader",
                "Failed to read shader binary '{}': {}", path.display(), e)
        })
    }
}

impl ShaderLoader for FileShaderLoader {
    fn load(&self, name: &str) -> Result<ShaderBinaries> {
        let dir = self.pipeline_dir(name);
        let binaries = ShaderBinaries {
            vertex: Self::read_binary(&dir.join(VERTEX_SHADER_FILE))?,
            fragment: Self::read_binary(&dir.join(FRAGMENT_SHADER_FILE))?,
        };
        binaries.validate(name)
    }
}

// ===== IN-MEMORY LOADER =====

/// Serves binaries registered up front
#[derive(Debug, Clone, Default)]
pub struct InMemoryShaderLoader {
    shaders: FxHashMap<String, ShaderBinaries>,
}

impl InMemoryShaderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the binaries of pipeline `name`
    pub fn insert(&mut self, name: impl Into<String>, vertex: Vec<u8>, fragment: Vec<u8>) {
        self.shaders.insert(name.into(), ShaderBinaries { vertex, fragment });
    }

    /// Builder form of `insert`
    pub fn with(mut self, name: impl Into<String>, vertex: Vec<u8>, fragment: Vec<u8>) -> Self {
        self.insert(name, vertex, fragment);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }
}

impl ShaderLoader for InMemoryShaderLoader {
    fn load(&self, name: &str) -> Result<ShaderBinaries> {
        self.shaders
            .get(name)
            .cloned()
            .ok_or_else(|| engine_config_err!("lumen::ShaderLoader",
                "No shader binaries registered for pipeline '{}'", name))?
            .validate(name)
    }
}

#[cfg(test)]
#[path = "shader_loader_tests.rs"]
mod tests;
