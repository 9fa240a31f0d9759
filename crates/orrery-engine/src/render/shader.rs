use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{RenderError, Result};

/// Pipeline stage a shader file provides, derived from its suffix.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    /// `.vs`, entry point `vs_main`.
    Vertex,
    /// `.ps`, entry point `fs_main`.
    Fragment,
    /// `.cs`, entry point `cs_main`.
    Compute,
}

impl ShaderStage {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "vs" => Some(ShaderStage::Vertex),
            "ps" => Some(ShaderStage::Fragment),
            "cs" => Some(ShaderStage::Compute),
            _ => None,
        }
    }

    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
            ShaderStage::Compute => "cs_main",
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
            ShaderStage::Compute => naga::ShaderStage::Compute,
        }
    }
}

/// A validated shader module ready for pipeline creation.
#[derive(Debug, Clone)]
pub struct CompiledShader {
    pub module: wgpu::ShaderModule,
    pub stage: ShaderStage,
}

impl CompiledShader {
    pub fn entry_point(&self) -> Option<&'static str> {
        Some(self.stage.entry_point())
    }
}

/// Parses and validates WGSL for `stage`.
///
/// Errors carry the compiler's rendered diagnostic. A module that lacks the
/// stage's entry point is rejected as well.
pub fn validate_wgsl(path: &Path, source: &str, stage: ShaderStage) -> Result<naga::Module> {
    let diagnostic = |text: String| RenderError::CompileDiagnostic {
        path: path.to_path_buf(),
        diagnostic: text,
    };

    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| diagnostic(e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| diagnostic(e.emit_to_string(source)))?;

    let entry = stage.entry_point();
    let found = module
        .entry_points
        .iter()
        .any(|ep| ep.name == entry && ep.stage == stage.naga_stage());
    if !found {
        return Err(diagnostic(format!(
            "missing {stage:?} entry point `{entry}`"
        )));
    }

    Ok(module)
}

/// Loads shader files from a root directory, validating each before it is
/// handed to the device. Compiled modules are cached by file name.
pub struct ShaderRegistry {
    root: PathBuf,
    cache: HashMap<String, CompiledShader>,
}

impl ShaderRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads, validates and creates the module for `name` (relative to the
    /// root). Nothing is installed when validation fails.
    pub fn compile_shader(&mut self, device: &wgpu::Device, name: &str) -> Result<CompiledShader> {
        if let Some(shader) = self.cache.get(name) {
            return Ok(shader.clone());
        }

        let path = self.root.join(name);
        let stage =
            ShaderStage::from_path(&path).ok_or_else(|| RenderError::UnknownShaderStage(path.clone()))?;

        let source = std::fs::read_to_string(&path).map_err(|source| RenderError::ShaderIo {
            path: path.clone(),
            source,
        })?;

        validate_wgsl(&path, &source, stage)?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        log::debug!("compiled shader {name} ({stage:?})");

        let shader = CompiledShader { module, stage };
        self.cache.insert(name.to_owned(), shader.clone());
        Ok(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader_dir() -> PathBuf {
        PathBuf::from(crate::DEFAULT_ASSET_DIR).join("shaders")
    }

    // ── stage suffix ──────────────────────────────────────────────────────

    #[test]
    fn stage_from_suffix() {
        assert_eq!(ShaderStage::from_path(Path::new("a.vs")), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_path(Path::new("a.ps")), Some(ShaderStage::Fragment));
        assert_eq!(ShaderStage::from_path(Path::new("a.cs")), Some(ShaderStage::Compute));
        assert_eq!(ShaderStage::from_path(Path::new("a.wgsl")), None);
        assert_eq!(ShaderStage::from_path(Path::new("noext")), None);
    }

    // ── validation ────────────────────────────────────────────────────────

    #[test]
    fn syntax_error_returns_diagnostic_text() {
        let src = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0) }";
        let err = validate_wgsl(Path::new("broken.vs"), src, ShaderStage::Vertex).unwrap_err();
        match err {
            RenderError::CompileDiagnostic { diagnostic, .. } => assert!(!diagnostic.is_empty()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let src = "@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        let err = validate_wgsl(Path::new("wrong.ps"), src, ShaderStage::Fragment).unwrap_err();
        assert!(err.to_string().contains("fs_main"));
    }

    #[test]
    fn entry_point_of_wrong_stage_is_rejected() {
        let src = "@fragment fn vs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
        assert!(validate_wgsl(Path::new("x.vs"), src, ShaderStage::Vertex).is_err());
    }

    #[test]
    fn bundled_shaders_validate() {
        let mut count = 0;
        for entry in std::fs::read_dir(shader_dir()).unwrap() {
            let path = entry.unwrap().path();
            let Some(stage) = ShaderStage::from_path(&path) else { continue };
            let src = std::fs::read_to_string(&path).unwrap();
            if let Err(e) = validate_wgsl(&path, &src, stage) {
                panic!("{e}");
            }
            count += 1;
        }
        assert!(count >= 10, "expected the bundled shader set, found {count}");
    }
}
