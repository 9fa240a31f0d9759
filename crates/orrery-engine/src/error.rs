//! Render subsystem error types.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse failure category used by callers to decide between aborting,
/// skipping frames and degrading.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// Device, surface, texture, state or pipeline creation failed. Fatal.
    Initialization,
    /// Size-dependent targets could not be recreated. Rendering is skipped
    /// until a later resize succeeds.
    Resize,
    /// The shader compiler rejected a program. Fatal for that pipeline.
    CompileDiagnostic,
    /// A staging buffer could not be mapped. The frame degrades, rendering
    /// continues.
    TransientReadback,
}

/// Errors produced by the render subsystem.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Generic initialization failure.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// No adapter could be acquired.
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(String),

    /// Shader source could not be read.
    #[error("failed to read shader `{path}`: {source}")]
    ShaderIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Shader file name does not carry a known stage suffix.
    #[error("shader `{0}` has no stage suffix (.vs, .ps, .cs)")]
    UnknownShaderStage(PathBuf),

    /// Compiler diagnostics for a rejected shader.
    #[error("shader `{path}` failed to compile:\n{diagnostic}")]
    CompileDiagnostic { path: PathBuf, diagnostic: String },

    /// Texture asset could not be decoded.
    #[error("failed to load texture `{path}`: {source}")]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Texture assets are present but unusable together.
    #[error("texture `{path}` rejected: {reason}")]
    TextureShape { path: PathBuf, reason: String },

    /// Invalid state-object configuration.
    #[error("invalid {object} configuration: {reason}")]
    InvalidState { object: &'static str, reason: String },

    /// Size-dependent target recreation failed.
    #[error("resize to {width}x{height} failed: {reason}")]
    Resize {
        width: u32,
        height: u32,
        reason: String,
    },

    /// The presentation surface failed beyond recovery.
    #[error("surface lost: {0}")]
    Surface(String),

    /// Staging buffer map failed.
    #[error("visible-count readback failed: {0}")]
    Readback(String),
}

impl RenderError {
    /// Returns the failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::CompileDiagnostic { .. } | RenderError::UnknownShaderStage(_) => {
                ErrorKind::CompileDiagnostic
            }
            RenderError::Resize { .. } => ErrorKind::Resize,
            RenderError::Readback(_) => ErrorKind::TransientReadback,
            RenderError::Initialization(_)
            | RenderError::Surface(_)
            | RenderError::NoAdapter(_)
            | RenderError::ShaderIo { .. }
            | RenderError::TextureLoad { .. }
            | RenderError::TextureShape { .. }
            | RenderError::InvalidState { .. } => ErrorKind::Initialization,
        }
    }

    /// Returns true when the error must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Initialization | ErrorKind::CompileDiagnostic
        )
    }
}

/// Result alias for render subsystem operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readback_is_not_fatal() {
        let err = RenderError::Readback("map failed".into());
        assert_eq!(err.kind(), ErrorKind::TransientReadback);
        assert!(!err.is_fatal());
    }

    #[test]
    fn resize_is_not_fatal() {
        let err = RenderError::Resize {
            width: 0,
            height: 0,
            reason: "zero area".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Resize);
        assert!(!err.is_fatal());
    }

    #[test]
    fn compile_diagnostic_is_fatal_and_carries_text() {
        let err = RenderError::CompileDiagnostic {
            path: PathBuf::from("cube.vs"),
            diagnostic: "error: expected `;`".into(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("expected `;`"));
    }
}
