//! GPU rendering building blocks.
//!
//! Shader loading, fixed-function state, static meshes, textures and the
//! uniform layouts shared by the compositor passes.
//!
//! Convention:
//! - world space is left-handed (x right, y up, z forward)
//! - matrices are column-major and uploaded untransposed

mod ctx;
pub mod mesh;
pub mod shader;
pub mod states;
pub mod texture;
pub mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use shader::{validate_wgsl, CompiledShader, ShaderRegistry, ShaderStage};
