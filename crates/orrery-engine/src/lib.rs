//! Orrery engine crate.
//!
//! A small real-time renderer: an instanced, normal-mapped cube field with
//! orbiting point lights, a skybox, sorted alpha quads, host or compute
//! frustum culling, an optional invert post-process and a debug overlay.
//! Also owns the platform and GPU runtime pieces the viewer builds on.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod error;
pub mod render;
pub mod scene;
pub mod culling;
pub mod compositor;
pub mod overlay;

pub use compositor::{Compositor, FrameReport, PresentPath, RendererConfig, SurfaceInfo};
pub use error::{ErrorKind, RenderError, Result};

/// Asset root shipped with the crate.
pub const DEFAULT_ASSET_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");
