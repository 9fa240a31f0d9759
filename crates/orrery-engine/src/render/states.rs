//! Declarative fixed-function state.
//!
//! Each factory validates its configuration and returns the wgpu descriptor
//! piece (or object) for it. State is built once when pipelines are created.

use crate::error::{RenderError, Result};

/// Triangle winding treated as front-facing by every pipeline.
///
/// Meshes are authored clockwise when viewed from outside.
pub const FRONT_FACE: wgpu::FrontFace = wgpu::FrontFace::Cw;

// ── sampler ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    pub address_mode: wgpu::AddressMode,
    pub mag_filter: wgpu::FilterMode,
    pub min_filter: wgpu::FilterMode,
    pub mipmap_filter: wgpu::MipmapFilterMode,
    /// 1 disables anisotropic filtering. Valid range is 1..=16.
    pub anisotropy: u16,
}

impl SamplerConfig {
    /// Linear filtering with wrap addressing, used for the diffuse and normal maps.
    pub fn linear_repeat() -> Self {
        Self {
            address_mode: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            anisotropy: 1,
        }
    }

    /// Linear filtering clamped to the edge, used for the skybox.
    pub fn linear_clamp() -> Self {
        Self {
            address_mode: wgpu::AddressMode::ClampToEdge,
            ..Self::linear_repeat()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.anisotropy) {
            return Err(RenderError::InvalidState {
                object: "sampler",
                reason: format!("anisotropy {} outside 1..=16", self.anisotropy),
            });
        }
        let all_linear = self.mag_filter == wgpu::FilterMode::Linear
            && self.min_filter == wgpu::FilterMode::Linear
            && self.mipmap_filter == wgpu::MipmapFilterMode::Linear;
        if self.anisotropy > 1 && !all_linear {
            return Err(RenderError::InvalidState {
                object: "sampler",
                reason: "anisotropic filtering requires linear mag, min and mipmap filters".into(),
            });
        }
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::linear_repeat()
    }
}

pub fn create_sampler(
    device: &wgpu::Device,
    label: &str,
    config: &SamplerConfig,
) -> Result<wgpu::Sampler> {
    config.validate()?;
    Ok(device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: config.address_mode,
        address_mode_v: config.address_mode,
        address_mode_w: config.address_mode,
        mag_filter: config.mag_filter,
        min_filter: config.min_filter,
        mipmap_filter: config.mipmap_filter,
        anisotropy_clamp: config.anisotropy,
        ..Default::default()
    }))
}

// ── blend ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlendMode {
    /// Blending disabled.
    Opaque,
    /// `src * a + dst * (1 - a)` on straight alpha.
    Alpha,
    /// `src + dst * (1 - a)` on premultiplied alpha.
    Premultiplied,
}

pub fn blend_state(mode: BlendMode) -> Option<wgpu::BlendState> {
    match mode {
        BlendMode::Opaque => None,
        BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
        BlendMode::Premultiplied => Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        }),
    }
}

pub fn color_target(format: wgpu::TextureFormat, mode: BlendMode) -> wgpu::ColorTargetState {
    wgpu::ColorTargetState {
        format,
        blend: blend_state(mode),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

// ── depth ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DepthMode {
    /// Less, with writes. Opaque geometry.
    Standard,
    /// Less-or-equal without writes. Skybox drawn at the far plane.
    SkyboxLessEqual,
    /// Less without writes. Transparent geometry.
    TestOnly,
}

pub fn depth_stencil_state(
    mode: DepthMode,
    format: wgpu::TextureFormat,
) -> Result<wgpu::DepthStencilState> {
    if !format.is_depth_stencil_format() {
        return Err(RenderError::InvalidState {
            object: "depth-stencil",
            reason: format!("{format:?} is not a depth format"),
        });
    }

    let (depth_write_enabled, depth_compare) = match mode {
        DepthMode::Standard => (true, wgpu::CompareFunction::Less),
        DepthMode::SkyboxLessEqual => (false, wgpu::CompareFunction::LessEqual),
        DepthMode::TestOnly => (false, wgpu::CompareFunction::Less),
    };

    Ok(wgpu::DepthStencilState {
        format,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    })
}

// ── rasterizer ────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CullFace {
    None,
    Back,
    /// Camera sits inside the mesh (skybox).
    Front,
}

pub fn rasterizer_state(cull: CullFace) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: FRONT_FACE,
        cull_mode: match cull {
            CullFace::None => None,
            CullFace::Back => Some(wgpu::Face::Back),
            CullFace::Front => Some(wgpu::Face::Front),
        },
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── sampler ───────────────────────────────────────────────────────────

    #[test]
    fn default_samplers_are_valid() {
        assert!(SamplerConfig::linear_repeat().validate().is_ok());
        assert!(SamplerConfig::linear_clamp().validate().is_ok());
    }

    #[test]
    fn anisotropy_out_of_range_is_rejected() {
        for anisotropy in [0, 17] {
            let cfg = SamplerConfig {
                anisotropy,
                ..SamplerConfig::default()
            };
            assert!(cfg.validate().is_err(), "anisotropy {anisotropy}");
        }
    }

    #[test]
    fn anisotropy_requires_linear_filters() {
        let cfg = SamplerConfig {
            anisotropy: 8,
            min_filter: wgpu::FilterMode::Nearest,
            ..SamplerConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("linear"));

        let ok = SamplerConfig {
            anisotropy: 16,
            ..SamplerConfig::default()
        };
        assert!(ok.validate().is_ok());
    }

    // ── blend ─────────────────────────────────────────────────────────────

    #[test]
    fn blend_modes() {
        assert!(blend_state(BlendMode::Opaque).is_none());
        let alpha = blend_state(BlendMode::Alpha).unwrap();
        assert_eq!(alpha.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(alpha.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        let premul = blend_state(BlendMode::Premultiplied).unwrap();
        assert_eq!(premul.color.src_factor, wgpu::BlendFactor::One);
    }

    // ── depth ─────────────────────────────────────────────────────────────

    #[test]
    fn depth_modes() {
        let fmt = wgpu::TextureFormat::Depth32Float;
        let std = depth_stencil_state(DepthMode::Standard, fmt).unwrap();
        assert!(std.depth_write_enabled);
        assert_eq!(std.depth_compare, wgpu::CompareFunction::Less);

        let sky = depth_stencil_state(DepthMode::SkyboxLessEqual, fmt).unwrap();
        assert!(!sky.depth_write_enabled);
        assert_eq!(sky.depth_compare, wgpu::CompareFunction::LessEqual);

        let test_only = depth_stencil_state(DepthMode::TestOnly, fmt).unwrap();
        assert!(!test_only.depth_write_enabled);
    }

    #[test]
    fn depth_state_rejects_color_format() {
        let err = depth_stencil_state(DepthMode::Standard, wgpu::TextureFormat::Rgba8Unorm);
        assert!(err.is_err());
    }

    // ── rasterizer ────────────────────────────────────────────────────────

    #[test]
    fn rasterizer_cull_faces() {
        assert_eq!(rasterizer_state(CullFace::None).cull_mode, None);
        assert_eq!(rasterizer_state(CullFace::Back).cull_mode, Some(wgpu::Face::Back));
        assert_eq!(rasterizer_state(CullFace::Front).cull_mode, Some(wgpu::Face::Front));
        assert_eq!(rasterizer_state(CullFace::Back).front_face, wgpu::FrontFace::Cw);
    }
}
