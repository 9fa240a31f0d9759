//! Host-side mirrors of the uniform blocks the shaders declare.
//!
//! Layouts follow WGSL uniform rules: `vec3` fields are padded out to 16
//! bytes by pairing them with a trailing scalar.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::scene::{PointLight, TransparentQuad, LIGHT_COUNT, MAX_QUADS, QUAD_HALF_EXTENT};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w unused.
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            position: eye.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct LightsUniform {
    pub lights: [LightUniform; LIGHT_COUNT],
}

impl LightsUniform {
    pub fn new(lights: &[PointLight; LIGHT_COUNT]) -> Self {
        Self {
            lights: lights.map(|l| LightUniform {
                position: l.position.to_array(),
                range: l.range,
                color: l.color.to_array(),
                intensity: l.intensity,
            }),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SkyUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct QuadUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct QuadsUniform {
    pub quads: [QuadUniform; MAX_QUADS],
}

impl QuadsUniform {
    /// Packs up to `MAX_QUADS` quads in draw order. Returns the block and the
    /// number of quads written.
    pub fn pack(sorted: &[TransparentQuad]) -> (Self, u32) {
        let mut block = Self::zeroed();
        let count = sorted.len().min(MAX_QUADS);
        for (slot, quad) in block.quads.iter_mut().zip(sorted) {
            let model = Mat4::from_translation(quad.center)
                * Mat4::from_scale(Vec3::splat(QUAD_HALF_EXTENT));
            *slot = QuadUniform {
                model: model.to_cols_array_2d(),
                color: quad.color.to_array(),
            };
        }
        (block, count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn block_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
        assert_eq!(std::mem::size_of::<LightsUniform>(), 96);
        assert_eq!(std::mem::size_of::<QuadUniform>(), 80);
        assert_eq!(std::mem::size_of::<QuadsUniform>(), 80 * MAX_QUADS);
    }

    #[test]
    fn pack_truncates_to_capacity() {
        let quad = TransparentQuad {
            center: Vec3::new(1.0, 2.0, 3.0),
            color: Vec4::new(1.0, 0.0, 0.0, 0.5),
        };
        let many = vec![quad; MAX_QUADS + 3];
        let (block, count) = QuadsUniform::pack(&many);
        assert_eq!(count as usize, MAX_QUADS);
        assert_eq!(block.quads[0].model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(block.quads[0].model[0][0], QUAD_HALF_EXTENT);
        assert_eq!(block.quads[0].color, [1.0, 0.0, 0.0, 0.5]);
    }
}
