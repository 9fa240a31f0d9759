use std::f32::consts::TAU;

use glam::{Vec3, Vec4};

/// Half-extent of the transparent quads.
pub const QUAD_HALF_EXTENT: f32 = 0.75;

/// Maximum quads the transparent pass can draw in one frame.
pub const MAX_QUADS: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TransparentQuad {
    pub center: Vec3,
    /// Straight (non-premultiplied) RGBA.
    pub color: Vec4,
}

/// Two oscillating alpha quads in front of the cube field.
#[derive(Debug, Clone)]
pub struct QuadSet {
    phase: f32,
    quads: Vec<TransparentQuad>,
}

impl QuadSet {
    pub fn new() -> Self {
        let mut set = Self {
            phase: 0.0,
            quads: Vec::with_capacity(2),
        };
        set.place();
        set
    }

    pub fn quads(&self) -> &[TransparentQuad] {
        &self.quads
    }

    pub fn tick(&mut self, delta: f32) {
        self.phase = (self.phase + delta).rem_euclid(TAU);
        self.place();
    }

    fn place(&mut self) {
        let s = self.phase.sin();
        self.quads.clear();
        self.quads.push(TransparentQuad {
            center: Vec3::new(2.0 * s, -0.5, -5.0),
            color: Vec4::new(1.0, 0.0, 0.0, 0.5),
        });
        self.quads.push(TransparentQuad {
            center: Vec3::new(-2.0 * s, -0.5, -6.0),
            color: Vec4::new(0.0, 1.0, 0.0, 0.5),
        });
    }
}

impl Default for QuadSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Orders quads farthest-first by squared distance to `eye`. Ties keep their
/// input order.
pub fn sort_back_to_front(quads: &[TransparentQuad], eye: Vec3) -> Vec<TransparentQuad> {
    let mut sorted = quads.to_vec();
    sorted.sort_by(|a, b| {
        let da = a.center.distance_squared(eye);
        let db = b.center.distance_squared(eye);
        db.total_cmp(&da)
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(z: f32) -> TransparentQuad {
        TransparentQuad {
            center: Vec3::new(0.0, 0.0, z),
            color: Vec4::ONE,
        }
    }

    #[test]
    fn farthest_first() {
        let sorted = sort_back_to_front(&[quad(1.0), quad(5.0), quad(3.0)], Vec3::ZERO);
        let zs: Vec<f32> = sorted.iter().map(|q| q.center.z).collect();
        assert_eq!(zs, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn order_flips_when_camera_crosses_over() {
        let set = QuadSet::new();
        let from_front = sort_back_to_front(set.quads(), Vec3::new(0.0, 0.0, -16.0));
        let from_behind = sort_back_to_front(set.quads(), Vec3::new(0.0, 0.0, 10.0));
        // Red sits at z = -5, green at z = -6.
        assert_eq!(from_front[0].color.y, 0.0);
        assert_eq!(from_behind[0].color.y, 1.0);
    }

    #[test]
    fn ties_keep_input_order() {
        let a = TransparentQuad {
            center: Vec3::new(1.0, 0.0, 0.0),
            color: Vec4::X,
        };
        let b = TransparentQuad {
            center: Vec3::new(-1.0, 0.0, 0.0),
            color: Vec4::Y,
        };
        let sorted = sort_back_to_front(&[a, b], Vec3::ZERO);
        assert_eq!(sorted, vec![a, b]);
    }

    #[test]
    fn quads_oscillate_in_x() {
        let mut set = QuadSet::new();
        set.tick(std::f32::consts::FRAC_PI_2);
        assert!((set.quads()[0].center.x - 2.0).abs() < 1e-5);
        assert!((set.quads()[1].center.x + 2.0).abs() < 1e-5);
    }
}
