use std::f32::consts::TAU;

use glam::Vec3;

pub const LIGHT_COUNT: usize = 3;

/// Marker cube scale for light gizmos.
pub const MARKER_SCALE: f32 = 0.1;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub range: f32,
    pub color: Vec3,
    pub intensity: f32,
}

/// Three point lights orbiting the scene origin.
#[derive(Debug, Clone)]
pub struct LightRig {
    orbit: f32,
    lights: [PointLight; LIGHT_COUNT],
}

impl LightRig {
    pub fn new() -> Self {
        let mut rig = Self {
            orbit: 0.0,
            lights: [PointLight {
                position: Vec3::ZERO,
                range: 0.0,
                color: Vec3::ONE,
                intensity: 1.0,
            }; LIGHT_COUNT],
        };
        rig.place();
        rig
    }

    pub fn lights(&self) -> &[PointLight; LIGHT_COUNT] {
        &self.lights
    }

    pub fn orbit(&self) -> f32 {
        self.orbit
    }

    pub fn tick(&mut self, delta: f32) {
        self.orbit = (self.orbit + delta).rem_euclid(TAU);
        self.place();
    }

    fn place(&mut self) {
        let t = self.orbit;
        self.lights = [
            PointLight {
                position: Vec3::new(0.0, 2.0 * t.cos(), 2.0 * (-t).sin()),
                range: 3.0,
                color: Vec3::ONE,
                intensity: 1.0,
            },
            PointLight {
                position: Vec3::new(2.0 * t.cos(), 0.0, 2.0 * t.sin()),
                range: 3.0,
                color: Vec3::new(1.0, 1.0, 0.13),
                intensity: 1.0,
            },
            PointLight {
                position: Vec3::new(8.0 * t.cos(), 0.0, 8.0 * (-t).sin()),
                range: 5.0,
                color: Vec3::ONE,
                intensity: 1.0,
            },
        ];
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lights_stay_on_their_orbits() {
        let mut rig = LightRig::new();
        for _ in 0..777 {
            rig.tick(0.01);
            let [a, b, c] = rig.lights();
            assert!(a.position.x.abs() < 1e-6);
            assert!((a.position.length() - 2.0).abs() < 1e-4);
            assert!(b.position.y.abs() < 1e-6);
            assert!((b.position.length() - 2.0).abs() < 1e-4);
            assert!((c.position.length() - 8.0).abs() < 1e-4);
        }
        assert!(rig.orbit() >= 0.0 && rig.orbit() < TAU);
    }

    #[test]
    fn outer_light_counter_rotates() {
        let mut rig = LightRig::new();
        rig.tick(0.5);
        let [_, inner, outer] = rig.lights();
        assert!(inner.position.z > 0.0);
        assert!(outer.position.z < 0.0);
    }
}
