use crate::error::Result;
use crate::scene::Instance;

use super::frustum::Frustum;
use super::{CullingKind, CullingStrategy, VisibleSet};

/// CPU frustum test over instance centers.
#[derive(Debug, Clone)]
pub struct HostCuller {
    radius: f32,
}

impl HostCuller {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Appends visible instance indices to `out` in instance order.
    pub fn collect(&self, frustum: &Frustum, instances: &[Instance], out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            instances
                .iter()
                .enumerate()
                .filter(|(_, inst)| frustum.intersects_cube(inst.center(), self.radius))
                .map(|(i, _)| i as u32),
        );
    }
}

impl CullingStrategy for HostCuller {
    fn kind(&self) -> CullingKind {
        CullingKind::Host
    }

    fn cull(&mut self, frustum: &Frustum, instances: &[Instance]) -> Result<VisibleSet> {
        let mut indices = Vec::with_capacity(instances.len());
        self.collect(frustum, instances, &mut indices);
        Ok(VisibleSet::new(indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culling::CULL_RADIUS;
    use crate::scene::{generate_layout, Camera, CameraConfig, InstanceStore};
    use glam::{Mat4, Vec3};
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn ticked_store() -> InstanceStore {
        let mut store = InstanceStore::new(generate_layout(10, 12, 4.0, 9.5));
        for _ in 0..100 {
            store.tick(0.01);
        }
        store
    }

    fn frustum(eye: Vec3, dir: Vec3, fov: f32, aspect: f32) -> Frustum {
        let view = Mat4::look_to_lh(eye, dir, Vec3::Y);
        let proj = Mat4::perspective_lh(fov, aspect, 0.1, 100.0);
        Frustum::from_view_projection(proj * view)
    }

    fn cull(f: &Frustum) -> Vec<u32> {
        let store = ticked_store();
        HostCuller::new(CULL_RADIUS)
            .cull(f, store.instances())
            .unwrap()
            .indices
    }

    // ── regression oracle ─────────────────────────────────────────────────

    #[test]
    fn wide_fov_sees_everything() {
        let f = frustum(Vec3::new(0.0, 0.0, -16.0), Vec3::Z, FRAC_PI_2, 1.0);
        assert_eq!(cull(&f), (0..23).collect::<Vec<u32>>());
    }

    #[test]
    fn default_fov_square_aspect() {
        let f = frustum(Vec3::new(0.0, 0.0, -16.0), Vec3::Z, FRAC_PI_4, 1.0);
        let expected: Vec<u32> = (0..=10).chain([12, 13, 14, 15, 16, 20]).collect();
        assert_eq!(cull(&f), expected);
    }

    #[test]
    fn default_camera_widescreen_sees_everything() {
        let camera = Camera::new(CameraConfig::default());
        let f = Frustum::from_view_projection(camera.view_projection(16.0 / 9.0));
        assert_eq!(cull(&f).len(), 23);
    }

    #[test]
    fn looking_sideways_sees_nothing() {
        let f = frustum(Vec3::new(0.0, 0.0, -16.0), Vec3::X, FRAC_PI_4, 16.0 / 9.0);
        assert!(cull(&f).is_empty());
    }

    #[test]
    fn from_origin_sees_the_front_half() {
        let f = frustum(Vec3::ZERO, Vec3::Z, FRAC_PI_2, 1.0);
        assert_eq!(cull(&f), vec![0, 2, 3, 4, 5, 13, 14, 15]);
    }

    #[test]
    fn diagonal_view() {
        let dir = Vec3::new(FRAC_PI_4.sin(), 0.0, FRAC_PI_4.cos());
        let f = frustum(Vec3::new(0.0, 0.0, -16.0), dir, FRAC_PI_4, 16.0 / 9.0);
        assert_eq!(cull(&f), vec![1, 2, 10, 11, 12, 13, 21, 22]);
    }

    // ── invariants ────────────────────────────────────────────────────────

    #[test]
    fn all_planes_facing_away_culls_everything() {
        use glam::Vec4;
        // Inside half-space is x < -1000; nothing lives there.
        let f = Frustum::from_planes([Vec4::new(-1.0, 0.0, 0.0, -1000.0); 6]);
        assert!(cull(&f).is_empty());
    }

    #[test]
    fn empty_instance_set() {
        let f = frustum(Vec3::ZERO, Vec3::Z, FRAC_PI_2, 1.0);
        let set = HostCuller::new(CULL_RADIUS).cull(&f, &[]).unwrap();
        assert!(set.is_empty());
    }
}
