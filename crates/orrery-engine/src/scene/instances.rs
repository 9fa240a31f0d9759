use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Uniform scale applied to every cube.
pub const CUBE_SCALE: f32 = 0.5;

/// Half-extent of the unit cube mesh before scaling.
pub const CUBE_HALF_EXTENT: f32 = 1.0;

/// One cube in the field. Identity is the index into the store.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Instance {
    /// Object to world, `translate · rotate_y · scale`.
    pub transform: Mat4,
    /// Layer in the diffuse texture array (0 or 1).
    pub texture_index: u32,
}

impl Instance {
    fn at(position: Vec3, angle: f32, texture_index: u32) -> Self {
        Self {
            transform: compose(position, angle),
            texture_index,
        }
    }

    /// World-space center (translation column).
    pub fn center(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    pub fn raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.transform.to_cols_array_2d(),
            texture_index: self.texture_index,
            _pad: [0; 3],
        }
    }
}

fn compose(position: Vec3, angle: f32) -> Mat4 {
    Mat4::from_translation(position) * Mat4::from_rotation_y(angle) * Mat4::from_scale(Vec3::splat(CUBE_SCALE))
}

/// GPU layout of an instance. Column-major, matching WGSL `mat4x4<f32>`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub texture_index: u32,
    pub _pad: [u32; 3],
}

impl InstanceRaw {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        4 => Float32x4, // model col 0
        5 => Float32x4, // model col 1
        6 => Float32x4, // model col 2
        7 => Float32x4, // model col 3
        8 => Uint32     // texture index
    ];

    /// Per-instance vertex buffer layout used by the host-culled cube pass.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Builds the ring layout: one cube at the origin, `inner_count` cubes on the
/// inner circle, then `outer_count` on the outer circle. Rings lie in the XZ
/// plane and start at angle 0; texture index alternates with ring position.
pub fn generate_layout(
    inner_count: usize,
    outer_count: usize,
    inner_radius: f32,
    outer_radius: f32,
) -> Vec<Instance> {
    let mut out = Vec::with_capacity(1 + inner_count + outer_count);
    out.push(Instance::at(Vec3::ZERO, 0.0, 0));

    for (count, radius) in [(inner_count, inner_radius), (outer_count, outer_radius)] {
        for i in 0..count {
            let theta = TAU * i as f32 / count as f32;
            let position = Vec3::new(radius * theta.cos(), 0.0, radius * theta.sin());
            out.push(Instance::at(position, 0.0, (i % 2) as u32));
        }
    }

    out
}

/// Owns the cube instances and the shared rotation angle.
#[derive(Debug, Clone)]
pub struct InstanceStore {
    instances: Vec<Instance>,
    angle: f32,
}

impl InstanceStore {
    pub fn new(instances: Vec<Instance>) -> Self {
        Self {
            instances,
            angle: 0.0,
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Shared rotation angle in [0, 2π).
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Advances the shared angle and rebuilds every transform in place.
    pub fn tick(&mut self, delta_angle: f32) {
        self.angle = (self.angle + delta_angle).rem_euclid(TAU);
        if self.angle >= TAU {
            self.angle = 0.0;
        }

        let angle = self.angle;
        for instance in &mut self.instances {
            instance.transform = compose(instance.center(), angle);
        }
    }

    /// Writes the GPU layout of all instances into `out`.
    pub fn write_raw(&self, out: &mut Vec<InstanceRaw>) {
        out.clear();
        out.extend(self.instances.iter().map(Instance::raw));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_layout() -> Vec<Instance> {
        generate_layout(10, 12, 4.0, 9.5)
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn default_layout_has_23_instances() {
        let layout = default_layout();
        assert_eq!(layout.len(), 23);
        assert_eq!(layout[0].center(), Vec3::ZERO);
        assert_eq!(layout[0].texture_index, 0);
    }

    #[test]
    fn rings_have_expected_radii_and_parity() {
        let layout = default_layout();
        for (i, inst) in layout[1..11].iter().enumerate() {
            assert!((inst.center().length() - 4.0).abs() < 1e-5);
            assert_eq!(inst.center().y, 0.0);
            assert_eq!(inst.texture_index, (i % 2) as u32);
        }
        for (i, inst) in layout[11..].iter().enumerate() {
            assert!((inst.center().length() - 9.5).abs() < 1e-5);
            assert_eq!(inst.texture_index, (i % 2) as u32);
        }
        assert!((layout[1].center() - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-6);
        assert!((layout[11].center() - Vec3::new(9.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn empty_rings_leave_only_the_center() {
        assert_eq!(generate_layout(0, 0, 1.0, 2.0).len(), 1);
    }

    // ── tick ──────────────────────────────────────────────────────────────

    #[test]
    fn tick_preserves_positions() {
        let layout = default_layout();
        let mut store = InstanceStore::new(layout.clone());
        for _ in 0..1000 {
            store.tick(0.01);
        }
        for (before, after) in layout.iter().zip(store.instances()) {
            assert!((before.center() - after.center()).length() < 1e-4);
            assert_eq!(before.texture_index, after.texture_index);
        }
    }

    #[test]
    fn tick_bounds_angle() {
        let mut store = InstanceStore::new(default_layout());
        for _ in 0..2000 {
            store.tick(0.01);
            assert!(store.angle() >= 0.0 && store.angle() < TAU);
        }
        store.tick(-10.0);
        assert!(store.angle() >= 0.0 && store.angle() < TAU);
    }

    #[test]
    fn transform_decomposes_into_scale_rotation_translation() {
        let mut store = InstanceStore::new(default_layout());
        store.tick(0.7);
        let inst = store.instances()[3];
        let (scale, rotation, translation) = inst.transform.to_scale_rotation_translation();
        assert!((scale - Vec3::splat(CUBE_SCALE)).length() < 1e-5);
        assert!((translation - inst.center()).length() < 1e-6);
        let (axis, angle) = rotation.to_axis_angle();
        assert!((angle - 0.7).abs() < 1e-4);
        assert!((axis - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn raw_layout_is_column_major() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 80);
        let inst = default_layout()[1];
        let raw = inst.raw();
        assert_eq!(raw.model[3][0], 4.0);
        assert_eq!(raw.model[3][3], 1.0);
    }
}
