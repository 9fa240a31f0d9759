//! Frustum culling of the cube field.
//!
//! Two strategies share one test: a cube of half-extent `CULL_RADIUS` is
//! culled when it lies fully outside any of the six frustum planes.
//! - `HostCuller` runs the test on the CPU and yields a compacted index list.
//! - `DeviceCuller` runs it in a compute pass and feeds an indirect draw.
//!
//! The two must agree as sets, except for cubes whose minimum plane margin
//! is within `BOUNDARY_TOLERANCE` of zero.

mod buffers;
mod device;
mod frustum;
mod host;

use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::scene::{Instance, CUBE_HALF_EXTENT, CUBE_SCALE};

pub use buffers::{CullParams, DrawIndexedIndirectArgs, VisibilityBuffers};
pub use device::DeviceCuller;
pub use frustum::{Frustum, Plane};
pub use host::HostCuller;

/// Slack applied to the bounding cube.
pub const CULL_SAFETY: f32 = 0.95;

/// Half-extent of the bounding cube used by both strategies.
pub const CULL_RADIUS: f32 = CUBE_HALF_EXTENT * CUBE_SCALE * CULL_SAFETY;

/// Margin band in which host and device results may differ.
pub const BOUNDARY_TOLERANCE: f32 = 1e-4;

/// Which strategy produced a frame's visible set.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CullingKind {
    Host,
    Device,
}

impl fmt::Display for CullingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CullingKind::Host => f.write_str("host"),
            CullingKind::Device => f.write_str("device"),
        }
    }
}

impl FromStr for CullingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" | "cpu" => Ok(CullingKind::Host),
            "device" | "gpu" => Ok(CullingKind::Device),
            other => Err(format!("unknown culling strategy `{other}` (expected host or device)")),
        }
    }
}

/// Instances that passed the frustum test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    pub indices: Vec<u32>,
}

impl VisibleSet {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Indices in ascending order (device results arrive unordered).
    pub fn sorted(&self) -> Vec<u32> {
        let mut v = self.indices.clone();
        v.sort_unstable();
        v
    }
}

/// A visibility strategy over a frustum and an instance slice.
pub trait CullingStrategy {
    fn kind(&self) -> CullingKind;

    /// Computes the visible set. Device strategies block until the result
    /// is read back.
    fn cull(&mut self, frustum: &Frustum, instances: &[Instance]) -> Result<VisibleSet>;
}

/// Whether the device can run the compute cull and draw from its output.
pub fn device_culling_supported(adapter: &wgpu::Adapter, device: &wgpu::Device) -> bool {
    let caps = adapter.get_downlevel_capabilities();
    let required = wgpu::DownlevelFlags::COMPUTE_SHADERS
        | wgpu::DownlevelFlags::VERTEX_STORAGE
        | wgpu::DownlevelFlags::INDIRECT_EXECUTION;
    let limits = device.limits();
    caps.flags.contains(required)
        && limits.max_storage_buffers_per_shader_stage >= 3
        && limits.max_compute_workgroup_size_x >= self::device::WORKGROUP_SIZE
}

/// Checks two visible sets for equality modulo the boundary band.
///
/// Returns the indices that differ by more than `BOUNDARY_TOLERANCE`.
pub fn disagreements(
    frustum: &Frustum,
    instances: &[Instance],
    radius: f32,
    a: &VisibleSet,
    b: &VisibleSet,
) -> Vec<u32> {
    let a = a.sorted();
    let b = b.sorted();
    let mut out = Vec::new();
    for i in 0..instances.len() as u32 {
        let in_a = a.binary_search(&i).is_ok();
        let in_b = b.binary_search(&i).is_ok();
        if in_a != in_b {
            let margin = frustum.margin(instances[i as usize].center(), radius);
            if margin.abs() > BOUNDARY_TOLERANCE {
                out.push(i);
            }
        }
    }
    out
}

/// Owns the available strategies and tracks the active one.
pub struct Culler {
    device: Option<DeviceCuller>,
    host: HostCuller,
    active: CullingKind,
}

impl Culler {
    pub fn new(host: HostCuller, device: Option<DeviceCuller>, preferred: CullingKind) -> Self {
        let active = match (preferred, device.is_some()) {
            (CullingKind::Device, false) => {
                log::warn!("device culling unavailable on this adapter; falling back to host");
                CullingKind::Host
            }
            (kind, _) => kind,
        };
        Self {
            device,
            host,
            active,
        }
    }

    pub fn active(&self) -> CullingKind {
        self.active
    }

    pub fn device_available(&self) -> bool {
        self.device.is_some()
    }

    /// Switches strategy. Returns false when device culling was requested
    /// but is unavailable.
    pub fn set_active(&mut self, kind: CullingKind) -> bool {
        if kind == CullingKind::Device && self.device.is_none() {
            return false;
        }
        if self.active != kind {
            log::info!("culling strategy: {} -> {}", self.active, kind);
        }
        self.active = kind;
        true
    }

    /// Flips between host and device when both exist.
    pub fn toggle(&mut self) -> CullingKind {
        let next = match self.active {
            CullingKind::Host => CullingKind::Device,
            CullingKind::Device => CullingKind::Host,
        };
        self.set_active(next);
        self.active
    }

    pub fn host(&self) -> &HostCuller {
        &self.host
    }

    pub fn device(&self) -> Option<&DeviceCuller> {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> Option<&mut DeviceCuller> {
        self.device.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::generate_layout;
    use glam::{Mat4, Vec3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn radius_is_scaled_half_extent() {
        assert!((CULL_RADIUS - 0.475).abs() < 1e-6);
    }

    #[test]
    fn kind_parses_and_displays() {
        assert_eq!("host".parse::<CullingKind>().unwrap(), CullingKind::Host);
        assert_eq!(" GPU ".parse::<CullingKind>().unwrap(), CullingKind::Device);
        assert!("sideways".parse::<CullingKind>().is_err());
        assert_eq!(CullingKind::Device.to_string(), "device");
    }

    #[test]
    fn culler_without_device_stays_on_host() {
        let mut culler = Culler::new(HostCuller::new(CULL_RADIUS), None, CullingKind::Device);
        assert_eq!(culler.active(), CullingKind::Host);
        assert!(!culler.set_active(CullingKind::Device));
        assert_eq!(culler.toggle(), CullingKind::Host);
    }

    #[test]
    fn disagreements_ignore_boundary_cases() {
        let instances = generate_layout(10, 12, 4.0, 9.5);
        let view = Mat4::look_to_lh(Vec3::new(0.0, 0.0, -16.0), Vec3::Z, Vec3::Y);
        let f = Frustum::from_view_projection(Mat4::perspective_lh(0.8, 1.0, 0.1, 100.0) * view);
        let reference = HostCuller::new(CULL_RADIUS).cull(&f, &instances).unwrap();

        let same = VisibleSet::new(reference.indices.iter().rev().copied().collect());
        assert!(disagreements(&f, &instances, CULL_RADIUS, &reference, &same).is_empty());

        let mut dropped = reference.clone();
        let gone = dropped.indices.remove(0);
        assert_eq!(disagreements(&f, &instances, CULL_RADIUS, &reference, &dropped), vec![gone]);
    }

    #[test]
    fn randomized_visible_never_exceeds_total() {
        let mut rng = StdRng::seed_from_u64(0x0bbe_5eed);
        let mut host = HostCuller::new(CULL_RADIUS);
        for _ in 0..200 {
            let instances = generate_layout(
                rng.random_range(0..40),
                rng.random_range(0..40),
                rng.random_range(0.5..10.0),
                rng.random_range(10.0..40.0),
            );
            let eye = Vec3::new(
                rng.random_range(-30.0..30.0),
                rng.random_range(-5.0..5.0),
                rng.random_range(-30.0..30.0),
            );
            let dir = Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-0.5..0.5),
                rng.random_range(-1.0..1.0),
            );
            if dir.length_squared() < 1e-3 {
                continue;
            }
            let view = Mat4::look_to_lh(eye, dir.normalize(), Vec3::Y);
            let proj = Mat4::perspective_lh(rng.random_range(0.3..2.5), rng.random_range(0.5..2.5), 0.1, 100.0);
            let f = Frustum::from_view_projection(proj * view);

            let set = host.cull(&f, &instances).unwrap();
            assert!(set.len() <= instances.len());
            for &i in &set.indices {
                assert!(f.margin(instances[i as usize].center(), CULL_RADIUS) >= 0.0);
            }
        }
    }
}
