//! Scene state: cube instances, lights, transparent quads and the camera.
//!
//! Everything here is plain CPU data. The compositor reads it each frame and
//! uploads whatever the passes need.

mod camera;
mod instances;
mod lights;
mod transparency;

pub use camera::{wrap_angle, Camera, CameraConfig, LateralMode};
pub use instances::{
    generate_layout, Instance, InstanceRaw, InstanceStore, CUBE_HALF_EXTENT, CUBE_SCALE,
};
pub use lights::{LightRig, PointLight, LIGHT_COUNT, MARKER_SCALE};
pub use transparency::{
    sort_back_to_front, QuadSet, TransparentQuad, MAX_QUADS, QUAD_HALF_EXTENT,
};

/// Layout and animation parameters.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub inner_count: usize,
    pub outer_count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Cube rotation per tick, radians.
    pub cube_step: f32,
    /// Light orbit advance per tick, radians.
    pub light_step: f32,
    /// Quad oscillation advance per tick, radians.
    pub quad_step: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            inner_count: 10,
            outer_count: 12,
            inner_radius: 4.0,
            outer_radius: 9.5,
            cube_step: 0.01,
            light_step: 0.01,
            quad_step: 0.015,
        }
    }
}

/// Animated scene content advanced once per frame.
#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    pub instances: InstanceStore,
    pub lights: LightRig,
    pub quads: QuadSet,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let layout = generate_layout(
            config.inner_count,
            config.outer_count,
            config.inner_radius,
            config.outer_radius,
        );
        Self {
            instances: InstanceStore::new(layout),
            lights: LightRig::new(),
            quads: QuadSet::new(),
            config,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Advances all animations by one frame step.
    pub fn tick(&mut self) {
        self.instances.tick(self.config.cube_step);
        self.lights.tick(self.config.light_step);
        self.quads.tick(self.config.quad_step);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}
