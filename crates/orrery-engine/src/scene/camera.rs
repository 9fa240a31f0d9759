use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};
use std::str::FromStr;

use glam::{Mat3, Mat4, Vec3};

/// How lateral (x) movement and the yaw/pitch composition behave once the
/// camera crosses to the positive-z side of the origin.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LateralMode {
    /// Lateral input is mirrored on the far side of the scene, and yaw is
    /// applied before pitch while on the near side.
    #[default]
    Mirrored,
    /// Lateral input always moves along +x; pitch is applied before yaw.
    Fixed,
}

impl FromStr for LateralMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mirrored" => Ok(LateralMode::Mirrored),
            "fixed" => Ok(LateralMode::Fixed),
            other => Err(format!("unknown lateral mode `{other}` (expected mirrored or fixed)")),
        }
    }
}

/// Camera parameters.
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub position: Vec3,
    /// World units per unit of `move_by` input.
    pub speed: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub lateral: LateralMode,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -16.0),
            speed: 0.1,
            fov_y: FRAC_PI_4,
            near: 0.1,
            far: 100.0,
            lateral: LateralMode::Mirrored,
        }
    }
}

/// Yaw/pitch/dolly camera in a left-handed world (x right, y up, z forward).
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    lateral: LateralMode,
}

/// Wraps an angle into (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            position: config.position,
            yaw: 0.0,
            pitch: 0.0,
            speed: config.speed,
            fov_y: config.fov_y,
            near: config.near,
            far: config.far,
            lateral: config.lateral,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn lateral_mode(&self) -> LateralMode {
        self.lateral
    }

    pub fn set_lateral_mode(&mut self, mode: LateralMode) {
        self.lateral = mode;
    }

    /// Points the camera at explicit angles. Same wrapping/clamping as `rotate`.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = wrap_angle(yaw);
        self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Accumulates yaw (wrapped into (-π, π]) and pitch (clamped to ±π/2).
    /// Positive pitch looks up.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = wrap_angle(self.yaw + yaw_delta);
        self.pitch = (self.pitch + pitch_delta).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Translates along world axes, scaled by the camera speed.
    pub fn move_by(&mut self, dx: f32, dy: f32, dz: f32) {
        let dx = if self.mirrored() { -dx } else { dx };
        self.position += Vec3::new(dx, dy, dz) * self.speed;
    }

    fn mirrored(&self) -> bool {
        self.lateral == LateralMode::Mirrored && self.position.z > 0.0
    }

    fn orientation(&self) -> Mat3 {
        let yaw = Mat3::from_rotation_y(self.yaw);
        let pitch = Mat3::from_rotation_x(-self.pitch);
        match self.lateral {
            LateralMode::Mirrored if self.position.z <= 0.0 => pitch * yaw,
            _ => yaw * pitch,
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        (self.orientation() * Vec3::Z).normalize()
    }

    /// Left-handed look-to view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        // World up degenerates at ±90° pitch; fall back to the rotated up axis.
        let up = if Vec3::Y.cross(forward).length_squared() < 1e-8 {
            self.orientation() * Vec3::Y
        } else {
            Vec3::Y
        };
        Mat4::look_to_lh(self.position, forward, up)
    }

    /// Left-handed perspective with depth in [0, 1].
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Mat4::perspective_lh(self.fov_y, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// View-projection with the translation stripped, for the skybox.
    pub fn sky_view_projection(&self, aspect: f32) -> Mat4 {
        let rotation = Mat4::from_mat3(Mat3::from_mat4(self.view_matrix()));
        self.projection_matrix(aspect) * rotation
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle_distance(a: f32, b: f32) -> f32 {
        wrap_angle(a - b).abs()
    }

    // ── yaw ───────────────────────────────────────────────────────────────

    #[test]
    fn wrap_keeps_pi_and_maps_minus_pi_to_pi() {
        assert_eq!(wrap_angle(PI), PI);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-6);
        assert!(wrap_angle(3.0 * PI / 2.0) < 0.0);
    }

    #[test]
    fn yaw_after_many_steps_matches_single_step() {
        let total = 7.3_f32;
        for steps in [1usize, 10, 730] {
            let mut camera = Camera::default();
            for _ in 0..steps {
                camera.rotate(total / steps as f32, 0.0);
            }
            assert!(
                angle_distance(camera.yaw(), wrap_angle(total)) < 1e-3,
                "steps = {steps}, yaw = {}",
                camera.yaw()
            );
            assert!(camera.yaw() > -PI && camera.yaw() <= PI);
        }
    }

    // ── pitch ─────────────────────────────────────────────────────────────

    #[test]
    fn pitch_saturates_exactly() {
        let mut camera = Camera::default();
        for _ in 0..400 {
            camera.rotate(0.0, 0.01);
        }
        assert_eq!(camera.pitch(), FRAC_PI_2);

        for _ in 0..800 {
            camera.rotate(0.0, -0.01);
        }
        assert_eq!(camera.pitch(), -FRAC_PI_2);
    }

    #[test]
    fn positive_pitch_looks_up() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 0.3);
        assert!(camera.forward().y > 0.0);
    }

    #[test]
    fn view_matrix_is_finite_at_vertical_pitch() {
        let mut camera = Camera::default();
        camera.rotate(0.4, FRAC_PI_2);
        let view = camera.view_matrix();
        assert!(view.to_cols_array().iter().all(|v| v.is_finite()));
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn lateral_mode_parses() {
        assert_eq!("Fixed".parse::<LateralMode>().unwrap(), LateralMode::Fixed);
        assert_eq!(" mirrored".parse::<LateralMode>().unwrap(), LateralMode::Mirrored);
        assert!("sideways".parse::<LateralMode>().is_err());
    }

    #[test]
    fn default_camera_looks_down_positive_z() {
        let camera = Camera::default();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, -16.0));
        assert!((camera.forward() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn lateral_movement_mirrors_on_far_side() {
        let mut camera = Camera::new(CameraConfig {
            position: Vec3::new(0.0, 0.0, 5.0),
            ..CameraConfig::default()
        });
        camera.move_by(1.0, 0.0, 0.0);
        assert!((camera.position().x + 0.1).abs() < 1e-6);

        camera.set_lateral_mode(LateralMode::Fixed);
        camera.move_by(1.0, 0.0, 0.0);
        assert!(camera.position().x.abs() < 1e-6);
    }

    #[test]
    fn movement_is_scaled_by_speed() {
        let mut camera = Camera::default();
        camera.move_by(1.0, -2.0, 3.0);
        let p = camera.position();
        assert!((p - Vec3::new(0.1, -0.2, -15.7)).length() < 1e-5);
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn sky_view_projection_ignores_position() {
        let a = Camera::default();
        let mut b = Camera::default();
        b.move_by(30.0, -4.0, 12.0);
        let diff = a.sky_view_projection(1.5) - b.sky_view_projection(1.5);
        assert!(diff.to_cols_array().iter().all(|v| v.abs() < 1e-5));
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let camera = Camera::default();
        let proj = camera.projection_matrix(1.0);
        let near = proj.project_point3(Vec3::new(0.0, 0.0, 0.1));
        let far = proj.project_point3(Vec3::new(0.0, 0.0, 100.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-5);
    }
}
