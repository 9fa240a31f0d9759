use glam::{Mat4, Vec3, Vec4};

/// Plane `dot(normal, p) + distance = 0`; positive half-space is inside.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Normalizes by the length of the xyz part. A zero normal is kept as is.
    fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 0.0 {
            Self {
                normal: normal / len,
                distance: v.w / len,
            }
        } else {
            Self {
                normal,
                distance: v.w,
            }
        }
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// `d + r` for an axis-aligned cube of half-extent `radius` at `center`.
    /// Negative means fully outside this plane.
    pub fn box_margin(&self, center: Vec3, radius: f32) -> f32 {
        let d = self.signed_distance(center);
        let r = radius * (self.normal.x.abs() + self.normal.y.abs() + self.normal.z.abs());
        d + r
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.distance]
    }
}

/// Six clip planes (left, right, bottom, top, near, far) of a
/// view-projection with depth in [0, 1].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    pub fn from_view_projection(m: Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);
        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Builds a frustum from explicit planes (normalized the same way).
    pub fn from_planes(planes: [Vec4; 6]) -> Self {
        Self {
            planes: planes.map(Plane::from_coefficients),
        }
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    /// Smallest per-plane margin. The cube is visible iff this is >= 0.
    pub fn margin(&self, center: Vec3, radius: f32) -> f32 {
        self.planes
            .iter()
            .map(|p| p.box_margin(center, radius))
            .fold(f32::INFINITY, f32::min)
    }

    /// True unless the cube lies fully outside some plane.
    pub fn intersects_cube(&self, center: Vec3, radius: f32) -> bool {
        self.planes.iter().all(|p| p.box_margin(center, radius) >= 0.0)
    }

    /// Plane coefficients in upload order.
    pub fn to_arrays(&self) -> [[f32; 4]; 6] {
        self.planes.map(Plane::to_array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn looking_down_z() -> Frustum {
        let view = Mat4::look_to_lh(Vec3::ZERO, Vec3::Z, Vec3::Y);
        let proj = Mat4::perspective_lh(FRAC_PI_2, 1.0, 0.1, 100.0);
        Frustum::from_view_projection(proj * view)
    }

    #[test]
    fn planes_are_unit_length() {
        for plane in looking_down_z().planes() {
            assert!((plane.normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn near_and_far_planes_bound_depth() {
        let f = looking_down_z();
        let near = f.planes()[4];
        let far = f.planes()[5];
        assert!((near.signed_distance(Vec3::new(0.0, 0.0, 0.1))).abs() < 1e-4);
        assert!((far.signed_distance(Vec3::new(0.0, 0.0, 100.0))).abs() < 0.1);
        assert!(near.normal.z > 0.99);
        assert!(far.normal.z < -0.99);
    }

    #[test]
    fn point_in_front_is_inside_behind_is_outside() {
        let f = looking_down_z();
        assert!(f.intersects_cube(Vec3::new(0.0, 0.0, 10.0), 0.0));
        assert!(!f.intersects_cube(Vec3::new(0.0, 0.0, -10.0), 0.5));
        assert!(!f.intersects_cube(Vec3::new(50.0, 0.0, 10.0), 0.5));
    }

    #[test]
    fn margin_sign_agrees_with_intersection() {
        let f = looking_down_z();
        for x in -30..30 {
            let c = Vec3::new(x as f32 * 0.5, 0.0, 5.0);
            assert_eq!(f.margin(c, 0.475) >= 0.0, f.intersects_cube(c, 0.475));
        }
    }

    #[test]
    fn zero_normal_is_kept() {
        let f = Frustum::from_planes([Vec4::new(0.0, 0.0, 0.0, 2.0); 6]);
        assert_eq!(f.planes()[0].normal, Vec3::ZERO);
        assert_eq!(f.planes()[0].distance, 2.0);
        assert!(f.intersects_cube(Vec3::new(1e6, 0.0, 0.0), 0.1));
    }
}
