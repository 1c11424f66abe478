//! Perspective camera flying down the tunnel.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Perspective camera looking down -Z.
///
/// Position and rotation are eased toward targets every frame instead of
/// being set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct RiverCamera {
    /// World position. Only z is driven by input.
    pub position: Vec3,
    /// Pitch (x) and yaw (y) in radians.
    pub rotation: Vec2,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl RiverCamera {
    /// Create a camera on the tunnel axis at depth `z`.
    pub fn new(z: f32, fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, z),
            rotation: Vec2::ZERO,
            fov_degrees,
            near,
            far,
            aspect: 16.0 / 9.0,
        }
    }

    /// Update aspect ratio (call on window resize). Zero sizes are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Move depth and rotation a fraction `factor` of the way to their targets.
    pub fn approach(&mut self, target_z: f32, target_rotation: Vec2, factor: f32) {
        self.position.z = lerp(self.position.z, target_z, factor);
        self.rotation = self.rotation.lerp(target_rotation, factor);
    }

    /// World-to-view transform.
    pub fn view_matrix(&self) -> Mat4 {
        let orientation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0);
        Mat4::from_rotation_translation(orientation, self.position).inverse()
    }

    /// View-to-clip transform with a `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix.
    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for RiverCamera {
    fn default() -> Self {
        Self::new(5.0, 75.0, 0.1, 2000.0)
    }
}

#[inline]
pub(crate) fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
