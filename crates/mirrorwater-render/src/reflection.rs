//! Planar reflection geometry: the water plane and the mirrored camera.

use glam::{Mat4, Vec3};

use crate::camera::Camera;

/// A horizontal mirror plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionPlane {
    /// Height of the plane on the Y axis.
    pub height: f32,
}

impl Default for ReflectionPlane {
    fn default() -> Self {
        Self { height: 0.5 }
    }
}

impl ReflectionPlane {
    #[must_use]
    pub fn new(height: f32) -> Self {
        Self { height }
    }

    /// Mirrors a point through the plane: `y' = 2h - y`.
    #[must_use]
    pub fn mirror_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(point.x, 2.0 * self.height - point.y, point.z)
    }
}

/// A camera pose mirrored through the water plane, sharing the live camera's intrinsics.
///
/// Derived fresh every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirroredCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl MirroredCamera {
    /// Mirrors `camera`'s position and the fixed `look_target` through `plane`.
    #[must_use]
    pub fn from_camera(camera: &Camera, plane: &ReflectionPlane, look_target: Vec3) -> Self {
        let position = plane.mirror_point(camera.position);
        let target = plane.mirror_point(look_target);

        // looking straight along Y leaves look_at without a basis
        let forward = (target - position).normalize_or_zero();
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        };

        Self {
            position,
            target,
            up,
            fov: camera.fov,
            aspect_ratio: camera.aspect_ratio,
            near: camera.near,
            far: camera.far,
        }
    }

    /// World-to-camera matrix (the inverse of the camera's world transform).
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }
}
