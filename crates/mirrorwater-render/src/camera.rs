//! Camera and view management.

use glam::{Mat4, Vec3};

/// A perspective orbit camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Closest allowed orbit distance.
    pub min_distance: f32,
    /// Farthest allowed orbit distance.
    pub max_distance: f32,
    /// Largest allowed angle between +Y and the view offset, in radians.
    pub max_polar_angle: f32,
}

impl Camera {
    /// Creates a camera at (5, 2.5, 5) looking at the origin with a 60° field of view.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(5.0, 2.5, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 60f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
            min_distance: 3.0,
            max_distance: 50.0,
            max_polar_angle: std::f32::consts::PI / 2.1,
        }
    }

    /// Sets the aspect ratio from viewport pixel dimensions, ignoring empty viewports.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Orbits the camera around the target, keeping the polar angle above the horizon limit.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta -= delta_x;
        // stay just off the pole so look_at keeps a valid basis
        phi = (phi - delta_y).clamp(0.01, self.max_polar_angle);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Moves toward (positive delta) or away from the target within the distance limits.
    pub fn zoom(&mut self, delta: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let new_distance = (distance - delta).clamp(self.min_distance, self.max_distance);
        self.position = self.target + offset / distance * new_distance;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
