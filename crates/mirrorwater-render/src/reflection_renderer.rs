//! Offscreen mirrored pass for the water's planar reflection.

use glam::Vec3;

use crate::camera::Camera;
use crate::reflection::{MirroredCamera, ReflectionPlane};
use crate::reflection_target::ReflectionTarget;
use crate::scene::{NodeId, Scene};
use crate::scene_render::{CameraUniforms, PassKind, SceneRenderer};

/// Point the mirrored camera looks at before mirroring.
pub const DEFAULT_LOOK_TARGET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

/// Owns the reflection target and renders the scene into it through a
/// camera mirrored about the water plane.
pub struct ReflectionRenderer {
    plane: ReflectionPlane,
    look_target: Vec3,
    target: Option<ReflectionTarget>,
    camera: Option<MirroredCamera>,
    disposed: bool,
}

impl Default for ReflectionRenderer {
    fn default() -> Self {
        Self::new(ReflectionPlane::default(), DEFAULT_LOOK_TARGET)
    }
}

impl ReflectionRenderer {
    #[must_use]
    pub fn new(plane: ReflectionPlane, look_target: Vec3) -> Self {
        Self {
            plane,
            look_target,
            target: None,
            camera: None,
            disposed: false,
        }
    }

    pub fn plane(&self) -> ReflectionPlane {
        self.plane
    }

    pub fn look_target(&self) -> Vec3 {
        self.look_target
    }

    /// The offscreen target, once allocated.
    pub fn target(&self) -> Option<&ReflectionTarget> {
        self.target.as_ref()
    }

    /// Mirrored camera of the most recent reflection pass.
    pub fn mirrored_camera(&self) -> Option<&MirroredCamera> {
        self.camera.as_ref()
    }

    /// Derives the mirrored camera for `camera` without rendering.
    #[must_use]
    pub fn mirror(&self, camera: &Camera) -> MirroredCamera {
        MirroredCamera::from_camera(camera, &self.plane, self.look_target)
    }

    /// Allocates the target at the viewport size if none exists yet.
    ///
    /// Empty viewports leave the renderer without a target.
    pub fn ensure_target(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.target.is_some() || self.disposed {
            return;
        }
        if width == 0 || height == 0 {
            log::trace!("viewport is empty; reflection target deferred");
            return;
        }
        self.target = Some(ReflectionTarget::new(device, width, height));
    }

    /// Resizes the existing target in place.
    pub fn on_resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(target) = self.target.as_mut() {
            target.resize(device, width, height);
        }
    }

    /// Renders `scene` through the mirrored camera into the target.
    ///
    /// `water` is hidden for exactly the duration of the offscreen pass and
    /// its previous visibility restored afterwards. The pass is closed before
    /// returning, so the caller's next pass targets whatever it chooses.
    ///
    /// Returns `None` and records nothing when no target exists yet.
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        scene_renderer: &SceneRenderer,
        scene: &mut Scene,
        camera: &Camera,
        water: Option<NodeId>,
    ) -> Option<MirroredCamera> {
        debug_assert!(!self.disposed, "reflection pass after dispose");
        let Some(target) = self.target.as_mut() else {
            log::trace!("no reflection target yet; reflection pass skipped");
            return None;
        };

        let mirrored = MirroredCamera::from_camera(camera, &self.plane, self.look_target);
        scene_renderer.write_camera(
            queue,
            PassKind::Reflection,
            &CameraUniforms::new(
                mirrored.view_matrix(),
                mirrored.projection_matrix(),
                mirrored.position,
            ),
        );

        let background = clear_color(scene.background);
        let color_view = target.color_view();
        let depth_view = target.depth_view();
        let mut draw = |scene: &Scene| {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Reflection Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            scene_renderer.draw(&mut pass, PassKind::Reflection, scene);
        };

        match water {
            Some(id) => scene.with_hidden(id, draw),
            None => draw(&*scene),
        }

        target.mark_populated();
        self.camera = Some(mirrored);
        Some(mirrored)
    }

    /// Releases the target. The renderer allocates nothing afterwards.
    pub fn dispose(&mut self) {
        if let Some(target) = self.target.as_mut() {
            target.dispose();
        }
        self.target = None;
        self.camera = None;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Converts an sRGB colour to the linear clear value of an sRGB target.
pub(crate) fn clear_color(srgb: Vec3) -> wgpu::Color {
    let linear = |c: f32| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    wgpu::Color {
        r: f64::from(linear(srgb.x)),
        g: f64::from(linear(srgb.y)),
        b: f64::from(linear(srgb.z)),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_uses_plane_and_look_target() {
        let renderer = ReflectionRenderer::default();
        let mut camera = Camera::new(1.5);
        camera.position = Vec3::new(3.0, 4.0, -2.0);
        let mirrored = renderer.mirror(&camera);
        assert!((mirrored.position.y - (1.0 - 4.0)).abs() < 1e-6);
        assert_eq!(mirrored.target, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(mirrored.aspect_ratio, 1.5);
    }

    #[test]
    fn test_custom_plane() {
        let renderer = ReflectionRenderer::new(ReflectionPlane::new(0.0), Vec3::ZERO);
        let camera = Camera::new(1.0);
        let mirrored = renderer.mirror(&camera);
        assert_eq!(mirrored.position.y, -camera.position.y);
    }

    #[test]
    fn test_fresh_renderer_has_no_target() {
        let renderer = ReflectionRenderer::default();
        assert!(renderer.target().is_none());
        assert!(renderer.mirrored_camera().is_none());
        assert!(!renderer.is_disposed());
    }

    #[test]
    fn test_dispose_without_target() {
        let mut renderer = ReflectionRenderer::default();
        renderer.dispose();
        assert!(renderer.is_disposed());
        assert!(renderer.target().is_none());
    }

    #[test]
    fn test_clear_color_endpoints() {
        let black = clear_color(Vec3::ZERO);
        let white = clear_color(Vec3::ONE);
        assert_eq!(black.r, 0.0);
        assert!((white.g - 1.0).abs() < 1e-6);
        let mid = clear_color(Vec3::splat(0.5));
        assert!(mid.b > 0.2 && mid.b < 0.22);
    }
}
