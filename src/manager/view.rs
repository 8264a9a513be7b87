//! Camera application: viewport rectangles and view/projection uniforms.

use std::sync::Arc;

use glam::{Mat4, Vec4};

use super::RenderManager;
use crate::scene::{Camera, SharedCamera};

/// Maps pixel space `[0, width] x [0, height]` to clip space `[-1, 1]`.
///
/// Zero extents are treated as 1 so the matrix stays finite.
pub(crate) fn ortho_matrix(width: u32, height: u32) -> Mat4 {
    let width = width.max(1) as f32;
    let height = height.max(1) as f32;
    Mat4::from_cols(
        Vec4::new(2.0 / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / height, 0.0, 0.0),
        Vec4::ZERO,
        Vec4::new(-1.0, -1.0, 0.0, 1.0),
    )
}

impl RenderManager {
    /// Apply `camera` to the backend and the uniform bindings.
    ///
    /// The viewport and clip rectangles are only recomputed when the camera
    /// differs from the previously applied one or its viewport changed. With
    /// `ortho`, geometry is rendered in pixel space through an identity view
    /// and the orthographic matrix.
    pub fn set_camera(&mut self, camera: &SharedCamera, ortho: bool) {
        if let Some(filter) = self.light_filter.as_mut() {
            filter.set_camera(camera);
        }

        let mut cam = camera.write();
        let camera_changed = self
            .prev_cam
            .as_ref()
            .map_or(true, |prev| !Arc::ptr_eq(prev, camera));
        if camera_changed || cam.is_viewport_changed() {
            self.set_view_port(&mut cam);
            self.prev_cam = Some(Arc::clone(camera));
        }
        self.set_view_projection(&cam, ortho);
    }

    fn set_view_port(&mut self, cam: &mut Camera) {
        let width = cam.width() as f32;
        let height = cam.height() as f32;
        let x = (cam.viewport_left() * width) as i32;
        let y = (cam.viewport_bottom() * height) as i32;
        let view_width = (cam.viewport_right() * width) as i32 - x;
        let view_height = (cam.viewport_top() * height) as i32 - y;

        log::trace!("Viewport set to ({x}, {y}, {view_width}x{view_height})");
        self.view_rect = (x, y, view_width, view_height);
        self.uniforms.set_viewport(x, y, view_width, view_height);
        self.backend.set_viewport(x, y, view_width, view_height);
        self.backend.set_clip_rect(x, y, view_width, view_height);
        cam.clear_viewport_changed();

        self.ortho_matrix = ortho_matrix(cam.width(), cam.height());
    }

    fn set_view_projection(&mut self, cam: &Camera, ortho: bool) {
        if ortho {
            self.uniforms
                .set_camera(cam.position(), Mat4::IDENTITY, self.ortho_matrix, self.ortho_matrix);
        } else {
            self.uniforms.set_camera(
                cam.position(),
                cam.view_matrix(),
                cam.projection_matrix(),
                cam.view_projection_matrix(),
            );
        }
        self.backend.set_uniforms(self.uniforms.data());
    }

    /// Pixel rectangle `(x, y, width, height)` of the last applied camera.
    pub fn view_rect(&self) -> (i32, i32, i32, i32) {
        self.view_rect
    }

    /// Orthographic matrix of the last applied camera.
    pub fn ortho_matrix(&self) -> Mat4 {
        self.ortho_matrix
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::backend::DummyBackend;

    #[test]
    fn test_ortho_maps_pixels_to_clip_space() {
        let ortho = ortho_matrix(512, 256);
        assert_eq!(ortho.transform_point3(Vec3::ZERO), Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(ortho.transform_point3(Vec3::new(512.0, 256.0, 5.0)), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(ortho.transform_point3(Vec3::new(256.0, 128.0, 0.0)), Vec3::ZERO);
    }

    #[test]
    fn test_ortho_zero_size_is_finite() {
        let ortho = ortho_matrix(0, 0);
        assert!(ortho.is_finite());
        assert_eq!(ortho.transform_point3(Vec3::new(1.0, 1.0, 0.0)), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_set_camera_computes_rect() {
        let mut rm = RenderManager::new(Box::new(DummyBackend::new()));
        let camera = Camera::new(800, 600).shared();
        camera.write().set_viewport(0.5, 1.0, 0.0, 0.5);

        rm.set_camera(&camera, false);

        assert_eq!(rm.view_rect(), (400, 0, 400, 300));
        assert!(!camera.read().is_viewport_changed());
        assert!(rm.current_camera().is_some_and(|c| Arc::ptr_eq(c, &camera)));
    }

    #[test]
    fn test_set_camera_ortho_uniforms() {
        let mut rm = RenderManager::new(Box::new(DummyBackend::new()));
        let camera = Camera::new(800, 600).shared();

        rm.set_camera(&camera, true);
        assert_eq!(rm.uniforms().data().view, Mat4::IDENTITY);
        assert_eq!(rm.uniforms().data().projection, ortho_matrix(800, 600));
        assert_eq!(rm.uniforms().data().view_projection, ortho_matrix(800, 600));

        rm.set_camera(&camera, false);
        assert_eq!(rm.uniforms().data().view, camera.read().view_matrix());
    }
}
