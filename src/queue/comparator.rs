//! Bucket sort policies.

use std::cmp::Ordering;

use glam::Vec3;

use crate::scene::{Camera, Geometry};

/// Orders the geometries of one bucket before it is rendered.
pub trait GeometryComparator: Send + Sync {
    /// Called with the viewport camera before every sort.
    fn set_camera(&mut self, camera: &Camera);

    fn compare(&self, a: &Geometry, b: &Geometry) -> Ordering;
}

/// World position used for distance sorting: bound center, else translation.
fn world_position(geometry: &Geometry) -> Vec3 {
    geometry
        .world_bound()
        .map(|bound| bound.center)
        .unwrap_or_else(|| geometry.world_matrix().w_axis.truncate())
}

/// Front-to-back, for early depth rejection.
#[derive(Debug, Default)]
pub struct OpaqueComparator {
    camera_position: Vec3,
}

impl GeometryComparator for OpaqueComparator {
    fn set_camera(&mut self, camera: &Camera) {
        self.camera_position = camera.position();
    }

    fn compare(&self, a: &Geometry, b: &Geometry) -> Ordering {
        let dist_a = world_position(a).distance_squared(self.camera_position);
        let dist_b = world_position(b).distance_squared(self.camera_position);
        dist_a.partial_cmp(&dist_b).unwrap_or(Ordering::Equal)
    }
}

/// Back-to-front, for correct blending.
#[derive(Debug, Default)]
pub struct TransparentComparator {
    camera_position: Vec3,
}

impl GeometryComparator for TransparentComparator {
    fn set_camera(&mut self, camera: &Camera) {
        self.camera_position = camera.position();
    }

    fn compare(&self, a: &Geometry, b: &Geometry) -> Ordering {
        let dist_a = world_position(a).distance_squared(self.camera_position);
        let dist_b = world_position(b).distance_squared(self.camera_position);
        dist_b.partial_cmp(&dist_a).unwrap_or(Ordering::Equal)
    }
}

/// Lowest world Z first, so overlapping GUI elements stack by depth.
#[derive(Debug, Default)]
pub struct GuiComparator;

impl GeometryComparator for GuiComparator {
    fn set_camera(&mut self, _camera: &Camera) {}

    fn compare(&self, a: &Geometry, b: &Geometry) -> Ordering {
        let z_a = a.world_matrix().w_axis.z;
        let z_b = b.world_matrix().w_axis.z;
        z_a.partial_cmp(&z_b).unwrap_or(Ordering::Equal)
    }
}

/// Keeps insertion order.
#[derive(Debug, Default)]
pub struct NullComparator;

impl GeometryComparator for NullComparator {
    fn set_camera(&mut self, _camera: &Camera) {}

    fn compare(&self, _a: &Geometry, _b: &Geometry) -> Ordering {
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;

    fn at(name: &str, z: f32) -> Geometry {
        Geometry::new(name).with_world_matrix(Mat4::from_translation(Vec3::new(0.0, 0.0, z)))
    }

    #[test]
    fn test_opaque_front_to_back() {
        let mut camera = Camera::new(800, 600);
        camera.set_position(Vec3::new(0.0, 0.0, 10.0));

        let mut comparator = OpaqueComparator::default();
        comparator.set_camera(&camera);

        let near = at("near", 5.0);
        let far = at("far", -5.0);
        assert_eq!(comparator.compare(&near, &far), Ordering::Less);

        let mut comparator = TransparentComparator::default();
        comparator.set_camera(&camera);
        assert_eq!(comparator.compare(&near, &far), Ordering::Greater);
    }

    #[test]
    fn test_gui_by_depth() {
        let comparator = GuiComparator;
        assert_eq!(comparator.compare(&at("back", -1.0), &at("front", 1.0)), Ordering::Less);
        assert_eq!(NullComparator.compare(&at("a", 0.0), &at("b", 9.0)), Ordering::Equal);
    }
}
