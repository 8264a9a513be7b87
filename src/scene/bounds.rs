//! Bounding volumes used for culling and light filtering.

use glam::Vec3;

/// World-space bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Returns `true` if the two spheres overlap or touch.
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

}

/// Result of a frustum containment test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumIntersect {
    /// Entirely outside at least one plane.
    Outside,
    /// Crosses one or more planes.
    Intersects,
    /// Entirely inside every tested plane.
    Inside,
}
