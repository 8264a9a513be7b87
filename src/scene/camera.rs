//! Camera system
//!
//! A [`Camera`] couples view/projection matrices with an on-screen
//! resolution and a normalized viewport rectangle. The render manager reads
//! the viewport fractions to derive pixel rectangles and uses the frustum
//! planes, together with a per-traversal plane state, to cull subtrees.

use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use parking_lot::RwLock;

use super::bounds::{BoundingSphere, FrustumIntersect};

/// A camera shared between viewports and the render manager.
pub type SharedCamera = Arc<RwLock<Camera>>;

/// Number of frustum planes; plane state uses one bit per plane.
pub const FRUSTUM_PLANES: usize = 6;

/// Camera projection type
#[derive(Debug, Clone, Copy)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh(*fov_y, *aspect, *near, *far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh(*left, *right, *bottom, *top, *near, *far),
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect: a, .. } = self {
            *a = aspect;
        }
    }
}

/// Camera for viewing the scene
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    projection: Projection,
    width: u32,
    height: u32,
    viewport_left: f32,
    viewport_right: f32,
    viewport_bottom: f32,
    viewport_top: f32,
    viewport_changed: bool,
    /// Bit `i` set means the current subtree is known to be fully inside plane `i`.
    plane_state: u32,
    /// Normalized planes as (normal, distance); inside is `n·p + d >= 0`.
    frustum: [Vec4; FRUSTUM_PLANES],
}

impl Camera {
    /// Create a camera rendering at the given resolution.
    pub fn new(width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Projection::perspective(45.0, aspect, 0.1, 1000.0),
            width,
            height,
            viewport_left: 0.0,
            viewport_right: 1.0,
            viewport_bottom: 0.0,
            viewport_top: 1.0,
            viewport_changed: true,
            plane_state: 0,
            frustum: [Vec4::ZERO; FRUSTUM_PLANES],
        };
        camera.update_frustum();
        camera
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.set_projection(projection);
        self
    }

    /// Wrap the camera for sharing.
    pub fn shared(self) -> SharedCamera {
        Arc::new(RwLock::new(self))
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_frustum();
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        self.update_frustum();
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.update_frustum();
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection.matrix()
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Change the on-screen resolution.
    ///
    /// With `fix_aspect` a perspective projection is refitted to the new
    /// aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32, fix_aspect: bool) {
        self.width = width;
        self.height = height;
        self.viewport_changed = true;
        if fix_aspect && height > 0 {
            self.projection.set_aspect(width as f32 / height as f32);
            self.update_frustum();
        }
    }

    /// Set the normalized viewport rectangle (fractions of the resolution).
    pub fn set_viewport(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.viewport_left = left;
        self.viewport_right = right;
        self.viewport_bottom = bottom;
        self.viewport_top = top;
        self.viewport_changed = true;
    }

    pub fn viewport_left(&self) -> f32 {
        self.viewport_left
    }

    pub fn viewport_right(&self) -> f32 {
        self.viewport_right
    }

    pub fn viewport_bottom(&self) -> f32 {
        self.viewport_bottom
    }

    pub fn viewport_top(&self) -> f32 {
        self.viewport_top
    }

    /// Whether the viewport or resolution changed since it was last applied.
    pub fn is_viewport_changed(&self) -> bool {
        self.viewport_changed
    }

    pub fn clear_viewport_changed(&mut self) {
        self.viewport_changed = false;
    }

    pub fn plane_state(&self) -> u32 {
        self.plane_state
    }

    pub fn set_plane_state(&mut self, state: u32) {
        self.plane_state = state;
    }

    /// Test a bound against the frustum.
    ///
    /// Planes whose bit is already set in the plane state are skipped. Planes
    /// the bound lies fully inside are recorded in the plane state so that
    /// children of the tested node can skip them too.
    pub fn contains(&mut self, bound: &BoundingSphere) -> FrustumIntersect {
        let mut result = FrustumIntersect::Inside;
        for (i, plane) in self.frustum.iter().enumerate() {
            let mask = 1 << i;
            if self.plane_state & mask != 0 {
                continue;
            }

            let distance = plane.truncate().dot(bound.center) + plane.w;
            if distance < -bound.radius {
                return FrustumIntersect::Outside;
            }
            if distance < bound.radius {
                result = FrustumIntersect::Intersects;
            } else {
                self.plane_state |= mask;
            }
        }
        result
    }

    /// Stateless frustum overlap test, ignoring the plane state.
    pub fn intersects(&self, bound: &BoundingSphere) -> bool {
        self.frustum
            .iter()
            .all(|plane| plane.truncate().dot(bound.center) + plane.w >= -bound.radius)
    }

    fn update_frustum(&mut self) {
        let m = self.view_projection_matrix();
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        // Depth is [0, 1] in clip space, so the near plane is row 2 alone.
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2];
        for (slot, plane) in self.frustum.iter_mut().zip(planes) {
            let length = plane.truncate().length();
            *slot = if length > f32::EPSILON {
                plane / length
            } else {
                plane
            };
        }
    }
}
