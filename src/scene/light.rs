//! Light types for the scene and per-geometry light filtering

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::Vec3;

use super::bounds::BoundingSphere;
use super::camera::SharedCamera;
use super::spatial::Geometry;

/// Process-unique light identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(u64);

impl LightId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Ambient light applied uniformly to every surface
#[derive(Debug, Clone)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.1,
        }
    }
}

/// Point light
#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 10.0,
        }
    }
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32, radius: f32) -> Self {
        Self { position, color, intensity, radius }
    }
}

/// Spot light
#[derive(Debug, Clone)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub radius: f32,
    pub inner_angle: f32, // radians
    pub outer_angle: f32, // radians
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: -Vec3::Y,
            color: Vec3::ONE,
            intensity: 1.0,
            radius: 10.0,
            inner_angle: 0.3,
            outer_angle: 0.5,
        }
    }
}

/// Directional light (like the sun)
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.5, -1.0, -0.5).normalize(),
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl DirectionalLight {
    pub fn new(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self { direction: direction.normalize(), color, intensity }
    }
}

#[derive(Debug, Clone)]
pub enum LightKind {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
    Point(PointLight),
    Spot(SpotLight),
}

/// A light attached to the scene.
#[derive(Debug)]
pub struct Light {
    id: LightId,
    kind: LightKind,
}

impl Light {
    pub fn new(kind: LightKind) -> Self {
        Self { id: LightId::next(), kind }
    }

    pub fn ambient(light: AmbientLight) -> Arc<Self> {
        Arc::new(Self::new(LightKind::Ambient(light)))
    }

    pub fn directional(light: DirectionalLight) -> Arc<Self> {
        Arc::new(Self::new(LightKind::Directional(light)))
    }

    pub fn point(light: PointLight) -> Arc<Self> {
        Arc::new(Self::new(LightKind::Point(light)))
    }

    pub fn spot(light: SpotLight) -> Arc<Self> {
        Arc::new(Self::new(LightKind::Spot(light)))
    }

    pub fn id(&self) -> LightId {
        self.id
    }

    pub fn kind(&self) -> &LightKind {
        &self.kind
    }

    /// Sphere of influence for local lights, `None` for global ones.
    pub fn influence(&self) -> Option<BoundingSphere> {
        match &self.kind {
            LightKind::Ambient(_) | LightKind::Directional(_) => None,
            LightKind::Point(light) => Some(BoundingSphere::new(light.position, light.radius)),
            LightKind::Spot(light) => Some(BoundingSphere::new(light.position, light.radius)),
        }
    }
}

/// Ordered list of lights affecting a geometry.
#[derive(Debug, Clone, Default)]
pub struct LightList {
    lights: Vec<Arc<Light>>,
}

impl LightList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, light: Arc<Light>) {
        self.lights.push(light);
    }

    /// Remove every light, keeping the allocation.
    pub fn clear(&mut self) {
        self.lights.clear();
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Light>> {
        self.lights.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Light>> {
        self.lights.iter()
    }
}

impl FromIterator<Arc<Light>> for LightList {
    fn from_iter<I: IntoIterator<Item = Arc<Light>>>(iter: I) -> Self {
        Self {
            lights: iter.into_iter().collect(),
        }
    }
}

/// Selects the lights that actually shade a geometry.
pub trait LightFilter: Send + Sync {
    /// Called whenever the render manager applies a camera.
    fn set_camera(&mut self, camera: &SharedCamera);

    /// Append the lights of `geometry` that pass the filter to `out`.
    fn filter_lights(&mut self, geometry: &Geometry, out: &mut LightList);
}

/// Keeps global lights and local lights whose influence reaches both the
/// geometry and the camera frustum.
#[derive(Default)]
pub struct DefaultLightFilter {
    camera: Option<SharedCamera>,
}

impl DefaultLightFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LightFilter for DefaultLightFilter {
    fn set_camera(&mut self, camera: &SharedCamera) {
        self.camera = Some(Arc::clone(camera));
    }

    fn filter_lights(&mut self, geometry: &Geometry, out: &mut LightList) {
        let camera = self.camera.as_ref().map(|camera| camera.read());
        let bound = geometry.world_bound();

        for light in geometry.world_light_list().iter() {
            let Some(influence) = light.influence() else {
                out.push(Arc::clone(light));
                continue;
            };

            if let Some(bound) = bound {
                if !influence.intersects(&bound) {
                    continue;
                }
            }
            if let Some(camera) = &camera {
                if !camera.intersects(&influence) {
                    continue;
                }
            }
            out.push(Arc::clone(light));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Camera;

    #[test]
    fn test_light_ids_are_unique() {
        let a = Light::point(PointLight::default());
        let b = Light::point(PointLight::default());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_default_filter_keeps_global_lights() {
        let near = Light::point(PointLight::new(Vec3::ZERO, Vec3::ONE, 1.0, 2.0));
        let far = Light::point(PointLight::new(Vec3::new(100.0, 0.0, 0.0), Vec3::ONE, 1.0, 2.0));
        let sun = Light::directional(DirectionalLight::default());

        let geometry = Geometry::new("box")
            .with_bound(BoundingSphere::new(Vec3::ZERO, 1.0))
            .with_light(Arc::clone(&near))
            .with_light(far)
            .with_light(Arc::clone(&sun));

        let mut filter = DefaultLightFilter::new();
        filter.set_camera(&Camera::new(800, 600).shared());

        let mut out = LightList::new();
        filter.filter_lights(&geometry, &mut out);

        let ids: Vec<_> = out.iter().map(|light| light.id()).collect();
        assert_eq!(ids, vec![near.id(), sun.id()]);
    }
}
