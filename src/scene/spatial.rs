//! Scene graph nodes
//!
//! The tree is immutable once built: nodes and geometries are shared behind
//! `Arc`, so a scene can be attached to several viewports and the render
//! manager can queue geometries without copying them.

use std::fmt;
use std::sync::Arc;

use glam::Mat4;

use super::bounds::{BoundingSphere, FrustumIntersect};
use super::camera::Camera;
use super::light::{Light, LightList};
use crate::manager::RenderManager;
use crate::queue::{Bucket, ShadowMode};
use crate::resources::{Mesh, SharedMaterial};
use crate::viewport::ViewPort;

/// How a spatial takes part in frustum culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullHint {
    /// Culled when the bound lies outside the camera frustum.
    #[default]
    Dynamic,
    /// Always culled.
    Always,
    /// Never culled.
    Never,
}

/// Hook invoked for every visible spatial during scene traversal, before
/// its children are visited or it is queued.
pub trait RenderControl: Send + Sync {
    fn render(&self, rm: &mut RenderManager, vp: &ViewPort);
}

/// A drawable leaf of the scene graph.
pub struct Geometry {
    name: String,
    material: Option<SharedMaterial>,
    bucket: Bucket,
    shadow_mode: ShadowMode,
    world_matrix: Mat4,
    ignore_transform: bool,
    lights: LightList,
    bound: Option<BoundingSphere>,
    cull_hint: CullHint,
    controls: Vec<Arc<dyn RenderControl>>,
    mesh: Option<Mesh>,
}

impl Geometry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: None,
            bucket: Bucket::Opaque,
            shadow_mode: ShadowMode::Off,
            world_matrix: Mat4::IDENTITY,
            ignore_transform: false,
            lights: LightList::new(),
            bound: None,
            cull_hint: CullHint::Dynamic,
            controls: Vec::new(),
            mesh: None,
        }
    }

    pub fn with_material(mut self, material: SharedMaterial) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_bucket(mut self, bucket: Bucket) -> Self {
        self.bucket = bucket;
        self
    }

    pub fn with_shadow_mode(mut self, shadow_mode: ShadowMode) -> Self {
        self.shadow_mode = shadow_mode;
        self
    }

    pub fn with_world_matrix(mut self, world_matrix: Mat4) -> Self {
        self.world_matrix = world_matrix;
        self
    }

    /// Render with an identity world transform, e.g. for screen-space quads.
    pub fn with_ignore_transform(mut self, ignore_transform: bool) -> Self {
        self.ignore_transform = ignore_transform;
        self
    }

    pub fn with_light(mut self, light: Arc<Light>) -> Self {
        self.lights.push(light);
        self
    }

    pub fn with_bound(mut self, bound: BoundingSphere) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_cull_hint(mut self, cull_hint: CullHint) -> Self {
        self.cull_hint = cull_hint;
        self
    }

    pub fn with_control(mut self, control: Arc<dyn RenderControl>) -> Self {
        self.controls.push(control);
        self
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material(&self) -> Option<&SharedMaterial> {
        self.material.as_ref()
    }

    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    pub fn shadow_mode(&self) -> ShadowMode {
        self.shadow_mode
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    pub fn is_ignore_transform(&self) -> bool {
        self.ignore_transform
    }

    pub fn world_light_list(&self) -> &LightList {
        &self.lights
    }

    pub fn world_bound(&self) -> Option<BoundingSphere> {
        self.bound
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    /// Wrap the geometry as a scene graph leaf.
    pub fn into_spatial(self) -> Spatial {
        Spatial::Geometry(Arc::new(self))
    }
}

impl fmt::Debug for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geometry")
            .field("name", &self.name)
            .field("material", &self.material.as_ref().map(|m| m.read().name().to_string()))
            .field("bucket", &self.bucket)
            .field("shadow_mode", &self.shadow_mode)
            .field("cull_hint", &self.cull_hint)
            .finish_non_exhaustive()
    }
}

/// An inner node grouping other spatials.
pub struct Node {
    name: String,
    children: Vec<Spatial>,
    bound: Option<BoundingSphere>,
    cull_hint: CullHint,
    controls: Vec<Arc<dyn RenderControl>>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            bound: None,
            cull_hint: CullHint::Dynamic,
            controls: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl Into<Spatial>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_bound(mut self, bound: BoundingSphere) -> Self {
        self.bound = Some(bound);
        self
    }

    pub fn with_cull_hint(mut self, cull_hint: CullHint) -> Self {
        self.cull_hint = cull_hint;
        self
    }

    pub fn with_control(mut self, control: Arc<dyn RenderControl>) -> Self {
        self.controls.push(control);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Spatial] {
        &self.children
    }

    pub fn into_spatial(self) -> Spatial {
        Spatial::Node(Arc::new(self))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("children", &self.children)
            .field("cull_hint", &self.cull_hint)
            .finish_non_exhaustive()
    }
}

/// A scene graph element.
#[derive(Debug, Clone)]
pub enum Spatial {
    Node(Arc<Node>),
    Geometry(Arc<Geometry>),
}

impl Spatial {
    pub fn name(&self) -> &str {
        match self {
            Spatial::Node(node) => node.name(),
            Spatial::Geometry(geometry) => geometry.name(),
        }
    }

    pub fn cull_hint(&self) -> CullHint {
        match self {
            Spatial::Node(node) => node.cull_hint,
            Spatial::Geometry(geometry) => geometry.cull_hint,
        }
    }

    pub fn world_bound(&self) -> Option<BoundingSphere> {
        match self {
            Spatial::Node(node) => node.bound,
            Spatial::Geometry(geometry) => geometry.bound,
        }
    }

    /// Children of a node; empty for geometries.
    pub fn children(&self) -> &[Spatial] {
        match self {
            Spatial::Node(node) => node.children(),
            Spatial::Geometry(_) => &[],
        }
    }

    pub fn as_geometry(&self) -> Option<&Arc<Geometry>> {
        match self {
            Spatial::Geometry(geometry) => Some(geometry),
            Spatial::Node(_) => None,
        }
    }

    /// Returns `true` if the spatial is visible from `camera`.
    ///
    /// Updates the camera's plane state with every plane the bound lies
    /// fully inside of.
    pub fn check_culling(&self, camera: &mut Camera) -> bool {
        match self.cull_hint() {
            CullHint::Always => false,
            CullHint::Never => true,
            CullHint::Dynamic => match self.world_bound() {
                Some(bound) => camera.contains(&bound) != FrustumIntersect::Outside,
                None => true,
            },
        }
    }

    /// Invoke the spatial's render controls.
    pub fn run_control_render(&self, rm: &mut RenderManager, vp: &ViewPort) {
        let controls = match self {
            Spatial::Node(node) => &node.controls,
            Spatial::Geometry(geometry) => &geometry.controls,
        };
        for control in controls {
            control.render(rm, vp);
        }
    }

    /// Whether both handles refer to the same scene graph element.
    pub fn ptr_eq(&self, other: &Spatial) -> bool {
        match (self, other) {
            (Spatial::Node(a), Spatial::Node(b)) => Arc::ptr_eq(a, b),
            (Spatial::Geometry(a), Spatial::Geometry(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Node> for Spatial {
    fn from(node: Node) -> Self {
        node.into_spatial()
    }
}

impl From<Geometry> for Spatial {
    fn from(geometry: Geometry) -> Self {
        geometry.into_spatial()
    }
}

impl From<Arc<Geometry>> for Spatial {
    fn from(geometry: Arc<Geometry>) -> Self {
        Spatial::Geometry(geometry)
    }
}
