//! Material interface and the state a material can be overridden with.
//!
//! Shader definition and compilation live outside this crate. A [`Material`]
//! only has to expose its techniques by name and a render entry point; the
//! render manager decides which material and technique end up drawing each
//! geometry.

use std::sync::Arc;

use glam::{Mat4, Vec4};
use parking_lot::RwLock;

use crate::error::RenderResult;
use crate::manager::RenderManager;
use crate::scene::{Geometry, LightList};

/// Technique selected when a material has no active technique.
pub const DEFAULT_TECHNIQUE_NAME: &str = "Default";

/// A material shared between geometries.
pub type SharedMaterial = Arc<RwLock<dyn Material>>;

/// Wrap a material for sharing between geometries and the render manager.
pub fn shared_material<M: Material + 'static>(material: M) -> SharedMaterial {
    Arc::new(RwLock::new(material))
}

/// How lights are bound when a technique shades a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightMode {
    /// No lighting.
    Disable,
    /// One pass per light.
    #[default]
    MultiPass,
    /// Lights batched into a single pass.
    SinglePass,
    /// Single pass plus image-based lighting probes.
    SinglePassAndImageBased,
    /// Lights baked into a static pass.
    StaticPass,
}

/// Face culling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceCullMode {
    Off,
    Front,
    #[default]
    Back,
    FrontAndBack,
}

/// Color blending mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Off,
    /// Standard src-over alpha blending.
    Alpha,
    /// Premultiplied alpha.
    PremultAlpha,
    Additive,
    Modulate,
}

/// Fixed-function state applied around a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub color_write: bool,
    pub face_cull: FaceCullMode,
    pub blend_mode: BlendMode,
    pub wireframe: bool,
    /// (factor, units)
    pub polygon_offset: Option<(f32, f32)>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            color_write: true,
            face_cull: FaceCullMode::Back,
            blend_mode: BlendMode::Off,
            wireframe: false,
            polygon_offset: None,
        }
    }
}

impl RenderState {
    pub fn with_depth_write(mut self, depth_write: bool) -> Self {
        self.depth_write = depth_write;
        self
    }

    pub fn with_color_write(mut self, color_write: bool) -> Self {
        self.color_write = color_write;
        self
    }

    pub fn with_face_cull(mut self, face_cull: FaceCullMode) -> Self {
        self.face_cull = face_cull;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn with_polygon_offset(mut self, factor: f32, units: f32) -> Self {
        self.polygon_offset = Some((factor, units));
        self
    }

    // Presets

    /// Depth-only state used by shadow and pre-depth passes.
    pub fn depth_only() -> Self {
        Self::default().with_color_write(false)
    }

    pub fn wireframe() -> Self {
        Self {
            wireframe: true,
            face_cull: FaceCullMode::Off,
            ..Default::default()
        }
    }
}

/// Typed value of a material parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatParamValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// A material parameter value that supersedes the material's own value.
#[derive(Debug, Clone, PartialEq)]
pub struct MatParamOverride {
    pub name: String,
    pub value: MatParamValue,
    pub enabled: bool,
}

impl MatParamOverride {
    pub fn new(name: impl Into<String>, value: MatParamValue) -> Self {
        Self {
            name: name.into(),
            value,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A material as seen by the render manager.
pub trait Material: Send + Sync {
    /// Material name, used in logs and errors.
    fn name(&self) -> &str;

    /// Returns `true` if a technique with this name is defined.
    fn has_technique(&self, name: &str) -> bool;

    /// Name of the active technique, if one has been selected.
    fn active_technique(&self) -> Option<&str>;

    /// Make `name` the active technique.
    fn select_technique(&mut self, name: &str, rm: &RenderManager) -> RenderResult<()>;

    /// Render state the active technique forces on top of global overrides.
    fn active_technique_render_state(&self) -> Option<RenderState> {
        None
    }

    /// Draw `geometry` with the given lights.
    fn render(
        &self,
        geometry: &Geometry,
        lights: &LightList,
        rm: &mut RenderManager,
    ) -> RenderResult<()>;

    /// Warm up shaders and GPU state for `geometry` ahead of the first draw.
    fn preload(&self, _rm: &mut RenderManager, _geometry: &Geometry) -> RenderResult<()> {
        Ok(())
    }
}
