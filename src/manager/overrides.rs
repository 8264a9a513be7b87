//! Global overrides superseding per-geometry material settings.
//!
//! Precedence when a geometry is rendered: forced technique (when the
//! geometry's material defines it), then forced material, then the
//! geometry's own material.

use super::RenderManager;
use crate::resources::{MatParamOverride, MatParamValue, RenderState, SharedMaterial};

/// Name of the parameter override carrying the bound draw buffer index.
pub const BOUND_DRAW_BUFFER: &str = "BoundDrawBuffer";

/// Override state owned by the render manager.
///
/// The draw buffer override is held apart from user parameters and is never
/// looked up by name.
#[derive(Default)]
pub(crate) struct ForcedOverrides {
    pub(crate) material: Option<SharedMaterial>,
    pub(crate) technique: Option<String>,
    pub(crate) render_state: Option<RenderState>,
    params: Vec<MatParamOverride>,
    draw_buffer: Option<MatParamOverride>,
    bound_draw_buffer: i32,
}

impl ForcedOverrides {
    pub(crate) fn new(pass_draw_buffer_target_id: bool) -> Self {
        let mut overrides = Self::default();
        overrides.set_pass_draw_buffer_target_id(pass_draw_buffer_target_id);
        overrides
    }

    /// The draw buffer override, if enabled, followed by user overrides in
    /// insertion order.
    pub(crate) fn params(&self) -> impl Iterator<Item = &MatParamOverride> {
        self.draw_buffer.iter().chain(self.params.iter())
    }

    pub(crate) fn add_param(&mut self, param: MatParamOverride) {
        self.params.push(param);
    }

    /// Only user overrides can be removed here.
    pub(crate) fn remove_param(&mut self, param: &MatParamOverride) -> bool {
        match self.params.iter().position(|p| p == param) {
            Some(index) => {
                self.params.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn draw_buffer_param(&self) -> Option<&MatParamOverride> {
        self.draw_buffer.as_ref()
    }

    pub(crate) fn is_pass_draw_buffer_target_id(&self) -> bool {
        self.draw_buffer.is_some()
    }

    /// Enabling when enabled or disabling when disabled does nothing.
    pub(crate) fn set_pass_draw_buffer_target_id(&mut self, enabled: bool) {
        match (enabled, self.draw_buffer.is_some()) {
            (true, false) => {
                self.draw_buffer = Some(MatParamOverride::new(
                    BOUND_DRAW_BUFFER,
                    MatParamValue::Int(self.bound_draw_buffer),
                ));
            }
            (false, true) => self.draw_buffer = None,
            _ => {}
        }
    }

    pub(crate) fn update_bound_draw_buffer(&mut self, index: i32) {
        self.bound_draw_buffer = index;
        if let Some(param) = self.draw_buffer.as_mut() {
            param.value = MatParamValue::Int(index);
        }
    }
}

impl RenderManager {
    /// Material used for every geometry instead of its own.
    pub fn set_forced_material(&mut self, material: Option<SharedMaterial>) {
        self.overrides.material = material;
    }

    pub fn forced_material(&self) -> Option<&SharedMaterial> {
        self.overrides.material.as_ref()
    }

    /// Technique selected on every geometry material that defines it.
    ///
    /// Geometries whose material lacks the technique fall back to the
    /// forced material, and are not rendered at all when none is set.
    pub fn set_forced_technique(&mut self, technique: Option<String>) {
        self.overrides.technique = technique;
    }

    pub fn forced_technique(&self) -> Option<&str> {
        self.overrides.technique.as_deref()
    }

    pub fn set_forced_render_state(&mut self, state: Option<RenderState>) {
        self.overrides.render_state = state;
    }

    pub fn forced_render_state(&self) -> Option<RenderState> {
        self.overrides.render_state
    }

    /// Add a parameter override applied to every material.
    pub fn add_forced_mat_param(&mut self, param: MatParamOverride) {
        self.overrides.add_param(param);
    }

    /// Remove a parameter override. Returns `false` if it was not set.
    pub fn remove_forced_mat_param(&mut self, param: &MatParamOverride) -> bool {
        self.overrides.remove_param(param)
    }

    /// Parameter overrides applied to every material.
    ///
    /// The [`BOUND_DRAW_BUFFER`] override comes first when enabled, then
    /// user overrides in the order they were added.
    pub fn forced_mat_params(&self) -> impl Iterator<Item = &MatParamOverride> {
        self.overrides.params()
    }

    /// The [`BOUND_DRAW_BUFFER`] override, present while the draw buffer
    /// index is passed to shaders.
    pub fn bound_draw_buffer_param(&self) -> Option<&MatParamOverride> {
        self.overrides.draw_buffer_param()
    }

    /// Pass the bound draw buffer index to shaders as the
    /// [`BOUND_DRAW_BUFFER`] parameter override.
    pub fn set_pass_draw_buffer_target_id_to_shaders(&mut self, enabled: bool) {
        self.overrides.set_pass_draw_buffer_target_id(enabled);
    }

    pub fn is_pass_draw_buffer_target_id_to_shaders(&self) -> bool {
        self.overrides.is_pass_draw_buffer_target_id()
    }
}
