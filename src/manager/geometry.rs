//! Per-geometry material resolution and draw dispatch.

use std::sync::Arc;

use glam::Mat4;

use super::RenderManager;
use crate::error::{RenderError, RenderResult};
use crate::queue::GeometryList;
use crate::resources::{SharedMaterial, DEFAULT_TECHNIQUE_NAME};
use crate::scene::{Geometry, LightList};

/// Which material draws a geometry, decided before any state is touched.
enum Dispatch {
    /// No eligible material; the geometry is not drawn.
    Skip,
    /// Draw with the geometry's material switched to the forced technique.
    Technique(SharedMaterial, String),
    Material(SharedMaterial),
}

impl RenderManager {
    fn resolve_dispatch(&self, geometry: &Geometry) -> RenderResult<Dispatch> {
        if let Some(technique) = self.overrides.technique.as_ref() {
            if let Some(material) = geometry.material() {
                if material.read().has_technique(technique) {
                    return Ok(Dispatch::Technique(Arc::clone(material), technique.clone()));
                }
            }
            return Ok(match self.overrides.material.as_ref() {
                Some(forced) => Dispatch::Material(Arc::clone(forced)),
                None => Dispatch::Skip,
            });
        }

        match self.overrides.material.as_ref().or(geometry.material()) {
            Some(material) => Ok(Dispatch::Material(Arc::clone(material))),
            None => Err(RenderError::MissingMaterial {
                geometry: geometry.name().to_string(),
            }),
        }
    }

    /// Render a single geometry with the effective material.
    ///
    /// Geometries rejected by the render filter, or left without an eligible
    /// material by the forced technique, are skipped without touching any
    /// state.
    pub fn render_geometry(&mut self, geometry: &Geometry) -> RenderResult<()> {
        if let Some(filter) = self.render_filter.as_ref() {
            if !filter(geometry) {
                log::trace!("Geometry '{}' rejected by render filter", geometry.name());
                return Ok(());
            }
        }

        let dispatch = self.resolve_dispatch(geometry)?;
        if let Dispatch::Skip = dispatch {
            log::trace!(
                "Geometry '{}' skipped: no technique {:?} and no forced material",
                geometry.name(),
                self.overrides.technique
            );
            return Ok(());
        }

        let mut filtered = std::mem::take(&mut self.filtered_lights);
        filtered.clear();
        let lights = match self.light_filter.as_mut() {
            Some(filter) => {
                filter.filter_lights(geometry, &mut filtered);
                &filtered
            }
            None => geometry.world_light_list(),
        };
        for light in lights.iter() {
            self.lights_in_use.insert(light.id());
        }
        self.statistics.on_geometry(lights.len(), self.lights_in_use.len());

        let result = match dispatch {
            Dispatch::Technique(material, technique) => {
                self.render_with_technique(geometry, &material, &technique, lights)
            }
            Dispatch::Material(material) => self.draw(geometry, &material, lights),
            Dispatch::Skip => Ok(()),
        };

        self.filtered_lights = filtered;
        result
    }

    fn render_with_technique(
        &mut self,
        geometry: &Geometry,
        material: &SharedMaterial,
        technique: &str,
        lights: &LightList,
    ) -> RenderResult<()> {
        let previous = material
            .read()
            .active_technique()
            .unwrap_or(DEFAULT_TECHNIQUE_NAME)
            .to_string();
        material.write().select_technique(technique, self)?;

        let saved_state = self.overrides.render_state;
        if let Some(state) = material.read().active_technique_render_state() {
            self.overrides.render_state = Some(state);
        }

        let result = self.draw(geometry, material, lights);

        self.overrides.render_state = saved_state;
        let restored = material.write().select_technique(&previous, self);
        result.and(restored)
    }

    fn draw(
        &mut self,
        geometry: &Geometry,
        material: &SharedMaterial,
        lights: &LightList,
    ) -> RenderResult<()> {
        self.backend.push_debug_group(geometry.name());

        let world = if geometry.is_ignore_transform() {
            Mat4::IDENTITY
        } else {
            geometry.world_matrix()
        };
        self.set_world_matrix(world);

        let single_target_index = self
            .backend
            .current_frame_buffer()
            .filter(|fb| !fb.is_multi_target())
            .map(|fb| fb.target_index());
        if let Some(index) = single_target_index {
            self.overrides.update_bound_draw_buffer(index as i32);
        }

        let result = material.read().render(geometry, lights, self);

        self.backend.pop_debug_group();
        result
    }

    /// Render every geometry of `list` in list order.
    pub fn render_geometry_list(&mut self, list: &GeometryList) -> RenderResult<()> {
        for geometry in list.iter() {
            self.render_geometry(geometry)?;
        }
        Ok(())
    }
}
