//! Scene flattening and preloading.

use std::sync::Arc;

use super::RenderManager;
use crate::error::{RenderError, RenderResult};
use crate::queue::ShadowMode;
use crate::scene::Spatial;
use crate::viewport::ViewPort;

impl RenderManager {
    /// Flatten `scene` into the render queue of `vp`.
    ///
    /// Subtrees outside the camera frustum are skipped entirely, including
    /// their render controls. Every visible geometry is queued into its
    /// bucket and, when it casts or receives shadows, the shadow queue.
    pub fn render_scene(&mut self, scene: &Spatial, vp: &mut ViewPort) -> RenderResult<()> {
        vp.camera().write().set_plane_state(0);
        self.render_sub_scene(scene, vp, 0)
    }

    /// `plane_state` is the frustum state accepted by the parent; each child
    /// starts from it regardless of what its siblings accepted.
    fn render_sub_scene(
        &mut self,
        scene: &Spatial,
        vp: &mut ViewPort,
        plane_state: u32,
    ) -> RenderResult<()> {
        let (visible, plane_state) = {
            let mut camera = vp.camera().write();
            camera.set_plane_state(plane_state);
            let visible = scene.check_culling(&mut camera);
            (visible, camera.plane_state())
        };
        if !visible {
            return Ok(());
        }

        scene.run_control_render(self, vp);

        match scene {
            Spatial::Node(node) => {
                for child in node.children() {
                    self.render_sub_scene(child, vp, plane_state)?;
                }
            }
            Spatial::Geometry(geometry) => {
                if geometry.material().is_none() {
                    return Err(RenderError::MissingMaterial {
                        geometry: geometry.name().to_string(),
                    });
                }
                let queue = vp.queue_mut();
                queue.add_to_queue(Arc::clone(geometry), geometry.bucket());
                if geometry.shadow_mode() != ShadowMode::Off {
                    queue.add_to_shadow_queue(Arc::clone(geometry), geometry.shadow_mode());
                }
            }
        }
        Ok(())
    }

    /// Warm up every material in `scene` and upload its mesh data.
    ///
    /// Culling is ignored. Buffers marked CPU-only, without data, or
    /// belonging to empty meshes are not uploaded.
    pub fn preload_scene(&mut self, scene: &Spatial) -> RenderResult<()> {
        match scene {
            Spatial::Node(node) => {
                for child in node.children() {
                    self.preload_scene(child)?;
                }
            }
            Spatial::Geometry(geometry) => {
                let material = geometry
                    .material()
                    .cloned()
                    .ok_or_else(|| RenderError::MissingMaterial {
                        geometry: geometry.name().to_string(),
                    })?;
                material.read().preload(self, geometry)?;

                if let Some(mesh) = geometry.mesh().filter(|mesh| !mesh.is_empty()) {
                    for buffer in mesh.buffers().iter().filter(|b| b.needs_upload()) {
                        self.backend.update_buffer_data(buffer)?;
                    }
                }
            }
        }
        Ok(())
    }
}
