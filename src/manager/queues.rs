//! Bucket flushing with per-bucket depth range policy.

use std::sync::Arc;

use super::RenderManager;
use crate::error::RenderResult;
use crate::profiling::VpStep;
use crate::queue::Bucket;
use crate::scene::SharedCamera;
use crate::viewport::ViewPort;

impl RenderManager {
    /// Render the opaque, sky, transparent and GUI buckets of `vp`, in that
    /// order.
    ///
    /// The sky is drawn at the far plane and the GUI at the near plane with
    /// an orthographic projection. The depth range is back at `[0, 1]` when
    /// this returns. With `flush`, each bucket is cleared after rendering.
    /// The translucent bucket is left alone, see
    /// [`RenderManager::render_translucent_queue`].
    pub fn render_view_port_queues(&mut self, vp: &mut ViewPort, flush: bool) -> RenderResult<()> {
        let camera = Arc::clone(vp.camera());
        let mut depth_range_changed = false;
        let result = self.render_buckets(vp, &camera, flush, &mut depth_range_changed);
        if depth_range_changed {
            self.backend.set_depth_range(0.0, 1.0);
        }
        result
    }

    fn render_buckets(
        &mut self,
        vp: &mut ViewPort,
        camera: &SharedCamera,
        flush: bool,
        depth_range_changed: &mut bool,
    ) -> RenderResult<()> {
        // Opaque is rendered at the default depth range.
        self.vp_step(VpStep::RenderBucket, vp, Some(Bucket::Opaque));
        vp.queue_mut().render_queue(Bucket::Opaque, self, camera, flush)?;

        if !vp.queue().is_queue_empty(Bucket::Sky) {
            self.vp_step(VpStep::RenderBucket, vp, Some(Bucket::Sky));
            self.backend.set_depth_range(1.0, 1.0);
            *depth_range_changed = true;
            vp.queue_mut().render_queue(Bucket::Sky, self, camera, flush)?;
        }

        if !vp.queue().is_queue_empty(Bucket::Transparent) {
            self.vp_step(VpStep::RenderBucket, vp, Some(Bucket::Transparent));
            if *depth_range_changed {
                self.backend.set_depth_range(0.0, 1.0);
                *depth_range_changed = false;
            }
            vp.queue_mut().render_queue(Bucket::Transparent, self, camera, flush)?;
        }

        if !vp.queue().is_queue_empty(Bucket::Gui) {
            self.vp_step(VpStep::RenderBucket, vp, Some(Bucket::Gui));
            self.backend.set_depth_range(0.0, 0.0);
            *depth_range_changed = true;
            self.set_camera(camera, true);
            let result = vp.queue_mut().render_queue(Bucket::Gui, self, camera, flush);
            self.set_camera(camera, false);
            result?;
        }
        Ok(())
    }

    /// Render and clear the translucent bucket of `vp`.
    ///
    /// Does nothing when translucent handling is disabled, leaving the bucket
    /// to a post-processing stage.
    pub fn render_translucent_queue(&mut self, vp: &mut ViewPort) -> RenderResult<()> {
        if !self.handle_translucent_bucket || vp.queue().is_queue_empty(Bucket::Translucent) {
            return Ok(());
        }
        self.vp_step(VpStep::RenderBucket, vp, Some(Bucket::Translucent));
        let camera = Arc::clone(vp.camera());
        vp.queue_mut().render_queue(Bucket::Translucent, self, &camera, true)
    }

    /// Render and clear the queue of `vp`.
    pub fn flush_queue(&mut self, vp: &mut ViewPort) -> RenderResult<()> {
        self.render_view_port_queues(vp, true)
    }

    /// Clear the queue of `vp` and forget the lights used so far.
    pub fn clear_queue(&mut self, vp: &mut ViewPort) {
        vp.queue_mut().clear();
        self.lights_in_use.clear();
    }

    /// Render the scenes of `vp` without processors or a pipeline.
    pub fn render_view_port_raw(&mut self, vp: &mut ViewPort) -> RenderResult<()> {
        let camera = Arc::clone(vp.camera());
        self.set_camera(&camera, false);
        let scenes = vp.scenes().to_vec();
        for scene in scenes.iter().rev() {
            self.render_scene(scene, vp)?;
        }
        self.flush_queue(vp)
    }
}
