//! Frame driver: viewport iteration, pipeline and context lifecycles.

use std::any::type_name;
use std::sync::Arc;

use parking_lot::Mutex;

use super::RenderManager;
use crate::error::{RenderError, RenderResult};
use crate::pipeline::{PipelineContext, SharedContext};
use crate::profiling::AppStep;
use crate::viewport::{SharedViewPort, ViewPort, ViewPortGroup};

impl RenderManager {
    /// Render every viewport, pre then main then post.
    ///
    /// Viewports without an output frame buffer are skipped unless
    /// `main_frame_buffer_active` is set. Pipelines and contexts used during
    /// the frame get their end-of-frame call exactly once, even when a
    /// viewport fails to render. Null backends skip the frame entirely.
    pub fn render(&mut self, tpf: f32, main_frame_buffer_active: bool) -> RenderResult<()> {
        if self.backend.is_null() {
            log::trace!("Null backend, skipping frame");
            return Ok(());
        }

        self.uniforms.new_frame();
        self.statistics.clear_frame();

        let result = self.render_groups(tpf, main_frame_buffer_active);

        self.app_step(AppStep::EndFrame);
        for context in std::mem::take(&mut self.used_contexts) {
            context.lock().end_context_render_frame(self);
        }
        for pipeline in std::mem::take(&mut self.used_pipelines) {
            pipeline.lock().end_render_frame(self);
        }

        if let Err(err) = &result {
            log::error!("Frame {} failed: {}", self.uniforms.frame_index(), err);
        }
        result
    }

    fn render_groups(&mut self, tpf: f32, main_frame_buffer_active: bool) -> RenderResult<()> {
        for group in ViewPortGroup::ORDER {
            self.app_step(match group {
                ViewPortGroup::Pre => AppStep::RenderPreviewViewPorts,
                ViewPortGroup::Main => AppStep::RenderMainViewPorts,
                ViewPortGroup::Post => AppStep::RenderPostViewPorts,
            });

            let views = self.views(group).to_vec();
            for vp in &views {
                if vp.read().output_frame_buffer().is_none() && !main_frame_buffer_active {
                    continue;
                }
                self.render_view_port(vp, tpf)?;
            }
        }
        Ok(())
    }

    /// Render a single viewport with its pipeline, or the default one.
    pub fn render_view_port(&mut self, vp: &SharedViewPort, tpf: f32) -> RenderResult<()> {
        let mut vp = vp.write();
        if !vp.is_enabled() {
            log::trace!("Viewport '{}' is disabled", vp.name());
            return Ok(());
        }

        let pipeline = vp
            .pipeline()
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_pipeline));
        let mut pipeline_guard = pipeline.lock();

        let context = pipeline_guard.fetch_pipeline_context(self).map_err(|err| {
            log::error!(
                "Pipeline '{}' failed to fetch its context: {}",
                pipeline_guard.name(),
                err
            );
            err
        })?;
        let mut context_guard = context.lock();

        let already_active = context_guard.start_view_port_render(self, &vp);
        if !already_active && !self.used_contexts.iter().any(|c| Arc::ptr_eq(c, &context)) {
            self.used_contexts.push(Arc::clone(&context));
        }

        if !pipeline_guard.has_rendered_this_frame()
            && !self.used_pipelines.iter().any(|p| Arc::ptr_eq(p, &pipeline))
        {
            self.used_pipelines.push(Arc::clone(&pipeline));
            pipeline_guard.start_render_frame(self);
        }

        let result = pipeline_guard.pipeline_render(self, &mut *context_guard, &mut vp, tpf);
        context_guard.end_view_port_render(self, &vp);
        result
    }

    /// Bind the output of `vp`, apply its camera, and clear the requested
    /// buffers.
    pub fn apply_view_port(&mut self, vp: &ViewPort) {
        self.backend.set_frame_buffer(vp.output_frame_buffer());
        self.set_camera(vp.camera(), false);
        if vp.is_clear_color() || vp.is_clear_depth() || vp.is_clear_stencil() {
            if vp.is_clear_color() {
                self.backend.set_background_color(vp.background_color());
            }
            self.backend
                .clear_buffers(vp.is_clear_color(), vp.is_clear_depth(), vp.is_clear_stencil());
        }
    }

    /// Propagate a new on-screen resolution.
    ///
    /// Cameras of viewports rendering to the main framebuffer are resized.
    /// Scene processors are reshaped, or initialized if they never were.
    pub fn notify_reshape(&mut self, width: u32, height: u32) {
        log::debug!("Reshape to {width}x{height}");
        for group in ViewPortGroup::ORDER {
            for vp in self.views(group).to_vec() {
                let vp = vp.read();
                if vp.output_frame_buffer().is_none() {
                    vp.camera().write().resize(width, height, true);
                }
                for processor in vp.processors().to_vec() {
                    let mut processor = processor.lock();
                    if !processor.is_initialized() {
                        processor.initialize(self, &vp);
                    } else {
                        processor.reshape(&vp, width, height);
                    }
                }
            }
        }
    }

    /// Propagate a new display scale to every scene processor.
    pub fn notify_rescale(&mut self, x: f32, y: f32) {
        log::debug!("Rescale to {x}x{y}");
        for group in ViewPortGroup::ORDER {
            for vp in self.views(group).to_vec() {
                let vp = vp.read();
                for processor in vp.processors().to_vec() {
                    let mut processor = processor.lock();
                    if !processor.is_initialized() {
                        processor.initialize(self, &vp);
                    } else {
                        processor.rescale(&vp, x, y);
                    }
                }
            }
        }
    }

    // ---- Pipeline contexts ----

    /// The registered context of type `T`.
    pub fn get_context<T: PipelineContext + 'static>(&self) -> Option<Arc<Mutex<T>>> {
        self.contexts.get::<T>()
    }

    /// The registered context of type `T`, created with `factory` if absent.
    ///
    /// A factory returning `None` is reported as
    /// [`RenderError::ContextCreationFailed`].
    pub fn get_or_create_context<T, F>(&mut self, factory: F) -> RenderResult<Arc<Mutex<T>>>
    where
        T: PipelineContext + 'static,
        F: FnOnce(&mut Self) -> Option<T>,
    {
        if let Some(context) = self.contexts.get::<T>() {
            return Ok(context);
        }
        let context = factory(self).ok_or(RenderError::ContextCreationFailed {
            context: type_name::<T>(),
        })?;
        Ok(self.register_context(context))
    }

    /// Register a context, replacing any previous context of the same type.
    pub fn register_context<T: PipelineContext + 'static>(&mut self, context: T) -> Arc<Mutex<T>> {
        self.contexts.register(context)
    }

    /// The registered context of type `T` as a trait object.
    pub fn get_shared_context<T: PipelineContext + 'static>(&self) -> Option<SharedContext> {
        self.contexts.get_shared::<T>()
    }
}
