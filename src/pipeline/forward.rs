//! Forward rendering pipeline
//!
//! Renders a viewport in one pass per bucket:
//! 1. Scene processors prepare the frame
//! 2. Attached scenes are flattened into the render queue
//! 3. Opaque, sky, transparent and GUI buckets are flushed
//! 4. Scene processors post-process the output
//! 5. The translucent bucket is drawn on top

use super::context::{DefaultPipelineContext, PipelineContext, SharedContext};
use super::RenderPipeline;
use crate::error::RenderResult;
use crate::manager::RenderManager;
use crate::profiling::VpStep;
use crate::viewport::ViewPort;

/// The pipeline used for viewports without a pipeline of their own.
#[derive(Debug, Default)]
pub struct ForwardPipeline {
    rendered: bool,
}

impl ForwardPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_passes(
        &mut self,
        rm: &mut RenderManager,
        vp: &mut ViewPort,
        tpf: f32,
    ) -> RenderResult<()> {
        let processors = vp.processors().to_vec();

        rm.vp_step(VpStep::BeginRender, vp, None);
        for processor in &processors {
            let mut processor = processor.lock();
            if !processor.is_initialized() {
                processor.initialize(rm, vp);
            }
            processor.pre_frame(tpf);
        }

        rm.apply_view_port(vp);

        rm.vp_step(VpStep::RenderScene, vp, None);
        // Scenes attached last are queued first.
        let scenes = vp.scenes().to_vec();
        for scene in scenes.iter().rev() {
            rm.render_scene(scene, vp)?;
        }

        if !processors.is_empty() {
            rm.vp_step(VpStep::PostQueue, vp, None);
            for processor in &processors {
                processor.lock().post_queue(vp.queue_mut());
            }
        }

        rm.vp_step(VpStep::FlushQueue, vp, None);
        rm.flush_queue(vp)?;

        if !processors.is_empty() {
            rm.vp_step(VpStep::PostFrame, vp, None);
            for processor in &processors {
                processor.lock().post_frame(rm, vp.output_frame_buffer());
            }
            rm.vp_step(VpStep::ProcEndRender, vp, None);
        }

        rm.render_translucent_queue(vp)?;
        rm.clear_queue(vp);

        self.rendered = true;
        rm.vp_step(VpStep::EndRender, vp, None);
        Ok(())
    }
}

impl RenderPipeline for ForwardPipeline {
    fn name(&self) -> &str {
        "Forward"
    }

    fn fetch_pipeline_context(&self, rm: &mut RenderManager) -> RenderResult<SharedContext> {
        let context: SharedContext =
            rm.get_or_create_context(|_| Some(DefaultPipelineContext::new()))?;
        Ok(context)
    }

    fn has_rendered_this_frame(&self) -> bool {
        self.rendered
    }

    fn start_render_frame(&mut self, _rm: &mut RenderManager) {}

    fn pipeline_render(
        &mut self,
        rm: &mut RenderManager,
        _context: &mut dyn PipelineContext,
        vp: &mut ViewPort,
        tpf: f32,
    ) -> RenderResult<()> {
        let result = self.render_passes(rm, vp, tpf);
        if result.is_err() {
            // A partially filled queue must not leak into the next frame.
            rm.clear_queue(vp);
        }
        result
    }

    fn end_render_frame(&mut self, _rm: &mut RenderManager) {
        self.rendered = false;
    }
}
