//! Render pipelines
//!
//! A [`RenderPipeline`] renders one viewport per call, using a
//! [`PipelineContext`] the render manager caches by type. Pipelines carry a
//! per-frame "rendered" flag: the render manager fires
//! [`RenderPipeline::start_render_frame`] for a pipeline the first time it is
//! used in a frame and [`RenderPipeline::end_render_frame`] once the frame is
//! done, no matter how many viewports shared it.

pub mod context;
pub mod forward;

pub use context::{ContextRegistry, DefaultPipelineContext, PipelineContext, SharedContext};
pub use forward::ForwardPipeline;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::RenderResult;
use crate::manager::RenderManager;
use crate::viewport::ViewPort;

/// A pipeline shared between viewports.
pub type SharedPipeline = Arc<Mutex<dyn RenderPipeline>>;

/// Wrap a pipeline for sharing between viewports.
pub fn shared_pipeline<P: RenderPipeline + 'static>(pipeline: P) -> SharedPipeline {
    Arc::new(Mutex::new(pipeline))
}

/// Strategy producing a rendered frame for a viewport.
pub trait RenderPipeline: Send + Sync {
    fn name(&self) -> &str;

    /// Resolve the context this pipeline renders with, typically via
    /// [`RenderManager::get_or_create_context`].
    fn fetch_pipeline_context(&self, rm: &mut RenderManager) -> RenderResult<SharedContext>;

    /// Whether a viewport was rendered with this pipeline this frame.
    fn has_rendered_this_frame(&self) -> bool;

    /// Called before the first viewport of a frame is rendered.
    fn start_render_frame(&mut self, rm: &mut RenderManager);

    /// Render a viewport.
    fn pipeline_render(
        &mut self,
        rm: &mut RenderManager,
        context: &mut dyn PipelineContext,
        vp: &mut ViewPort,
        tpf: f32,
    ) -> RenderResult<()>;

    /// Called once at the end of every frame the pipeline was used in.
    /// Must reset the "rendered this frame" flag.
    fn end_render_frame(&mut self, rm: &mut RenderManager);
}
