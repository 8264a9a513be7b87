//! Frame profiling hooks.

use crate::queue::Bucket;
use crate::viewport::ViewPort;

/// Application-level frame phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppStep {
    RenderPreviewViewPorts,
    RenderMainViewPorts,
    RenderPostViewPorts,
    EndFrame,
}

/// Phases of a single viewport render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VpStep {
    BeginRender,
    RenderScene,
    PostQueue,
    FlushQueue,
    PostFrame,
    /// Issued once per rendered bucket together with the bucket.
    RenderBucket,
    ProcEndRender,
    EndRender,
}

/// Receives timing markers from the render manager.
pub trait AppProfiler: Send + Sync {
    fn app_step(&mut self, step: AppStep);

    fn vp_step(&mut self, step: VpStep, vp: &ViewPort, bucket: Option<Bucket>);
}
