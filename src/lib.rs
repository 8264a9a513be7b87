//! RedLilium Render - per-frame render orchestration
//!
//! The [`RenderManager`] sits between a scene graph and a graphics backend.
//! Each frame it:
//! - Walks the pre, main and post viewports in registration order
//! - Hands every viewport to its [`RenderPipeline`] with a cached
//!   [`PipelineContext`]
//! - Flattens attached scenes into per-viewport render queues, culling
//!   subtrees outside the camera frustum
//! - Flushes the queue bucket by bucket with the right depth range and
//!   projection
//! - Resolves forced techniques, materials and render states before
//!   delegating each draw to a [`Material`]
//!
//! # Example
//!
//! ```
//! use redlilium_render::{Camera, DummyBackend, RenderManager};
//!
//! let mut rm = RenderManager::new(Box::new(DummyBackend::new()));
//! let camera = Camera::new(1280, 720).shared();
//! let _main = rm.create_main_view("main", camera);
//! rm.render(1.0 / 60.0, true).unwrap();
//! ```

pub mod backend;
pub mod error;
pub mod manager;
pub mod pipeline;
pub mod profiling;
pub mod queue;
pub mod resources;
pub mod scene;
pub mod uniforms;
pub mod viewport;

pub use backend::{BackendError, DummyBackend, FrameBuffer, RenderBackend};
pub use error::{RenderError, RenderResult};
pub use manager::{RenderManager, RenderManagerConfig, RenderStatistics, BOUND_DRAW_BUFFER};
pub use pipeline::{
    shared_pipeline, DefaultPipelineContext, ForwardPipeline, PipelineContext, RenderPipeline,
    SharedContext, SharedPipeline,
};
pub use queue::{Bucket, RenderQueue, ShadowMode};
pub use resources::{shared_material, Material, RenderState, SharedMaterial};
pub use scene::{Camera, Geometry, Light, LightList, Node, SharedCamera, Spatial};
pub use viewport::{SharedViewPort, ViewPort, ViewPortGroup};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the crate version. Call once after installing a logger.
pub fn init() {
    log::info!("RedLilium Render v{}", VERSION);
}
