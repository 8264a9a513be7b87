//! Scene graph types consumed by the render manager
//!
//! Cameras, bounds, lights, and the node/geometry tree that
//! [`RenderManager::render_scene`](crate::RenderManager::render_scene)
//! flattens into render queues.

mod bounds;
mod camera;
mod light;
mod spatial;

pub use bounds::*;
pub use camera::*;
pub use light::*;
pub use spatial::*;
