//! Resource descriptions consumed by the render manager
//!
//! Materials decide how a geometry is drawn; meshes carry the vertex data
//! uploaded when a scene is preloaded.

mod material;
mod mesh;

pub use material::*;
pub use mesh::*;
