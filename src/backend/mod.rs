//! Backend abstraction layer
//!
//! The render manager drives a low-level graphics backend through the
//! [`RenderBackend`] trait. Concrete GPU drivers live outside this crate;
//! [`DummyBackend`] is a no-op implementation used when no device is present.

mod dummy;
mod traits;
mod types;

pub use dummy::DummyBackend;
pub use traits::*;
pub use types::*;
