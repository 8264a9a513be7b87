//! Core backend abstraction traits
//!
//! These traits define the interface a graphics driver must implement to be
//! driven by the render manager.

use glam::Vec4;
use thiserror::Error;

use crate::backend::types::FrameBuffer;
use crate::resources::VertexBuffer;
use crate::uniforms::FrameUniforms;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to upload buffer data: {0}")]
    BufferUploadFailed(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Low-level graphics driver consumed by the render manager.
///
/// Every call is treated as synchronous. Device-level failures that cannot be
/// reported through [`BackendResult`] must be handled by the implementation.
pub trait RenderBackend: Send + Sync {
    /// Human readable backend name.
    fn name(&self) -> &str;

    /// Returns `true` for a backend that performs no rendering at all.
    ///
    /// The render manager skips whole frames when this is set.
    fn is_null(&self) -> bool {
        false
    }

    /// Set the pixel-space viewport rectangle.
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Set the pixel-space clip (scissor) rectangle.
    fn set_clip_rect(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Set the depth range used to map normalized depth into the depth buffer.
    fn set_depth_range(&mut self, start: f32, end: f32);

    /// Bind a frame buffer, or the main framebuffer when `None`.
    fn set_frame_buffer(&mut self, frame_buffer: Option<&FrameBuffer>);

    /// The currently bound frame buffer, `None` for the main framebuffer.
    fn current_frame_buffer(&self) -> Option<&FrameBuffer>;

    /// Set the color used by [`RenderBackend::clear_buffers`].
    fn set_background_color(&mut self, color: Vec4);

    /// Clear the selected buffers of the bound frame buffer.
    fn clear_buffers(&mut self, color: bool, depth: bool, stencil: bool);

    /// Open a named debug group for graphics debuggers.
    fn push_debug_group(&mut self, name: &str);

    /// Close the innermost debug group.
    fn pop_debug_group(&mut self);

    /// Upload a vertex buffer's CPU data to the device.
    fn update_buffer_data(&mut self, buffer: &VertexBuffer) -> BackendResult<()>;

    /// Enable or disable alpha-to-coverage.
    fn set_alpha_to_coverage(&mut self, enabled: bool);

    /// Upload the per-draw uniform block.
    fn set_uniforms(&mut self, uniforms: &FrameUniforms);
}
