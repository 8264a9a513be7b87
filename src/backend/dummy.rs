//! Dummy backend for testing and headless runs.
//!
//! This backend doesn't perform any GPU operations. It reports itself as a
//! null backend, so the render manager skips frame rendering entirely, but
//! every call is still valid and traced for debugging.

use glam::Vec4;

use super::{BackendResult, FrameBuffer, RenderBackend};
use crate::resources::VertexBuffer;
use crate::uniforms::FrameUniforms;

/// No-op render backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    frame_buffer: Option<FrameBuffer>,
    debug_depth: usize,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth of debug groups.
    pub fn debug_depth(&self) -> usize {
        self.debug_depth
    }
}

impl RenderBackend for DummyBackend {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn is_null(&self) -> bool {
        true
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        log::trace!("DummyBackend: set_viewport ({x}, {y}, {width}x{height})");
    }

    fn set_clip_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        log::trace!("DummyBackend: set_clip_rect ({x}, {y}, {width}x{height})");
    }

    fn set_depth_range(&mut self, start: f32, end: f32) {
        log::trace!("DummyBackend: set_depth_range [{start}, {end}]");
    }

    fn set_frame_buffer(&mut self, frame_buffer: Option<&FrameBuffer>) {
        log::trace!(
            "DummyBackend: set_frame_buffer {:?}",
            frame_buffer.map(FrameBuffer::name)
        );
        self.frame_buffer = frame_buffer.cloned();
    }

    fn current_frame_buffer(&self) -> Option<&FrameBuffer> {
        self.frame_buffer.as_ref()
    }

    fn set_background_color(&mut self, color: Vec4) {
        log::trace!("DummyBackend: set_background_color {color}");
    }

    fn clear_buffers(&mut self, color: bool, depth: bool, stencil: bool) {
        log::trace!("DummyBackend: clear_buffers color={color} depth={depth} stencil={stencil}");
    }

    fn push_debug_group(&mut self, name: &str) {
        log::trace!("DummyBackend: push_debug_group {name}");
        self.debug_depth += 1;
    }

    fn pop_debug_group(&mut self) {
        log::trace!("DummyBackend: pop_debug_group");
        self.debug_depth = self.debug_depth.saturating_sub(1);
    }

    fn update_buffer_data(&mut self, buffer: &VertexBuffer) -> BackendResult<()> {
        log::trace!(
            "DummyBackend: update_buffer_data {:?} ({} bytes)",
            buffer.kind(),
            buffer.data().map_or(0, <[u8]>::len)
        );
        Ok(())
    }

    fn set_alpha_to_coverage(&mut self, enabled: bool) {
        log::trace!("DummyBackend: set_alpha_to_coverage {enabled}");
    }

    fn set_uniforms(&mut self, uniforms: &FrameUniforms) {
        log::trace!("DummyBackend: set_uniforms frame={}", uniforms.frame[0]);
    }
}
