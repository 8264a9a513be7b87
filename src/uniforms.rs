//! Per-draw uniform bindings.
//!
//! [`UniformBindings`] accumulates the world, camera, and viewport state set
//! by the render manager and exposes it as a GPU-ready [`FrameUniforms`]
//! block. The block carries a frame counter that advances once per
//! [`RenderManager::render`](crate::RenderManager::render) call.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Uniform data uploaded before each draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniforms {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub world_view_projection: Mat4,
    /// x, y, width, height in pixels
    pub viewport: Vec4,
    /// xyz = camera position, w = 1
    pub camera_position: Vec4,
    /// x = frame index (wrapping), yzw unused
    pub frame: [u32; 4],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            world_view_projection: Mat4::IDENTITY,
            viewport: Vec4::ZERO,
            camera_position: Vec4::W,
            frame: [0; 4],
        }
    }
}

/// Tracks the uniform state shared by every material draw.
#[derive(Debug, Default)]
pub struct UniformBindings {
    data: FrameUniforms,
    frame_index: u64,
}

impl UniformBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the frame epoch.
    pub fn new_frame(&mut self) {
        self.frame_index += 1;
        self.data.frame[0] = self.frame_index as u32;
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.data.world = world;
        self.data.world_view_projection = self.data.view_projection * world;
    }

    pub fn set_camera(
        &mut self,
        position: Vec3,
        view: Mat4,
        projection: Mat4,
        view_projection: Mat4,
    ) {
        self.data.view = view;
        self.data.projection = projection;
        self.data.view_projection = view_projection;
        self.data.world_view_projection = view_projection * self.data.world;
        self.data.camera_position = position.extend(1.0);
    }

    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.data.viewport = Vec4::new(x as f32, y as f32, width as f32, height as f32);
    }

    pub fn data(&self) -> &FrameUniforms {
        &self.data
    }

    /// Raw bytes of the uniform block, ready for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.data)
    }
}
