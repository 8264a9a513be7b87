//! Mesh data uploaded during scene preloading.

use std::sync::Arc;

/// Semantic of a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexBufferKind {
    Position,
    Normal,
    Tangent,
    TexCoord,
    Color,
    Index,
}

/// How a buffer is expected to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
    Stream,
    /// Never uploaded to the GPU.
    CpuOnly,
}

/// A single vertex attribute or index stream.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    kind: VertexBufferKind,
    usage: BufferUsage,
    data: Option<Arc<[u8]>>,
}

impl VertexBuffer {
    pub fn new(kind: VertexBufferKind) -> Self {
        Self {
            kind,
            usage: BufferUsage::Static,
            data: None,
        }
    }

    pub fn with_usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_data(mut self, data: impl Into<Arc<[u8]>>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn kind(&self) -> VertexBufferKind {
        self.kind
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Whether preloading should push this buffer to the device.
    pub fn needs_upload(&self) -> bool {
        self.data.is_some() && self.usage != BufferUsage::CpuOnly
    }
}

/// Vertex and index buffers of a geometry.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    buffers: Vec<VertexBuffer>,
    vertex_count: u32,
    triangle_count: u32,
}

impl Mesh {
    pub fn new(vertex_count: u32, triangle_count: u32) -> Self {
        Self {
            buffers: Vec::new(),
            vertex_count,
            triangle_count,
        }
    }

    pub fn with_buffer(mut self, buffer: VertexBuffer) -> Self {
        self.buffers.push(buffer);
        self
    }

    pub fn buffers(&self) -> &[VertexBuffer] {
        &self.buffers
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }

    /// A mesh with no vertices or no triangles draws nothing.
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0 || self.triangle_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_upload() {
        let empty = VertexBuffer::new(VertexBufferKind::Position);
        assert!(!empty.needs_upload());

        let cpu = VertexBuffer::new(VertexBufferKind::Position)
            .with_usage(BufferUsage::CpuOnly)
            .with_data(vec![0u8; 12]);
        assert!(!cpu.needs_upload());

        let gpu = VertexBuffer::new(VertexBufferKind::Normal).with_data(vec![0u8; 12]);
        assert!(gpu.needs_upload());
        assert_eq!(gpu.data().map(<[u8]>::len), Some(12));
    }

    #[test]
    fn test_mesh_is_empty() {
        assert!(Mesh::new(0, 4).is_empty());
        assert!(Mesh::new(3, 0).is_empty());
        assert!(!Mesh::new(3, 1).is_empty());
    }
}
