//! Common types shared between backends

/// Description of an off-screen render target.
///
/// The backend owns the actual attachments; the render manager only needs to
/// know which one is bound and whether the driver can write several of them
/// in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    name: String,
    width: u32,
    height: u32,
    target_index: u32,
    multi_target: bool,
}

impl FrameBuffer {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            target_index: 0,
            multi_target: false,
        }
    }

    pub fn with_target_index(mut self, index: u32) -> Self {
        self.target_index = index;
        self
    }

    pub fn with_multi_target(mut self, multi_target: bool) -> Self {
        self.multi_target = multi_target;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Index of the color attachment written by single-target passes.
    pub fn target_index(&self) -> u32 {
        self.target_index
    }

    /// Whether all color attachments are written at once.
    pub fn is_multi_target(&self) -> bool {
        self.multi_target
    }
}
