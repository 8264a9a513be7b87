//! Viewports and the registries that order them
//!
//! A [`ViewPort`] binds a camera to an optional output frame buffer and owns
//! the render queue its scenes are flattened into. The render manager keeps
//! three [`ViewPortRegistry`] lists, rendered pre, main, then post.

use std::sync::Arc;

use glam::Vec4;
use parking_lot::{Mutex, RwLock};

use crate::backend::FrameBuffer;
use crate::manager::RenderManager;
use crate::pipeline::SharedPipeline;
use crate::queue::RenderQueue;
use crate::scene::{SharedCamera, Spatial};

/// A viewport shared between the render manager and the application.
pub type SharedViewPort = Arc<RwLock<ViewPort>>;

/// A scene processor shared between viewports.
pub type SharedProcessor = Arc<Mutex<dyn SceneProcessor>>;

/// Wrap a processor for attaching to viewports.
pub fn shared_processor<P: SceneProcessor + 'static>(processor: P) -> SharedProcessor {
    Arc::new(Mutex::new(processor))
}

/// Extension point running around a viewport's scene rendering, e.g. shadow
/// map generation or post-processing.
pub trait SceneProcessor: Send + Sync {
    /// Called once before first use, either on the first frame or on the
    /// first reshape/rescale notification.
    fn initialize(&mut self, rm: &mut RenderManager, vp: &ViewPort);

    fn is_initialized(&self) -> bool;

    /// The output resolution changed.
    fn reshape(&mut self, vp: &ViewPort, width: u32, height: u32);

    /// The display scale changed.
    fn rescale(&mut self, _vp: &ViewPort, _x: f32, _y: f32) {}

    /// Called before the viewport's scenes are queued.
    fn pre_frame(&mut self, tpf: f32);

    /// Called after queuing, before the queue is flushed.
    fn post_queue(&mut self, queue: &mut RenderQueue);

    /// Called after the opaque, sky, transparent and GUI buckets are drawn.
    fn post_frame(&mut self, rm: &mut RenderManager, output: Option<&FrameBuffer>);

    /// Called when the processor is removed from its viewport.
    fn cleanup(&mut self);
}

/// A camera, an output target, and the scenes rendered into it.
pub struct ViewPort {
    name: String,
    camera: SharedCamera,
    queue: RenderQueue,
    output_frame_buffer: Option<FrameBuffer>,
    background_color: Vec4,
    clear_color: bool,
    clear_depth: bool,
    clear_stencil: bool,
    enabled: bool,
    scenes: Vec<Spatial>,
    processors: Vec<SharedProcessor>,
    pipeline: Option<SharedPipeline>,
}

impl ViewPort {
    pub fn new(name: impl Into<String>, camera: SharedCamera) -> Self {
        Self {
            name: name.into(),
            camera,
            queue: RenderQueue::new(),
            output_frame_buffer: None,
            background_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            clear_color: false,
            clear_depth: false,
            clear_stencil: false,
            enabled: true,
            scenes: Vec::new(),
            processors: Vec::new(),
            pipeline: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut RenderQueue {
        &mut self.queue
    }

    /// Target frame buffer, `None` when rendering to the main framebuffer.
    pub fn output_frame_buffer(&self) -> Option<&FrameBuffer> {
        self.output_frame_buffer.as_ref()
    }

    pub fn set_output_frame_buffer(&mut self, frame_buffer: Option<FrameBuffer>) {
        self.output_frame_buffer = frame_buffer;
    }

    pub fn background_color(&self) -> Vec4 {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Vec4) {
        self.background_color = color;
    }

    /// Choose which buffers are cleared before the viewport is drawn.
    pub fn set_clear_flags(&mut self, color: bool, depth: bool, stencil: bool) {
        self.clear_color = color;
        self.clear_depth = depth;
        self.clear_stencil = stencil;
    }

    pub fn is_clear_color(&self) -> bool {
        self.clear_color
    }

    pub fn is_clear_depth(&self) -> bool {
        self.clear_depth
    }

    pub fn is_clear_stencil(&self) -> bool {
        self.clear_stencil
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn attach_scene(&mut self, scene: impl Into<Spatial>) {
        self.scenes.push(scene.into());
    }

    /// Returns `true` if the scene was attached.
    pub fn detach_scene(&mut self, scene: &Spatial) -> bool {
        match self.scenes.iter().position(|s| s.ptr_eq(scene)) {
            Some(index) => {
                self.scenes.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear_scenes(&mut self) {
        self.scenes.clear();
    }

    pub fn scenes(&self) -> &[Spatial] {
        &self.scenes
    }

    pub fn add_processor(&mut self, processor: SharedProcessor) {
        self.processors.push(processor);
    }

    /// Detach a processor and let it release its resources.
    pub fn remove_processor(&mut self, processor: &SharedProcessor) -> bool {
        match self.processors.iter().position(|p| Arc::ptr_eq(p, processor)) {
            Some(index) => {
                self.processors.remove(index).lock().cleanup();
                true
            }
            None => false,
        }
    }

    pub fn clear_processors(&mut self) {
        for processor in self.processors.drain(..) {
            processor.lock().cleanup();
        }
    }

    pub fn processors(&self) -> &[SharedProcessor] {
        &self.processors
    }

    /// Pipeline used instead of the render manager's default one.
    pub fn pipeline(&self) -> Option<&SharedPipeline> {
        self.pipeline.as_ref()
    }

    pub fn set_pipeline(&mut self, pipeline: Option<SharedPipeline>) {
        self.pipeline = pipeline;
    }
}

impl std::fmt::Debug for ViewPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewPort")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("output_frame_buffer", &self.output_frame_buffer)
            .field("scenes", &self.scenes.len())
            .field("processors", &self.processors.len())
            .finish_non_exhaustive()
    }
}

/// Render order group of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewPortGroup {
    /// Rendered before the main viewports, e.g. into render-to-texture targets.
    Pre,
    Main,
    /// Rendered last, e.g. GUI overlays.
    Post,
}

impl ViewPortGroup {
    /// Groups in render order.
    pub const ORDER: [ViewPortGroup; 3] =
        [ViewPortGroup::Pre, ViewPortGroup::Main, ViewPortGroup::Post];
}

/// Ordered list of viewports belonging to one group.
///
/// Names are kept beside the handles so lookups never lock a viewport. A
/// viewport is write-locked while it renders and its callbacks may reach
/// back into the registry.
#[derive(Debug, Default)]
pub struct ViewPortRegistry {
    names: Vec<String>,
    views: Vec<SharedViewPort>,
}

impl ViewPortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport and append it to the list.
    pub fn create(&mut self, name: impl Into<String>, camera: SharedCamera) -> SharedViewPort {
        let name = name.into();
        let view = Arc::new(RwLock::new(ViewPort::new(name.clone(), camera)));
        self.names.push(name);
        self.views.push(Arc::clone(&view));
        view
    }

    /// First viewport with the given name.
    pub fn get(&self, name: &str) -> Option<SharedViewPort> {
        self.position(name).map(|index| Arc::clone(&self.views[index]))
    }

    /// Remove the first viewport with the given name.
    pub fn remove_by_name(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Remove a viewport by identity, returning its name.
    pub fn remove(&mut self, view: &SharedViewPort) -> Option<String> {
        let index = self.views.iter().position(|v| Arc::ptr_eq(v, view))?;
        Some(self.remove_at(index))
    }

    pub fn views(&self) -> &[SharedViewPort] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn remove_at(&mut self, index: usize) -> String {
        self.views.remove(index);
        self.names.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Camera, Geometry};

    #[test]
    fn test_registry_lookup_and_remove() {
        let camera = Camera::new(640, 480).shared();
        let mut registry = ViewPortRegistry::new();

        let first = registry.create("scene", Arc::clone(&camera));
        let second = registry.create("scene", Arc::clone(&camera));
        let gui = registry.create("gui", camera);

        let found = registry.get("scene");
        assert!(found.is_some_and(|v| Arc::ptr_eq(&v, &first)));
        assert!(registry.get("missing").is_none());

        assert!(registry.remove_by_name("scene"));
        assert!(registry.get("scene").is_some_and(|v| Arc::ptr_eq(&v, &second)));
        assert_eq!(registry.remove(&gui).as_deref(), Some("gui"));
        assert!(registry.remove(&gui).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_detach_scene() {
        let mut vp = ViewPort::new("main", Camera::new(640, 480).shared());
        let scene: Spatial = Geometry::new("box").into();
        let other: Spatial = Geometry::new("box").into();

        vp.attach_scene(scene.clone());
        assert!(!vp.detach_scene(&other));
        assert!(vp.detach_scene(&scene));
        assert!(vp.scenes().is_empty());
    }

    struct Tracker {
        cleaned: bool,
    }

    impl SceneProcessor for Tracker {
        fn initialize(&mut self, _rm: &mut RenderManager, _vp: &ViewPort) {}
        fn is_initialized(&self) -> bool {
            true
        }
        fn reshape(&mut self, _vp: &ViewPort, _width: u32, _height: u32) {}
        fn pre_frame(&mut self, _tpf: f32) {}
        fn post_queue(&mut self, _queue: &mut RenderQueue) {}
        fn post_frame(&mut self, _rm: &mut RenderManager, _output: Option<&FrameBuffer>) {}
        fn cleanup(&mut self) {
            self.cleaned = true;
        }
    }

    #[test]
    fn test_remove_processor_cleans_up() {
        let mut vp = ViewPort::new("main", Camera::new(640, 480).shared());
        let tracker = Arc::new(Mutex::new(Tracker { cleaned: false }));
        let processor: SharedProcessor = tracker.clone();

        vp.add_processor(Arc::clone(&processor));
        assert!(vp.remove_processor(&processor));
        assert!(tracker.lock().cleaned);
        assert!(!vp.remove_processor(&processor));
    }
}
