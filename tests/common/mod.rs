//! Common utilities for render manager integration tests.
//!
//! A [`RecordingBackend`] and [`ScriptedMaterial`] share one [`Recorder`], so
//! tests can assert on the exact interleaving of backend calls and draws.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use parking_lot::{Mutex, RwLock};

use redlilium_render::backend::{BackendError, BackendResult, FrameBuffer, RenderBackend};
use redlilium_render::pipeline::{ForwardPipeline, PipelineContext, RenderPipeline, SharedContext};
use redlilium_render::queue::RenderQueue;
use redlilium_render::resources::{
    Material, RenderState, SharedMaterial, VertexBuffer, VertexBufferKind,
};
use redlilium_render::scene::{BoundingSphere, Camera, Geometry, LightList, SharedCamera};
use redlilium_render::uniforms::FrameUniforms;
use redlilium_render::viewport::{SceneProcessor, ViewPort};
use redlilium_render::{Bucket, RenderError, RenderManager, RenderResult};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Recording
// ============================================================================

/// A draw as seen by a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub geometry: String,
    pub material: String,
    pub technique: Option<String>,
    pub depth_range: (f32, f32),
    pub ortho: bool,
    pub render_state: Option<RenderState>,
    pub lights: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Viewport(i32, i32, i32, i32),
    ClipRect(i32, i32, i32, i32),
    DepthRange(f32, f32),
    FrameBuffer(Option<String>),
    BackgroundColor(Vec4),
    Clear(bool, bool, bool),
    PushDebug(String),
    PopDebug,
    Upload(VertexBufferKind),
    AlphaToCoverage(bool),
    Draw(Draw),
    Preload(String),
    ProcessorInit(String),
    PreFrame,
    PostQueue,
    PostFrame,
    Reshape(u32, u32),
    Rescale(f32, f32),
}

#[derive(Debug)]
pub struct Recorder {
    pub events: Vec<Event>,
    pub depth_range: (f32, f32),
}

impl Default for Recorder {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            depth_range: (0.0, 1.0),
        }
    }
}

pub type SharedRecorder = Arc<Mutex<Recorder>>;

pub fn recorder() -> SharedRecorder {
    Arc::new(Mutex::new(Recorder::default()))
}

pub fn events(recorder: &SharedRecorder) -> Vec<Event> {
    recorder.lock().events.clone()
}

pub fn draws(recorder: &SharedRecorder) -> Vec<Draw> {
    recorder
        .lock()
        .events
        .iter()
        .filter_map(|event| match event {
            Event::Draw(draw) => Some(draw.clone()),
            _ => None,
        })
        .collect()
}

/// Names of drawn geometries in draw order.
pub fn drawn(recorder: &SharedRecorder) -> Vec<String> {
    draws(recorder).into_iter().map(|draw| draw.geometry).collect()
}

pub fn depth_ranges(recorder: &SharedRecorder) -> Vec<(f32, f32)> {
    recorder
        .lock()
        .events
        .iter()
        .filter_map(|event| match event {
            Event::DepthRange(start, end) => Some((*start, *end)),
            _ => None,
        })
        .collect()
}

pub fn clear_events(recorder: &SharedRecorder) {
    recorder.lock().events.clear();
}

// ============================================================================
// Backend
// ============================================================================

/// Backend recording every call except uniform uploads.
pub struct RecordingBackend {
    recorder: SharedRecorder,
    frame_buffer: Option<FrameBuffer>,
    fail_uploads: bool,
}

impl RecordingBackend {
    pub fn new(recorder: SharedRecorder) -> Self {
        Self {
            recorder,
            frame_buffer: None,
            fail_uploads: false,
        }
    }

    /// Reject every buffer upload after recording it.
    pub fn with_failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    fn record(&self, event: Event) {
        self.recorder.lock().events.push(event);
    }
}

impl RenderBackend for RecordingBackend {
    fn name(&self) -> &str {
        "Recording"
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Event::Viewport(x, y, width, height));
    }

    fn set_clip_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Event::ClipRect(x, y, width, height));
    }

    fn set_depth_range(&mut self, start: f32, end: f32) {
        let mut recorder = self.recorder.lock();
        recorder.depth_range = (start, end);
        recorder.events.push(Event::DepthRange(start, end));
    }

    fn set_frame_buffer(&mut self, frame_buffer: Option<&FrameBuffer>) {
        self.record(Event::FrameBuffer(frame_buffer.map(|fb| fb.name().to_string())));
        self.frame_buffer = frame_buffer.cloned();
    }

    fn current_frame_buffer(&self) -> Option<&FrameBuffer> {
        self.frame_buffer.as_ref()
    }

    fn set_background_color(&mut self, color: Vec4) {
        self.record(Event::BackgroundColor(color));
    }

    fn clear_buffers(&mut self, color: bool, depth: bool, stencil: bool) {
        self.record(Event::Clear(color, depth, stencil));
    }

    fn push_debug_group(&mut self, name: &str) {
        self.record(Event::PushDebug(name.to_string()));
    }

    fn pop_debug_group(&mut self) {
        self.record(Event::PopDebug);
    }

    fn update_buffer_data(&mut self, buffer: &VertexBuffer) -> BackendResult<()> {
        self.record(Event::Upload(buffer.kind()));
        if self.fail_uploads {
            return Err(BackendError::BufferUploadFailed(format!("{:?}", buffer.kind())));
        }
        Ok(())
    }

    fn set_alpha_to_coverage(&mut self, enabled: bool) {
        self.record(Event::AlphaToCoverage(enabled));
    }

    fn set_uniforms(&mut self, _uniforms: &FrameUniforms) {}
}

pub fn manager(recorder: &SharedRecorder) -> RenderManager {
    init_logger();
    RenderManager::new(Box::new(RecordingBackend::new(Arc::clone(recorder))))
}

pub fn failing_upload_manager(recorder: &SharedRecorder) -> RenderManager {
    init_logger();
    let backend = RecordingBackend::new(Arc::clone(recorder)).with_failing_uploads();
    RenderManager::new(Box::new(backend))
}

// ============================================================================
// Materials
// ============================================================================

/// Material with a fixed set of techniques that records its draws.
pub struct ScriptedMaterial {
    name: String,
    techniques: Vec<(String, Option<RenderState>)>,
    active: Option<String>,
    recorder: SharedRecorder,
}

impl ScriptedMaterial {
    /// A material with only the default technique, which is active.
    pub fn new(name: &str, recorder: &SharedRecorder) -> Self {
        Self {
            name: name.to_string(),
            techniques: vec![("Default".to_string(), None)],
            active: Some("Default".to_string()),
            recorder: Arc::clone(recorder),
        }
    }

    pub fn with_technique(mut self, name: &str, state: Option<RenderState>) -> Self {
        self.techniques.push((name.to_string(), state));
        self
    }

    pub fn with_active(mut self, active: Option<&str>) -> Self {
        self.active = active.map(str::to_string);
        self
    }
}

impl Material for ScriptedMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_technique(&self, name: &str) -> bool {
        self.techniques.iter().any(|(technique, _)| technique == name)
    }

    fn active_technique(&self) -> Option<&str> {
        self.active.as_deref()
    }

    fn select_technique(&mut self, name: &str, _rm: &RenderManager) -> RenderResult<()> {
        if !self.has_technique(name) {
            return Err(RenderError::TechniqueNotFound {
                material: self.name.clone(),
                technique: name.to_string(),
            });
        }
        self.active = Some(name.to_string());
        Ok(())
    }

    fn active_technique_render_state(&self) -> Option<RenderState> {
        let active = self.active.as_deref()?;
        self.techniques
            .iter()
            .find(|(technique, _)| technique == active)
            .and_then(|(_, state)| *state)
    }

    fn render(
        &self,
        geometry: &Geometry,
        lights: &LightList,
        rm: &mut RenderManager,
    ) -> RenderResult<()> {
        let uniforms = rm.uniforms().data();
        let ortho = uniforms.view == Mat4::IDENTITY && uniforms.projection == rm.ortho_matrix();
        let draw = Draw {
            geometry: geometry.name().to_string(),
            material: self.name.clone(),
            technique: self.active.clone(),
            depth_range: self.recorder.lock().depth_range,
            ortho,
            render_state: rm.forced_render_state(),
            lights: lights.len(),
        };
        self.recorder.lock().events.push(Event::Draw(draw));
        Ok(())
    }

    fn preload(&self, _rm: &mut RenderManager, geometry: &Geometry) -> RenderResult<()> {
        self.recorder
            .lock()
            .events
            .push(Event::Preload(geometry.name().to_string()));
        Ok(())
    }
}

/// Keep a typed handle to inspect the material after rendering.
pub fn typed_material(
    material: ScriptedMaterial,
) -> (Arc<RwLock<ScriptedMaterial>>, SharedMaterial) {
    let typed = Arc::new(RwLock::new(material));
    let shared: SharedMaterial = typed.clone();
    (typed, shared)
}

pub fn material(name: &str, recorder: &SharedRecorder) -> SharedMaterial {
    typed_material(ScriptedMaterial::new(name, recorder)).1
}

// ============================================================================
// Scene helpers
// ============================================================================

/// 800x600 camera at (0, 0, 10) looking at the origin.
pub fn camera() -> SharedCamera {
    Camera::new(800, 600).shared()
}

pub fn geometry(name: &str, bucket: Bucket, material: &SharedMaterial) -> Geometry {
    Geometry::new(name)
        .with_bucket(bucket)
        .with_material(Arc::clone(material))
}

/// Geometry placed at `position` with a unit bound.
pub fn geometry_at(
    name: &str,
    bucket: Bucket,
    material: &SharedMaterial,
    position: Vec3,
) -> Geometry {
    geometry(name, bucket, material)
        .with_world_matrix(Mat4::from_translation(position))
        .with_bound(BoundingSphere::new(position, 1.0))
}

// ============================================================================
// Pipelines and contexts
// ============================================================================

#[derive(Debug, Default)]
pub struct Counters {
    pub frame_starts: AtomicUsize,
    pub frame_ends: AtomicUsize,
    pub renders: AtomicUsize,
}

impl Counters {
    pub fn get(&self) -> (usize, usize, usize) {
        (
            self.frame_starts.load(Ordering::SeqCst),
            self.frame_ends.load(Ordering::SeqCst),
            self.renders.load(Ordering::SeqCst),
        )
    }
}

/// Context counting how often the render manager drives it.
#[derive(Debug, Default)]
pub struct CountingContext {
    active: bool,
    pub viewport_starts: usize,
    pub viewport_ends: usize,
    pub frame_ends: usize,
}

impl PipelineContext for CountingContext {
    fn start_view_port_render(&mut self, _rm: &mut RenderManager, _vp: &ViewPort) -> bool {
        self.viewport_starts += 1;
        std::mem::replace(&mut self.active, true)
    }

    fn end_view_port_render(&mut self, _rm: &mut RenderManager, _vp: &ViewPort) {
        self.viewport_ends += 1;
    }

    fn end_context_render_frame(&mut self, _rm: &mut RenderManager) {
        self.frame_ends += 1;
        self.active = false;
    }
}

/// Forward pipeline rendering with a [`CountingContext`] and counting its
/// frame hooks.
pub struct CountingPipeline {
    inner: ForwardPipeline,
    counters: Arc<Counters>,
}

impl CountingPipeline {
    pub fn new() -> (Self, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let pipeline = Self {
            inner: ForwardPipeline::new(),
            counters: Arc::clone(&counters),
        };
        (pipeline, counters)
    }
}

impl RenderPipeline for CountingPipeline {
    fn name(&self) -> &str {
        "Counting"
    }

    fn fetch_pipeline_context(&self, rm: &mut RenderManager) -> RenderResult<SharedContext> {
        let context: SharedContext =
            rm.get_or_create_context(|_| Some(CountingContext::default()))?;
        Ok(context)
    }

    fn has_rendered_this_frame(&self) -> bool {
        self.inner.has_rendered_this_frame()
    }

    fn start_render_frame(&mut self, rm: &mut RenderManager) {
        self.counters.frame_starts.fetch_add(1, Ordering::SeqCst);
        self.inner.start_render_frame(rm);
    }

    fn pipeline_render(
        &mut self,
        rm: &mut RenderManager,
        context: &mut dyn PipelineContext,
        vp: &mut ViewPort,
        tpf: f32,
    ) -> RenderResult<()> {
        self.counters.renders.fetch_add(1, Ordering::SeqCst);
        self.inner.pipeline_render(rm, context, vp, tpf)
    }

    fn end_render_frame(&mut self, rm: &mut RenderManager) {
        self.counters.frame_ends.fetch_add(1, Ordering::SeqCst);
        self.inner.end_render_frame(rm);
    }
}

// ============================================================================
// Scene processors
// ============================================================================

/// Processor recording its callbacks.
pub struct RecordingProcessor {
    name: String,
    initialized: bool,
    recorder: SharedRecorder,
}

impl RecordingProcessor {
    pub fn new(name: &str, recorder: &SharedRecorder) -> Self {
        Self {
            name: name.to_string(),
            initialized: false,
            recorder: Arc::clone(recorder),
        }
    }

    fn record(&self, event: Event) {
        self.recorder.lock().events.push(event);
    }
}

impl SceneProcessor for RecordingProcessor {
    fn initialize(&mut self, _rm: &mut RenderManager, _vp: &ViewPort) {
        self.initialized = true;
        self.record(Event::ProcessorInit(self.name.clone()));
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn reshape(&mut self, _vp: &ViewPort, width: u32, height: u32) {
        self.record(Event::Reshape(width, height));
    }

    fn rescale(&mut self, _vp: &ViewPort, x: f32, y: f32) {
        self.record(Event::Rescale(x, y));
    }

    fn pre_frame(&mut self, _tpf: f32) {
        self.record(Event::PreFrame);
    }

    fn post_queue(&mut self, _queue: &mut RenderQueue) {
        self.record(Event::PostQueue);
    }

    fn post_frame(&mut self, _rm: &mut RenderManager, _output: Option<&FrameBuffer>) {
        self.record(Event::PostFrame);
    }

    fn cleanup(&mut self) {
        self.initialized = false;
    }
}
