//! The render manager
//!
//! [`RenderManager`] drives one frame at a time: it walks the pre, main and
//! post viewports, hands each to its pipeline, and exposes the operations
//! pipelines build on (scene flattening, queue flushing, geometry dispatch,
//! camera setup). All state is owned by the manager and mutated through its
//! methods; collaborators receive it as `&mut RenderManager`.

mod frame;
mod geometry;
mod overrides;
mod queues;
mod scene;
mod statistics;
mod view;

pub use overrides::BOUND_DRAW_BUFFER;
pub use statistics::RenderStatistics;

use std::collections::HashSet;
use std::sync::Arc;

use glam::Mat4;

use crate::backend::RenderBackend;
use crate::pipeline::{
    shared_pipeline, ContextRegistry, DefaultPipelineContext, ForwardPipeline, SharedContext,
    SharedPipeline,
};
use crate::profiling::{AppProfiler, AppStep, VpStep};
use crate::queue::Bucket;
use crate::resources::LightMode;
use crate::scene::{DefaultLightFilter, Geometry, LightFilter, LightId, LightList, SharedCamera};
use crate::uniforms::UniformBindings;
use crate::viewport::{SharedViewPort, ViewPort, ViewPortGroup, ViewPortRegistry};

use overrides::ForcedOverrides;

/// Predicate deciding whether a geometry is rendered.
pub type RenderFilter = Box<dyn Fn(&Geometry) -> bool + Send + Sync>;

/// Configuration for initializing the render manager
#[derive(Debug, Clone)]
pub struct RenderManagerConfig {
    /// Render the translucent bucket from `render_translucent_queue`
    pub handle_translucent_bucket: bool,
    /// Pass the bound draw buffer index to shaders
    pub pass_draw_buffer_target_id: bool,
    /// Lights per pass in single-pass lighting, clamped to at least 1
    pub single_pass_light_batch_size: i32,
    /// Light mode techniques should prefer
    pub preferred_light_mode: LightMode,
}

impl Default for RenderManagerConfig {
    fn default() -> Self {
        Self {
            handle_translucent_bucket: true,
            pass_draw_buffer_target_id: true,
            single_pass_light_batch_size: 1,
            preferred_light_mode: LightMode::MultiPass,
        }
    }
}

impl RenderManagerConfig {
    pub fn with_handle_translucent_bucket(mut self, handle: bool) -> Self {
        self.handle_translucent_bucket = handle;
        self
    }

    pub fn with_pass_draw_buffer_target_id(mut self, pass: bool) -> Self {
        self.pass_draw_buffer_target_id = pass;
        self
    }

    pub fn with_single_pass_light_batch_size(mut self, size: i32) -> Self {
        self.single_pass_light_batch_size = size;
        self
    }

    pub fn with_preferred_light_mode(mut self, mode: LightMode) -> Self {
        self.preferred_light_mode = mode;
        self
    }
}

/// Per-frame render orchestrator.
pub struct RenderManager {
    backend: Box<dyn RenderBackend>,
    uniforms: UniformBindings,

    pre_views: ViewPortRegistry,
    main_views: ViewPortRegistry,
    post_views: ViewPortRegistry,

    contexts: ContextRegistry,
    used_contexts: Vec<SharedContext>,
    used_pipelines: Vec<SharedPipeline>,
    default_pipeline: SharedPipeline,

    // Last applied camera and the state derived from it
    prev_cam: Option<SharedCamera>,
    ortho_matrix: Mat4,
    view_rect: (i32, i32, i32, i32),

    overrides: ForcedOverrides,
    filtered_lights: LightList,
    lights_in_use: HashSet<LightId>,
    statistics: RenderStatistics,

    handle_translucent_bucket: bool,
    preferred_light_mode: LightMode,
    single_pass_light_batch_size: usize,

    light_filter: Option<Box<dyn LightFilter>>,
    render_filter: Option<RenderFilter>,
    profiler: Option<Box<dyn AppProfiler>>,
}

impl RenderManager {
    /// Create a render manager with the default configuration.
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self::with_config(backend, RenderManagerConfig::default())
    }

    pub fn with_config(backend: Box<dyn RenderBackend>, config: RenderManagerConfig) -> Self {
        log::info!("Creating render manager with {} backend", backend.name());

        let mut contexts = ContextRegistry::new();
        contexts.register(DefaultPipelineContext::new());

        Self {
            backend,
            uniforms: UniformBindings::new(),
            pre_views: ViewPortRegistry::new(),
            main_views: ViewPortRegistry::new(),
            post_views: ViewPortRegistry::new(),
            contexts,
            used_contexts: Vec::new(),
            used_pipelines: Vec::new(),
            default_pipeline: shared_pipeline(ForwardPipeline::new()),
            prev_cam: None,
            ortho_matrix: Mat4::IDENTITY,
            view_rect: (0, 0, 0, 0),
            overrides: ForcedOverrides::new(config.pass_draw_buffer_target_id),
            filtered_lights: LightList::new(),
            lights_in_use: HashSet::new(),
            statistics: RenderStatistics::default(),
            handle_translucent_bucket: config.handle_translucent_bucket,
            preferred_light_mode: config.preferred_light_mode,
            single_pass_light_batch_size: config.single_pass_light_batch_size.max(1) as usize,
            light_filter: Some(Box::new(DefaultLightFilter::new())),
            render_filter: None,
            profiler: None,
        }
    }

    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn RenderBackend {
        self.backend.as_mut()
    }

    pub fn uniforms(&self) -> &UniformBindings {
        &self.uniforms
    }

    // ---- Viewports ----

    fn registry(&self, group: ViewPortGroup) -> &ViewPortRegistry {
        match group {
            ViewPortGroup::Pre => &self.pre_views,
            ViewPortGroup::Main => &self.main_views,
            ViewPortGroup::Post => &self.post_views,
        }
    }

    fn registry_mut(&mut self, group: ViewPortGroup) -> &mut ViewPortRegistry {
        match group {
            ViewPortGroup::Pre => &mut self.pre_views,
            ViewPortGroup::Main => &mut self.main_views,
            ViewPortGroup::Post => &mut self.post_views,
        }
    }

    /// Create a viewport at the end of `group`.
    pub fn create_view(
        &mut self,
        group: ViewPortGroup,
        name: impl Into<String>,
        camera: SharedCamera,
    ) -> SharedViewPort {
        let name = name.into();
        log::debug!("Creating {:?} viewport '{}'", group, name);
        self.registry_mut(group).create(name, camera)
    }

    /// First viewport of `group` with the given name.
    pub fn get_view(&self, group: ViewPortGroup, name: &str) -> Option<SharedViewPort> {
        self.registry(group).get(name)
    }

    /// Remove the first viewport of `group` with the given name.
    pub fn remove_view_by_name(&mut self, group: ViewPortGroup, name: &str) -> bool {
        let removed = self.registry_mut(group).remove_by_name(name);
        if removed {
            log::debug!("Removed {:?} viewport '{}'", group, name);
        }
        removed
    }

    pub fn remove_view(&mut self, group: ViewPortGroup, view: &SharedViewPort) -> bool {
        match self.registry_mut(group).remove(view) {
            Some(name) => {
                log::debug!("Removed {:?} viewport '{}'", group, name);
                true
            }
            None => false,
        }
    }

    /// Viewports of `group` in render order.
    pub fn views(&self, group: ViewPortGroup) -> &[SharedViewPort] {
        self.registry(group).views()
    }

    pub fn create_pre_view(
        &mut self,
        name: impl Into<String>,
        camera: SharedCamera,
    ) -> SharedViewPort {
        self.create_view(ViewPortGroup::Pre, name, camera)
    }

    pub fn create_main_view(
        &mut self,
        name: impl Into<String>,
        camera: SharedCamera,
    ) -> SharedViewPort {
        self.create_view(ViewPortGroup::Main, name, camera)
    }

    pub fn create_post_view(
        &mut self,
        name: impl Into<String>,
        camera: SharedCamera,
    ) -> SharedViewPort {
        self.create_view(ViewPortGroup::Post, name, camera)
    }

    pub fn get_pre_view(&self, name: &str) -> Option<SharedViewPort> {
        self.get_view(ViewPortGroup::Pre, name)
    }

    pub fn get_main_view(&self, name: &str) -> Option<SharedViewPort> {
        self.get_view(ViewPortGroup::Main, name)
    }

    pub fn get_post_view(&self, name: &str) -> Option<SharedViewPort> {
        self.get_view(ViewPortGroup::Post, name)
    }

    pub fn pre_views(&self) -> &[SharedViewPort] {
        self.views(ViewPortGroup::Pre)
    }

    pub fn main_views(&self) -> &[SharedViewPort] {
        self.views(ViewPortGroup::Main)
    }

    pub fn post_views(&self) -> &[SharedViewPort] {
        self.views(ViewPortGroup::Post)
    }

    // ---- Pipelines ----

    /// Pipeline for viewports that do not set their own.
    pub fn pipeline(&self) -> &SharedPipeline {
        &self.default_pipeline
    }

    pub fn set_pipeline(&mut self, pipeline: SharedPipeline) {
        log::debug!("Default pipeline set to '{}'", pipeline.lock().name());
        self.default_pipeline = pipeline;
    }

    // ---- Lighting ----

    pub fn light_filter(&self) -> Option<&dyn LightFilter> {
        self.light_filter.as_deref()
    }

    /// Replace the light filter. Without one, geometries are shaded with
    /// their full light list.
    pub fn set_light_filter(&mut self, filter: Option<Box<dyn LightFilter>>) {
        self.light_filter = filter;
    }

    pub fn preferred_light_mode(&self) -> LightMode {
        self.preferred_light_mode
    }

    pub fn set_preferred_light_mode(&mut self, mode: LightMode) {
        self.preferred_light_mode = mode;
    }

    pub fn single_pass_light_batch_size(&self) -> usize {
        self.single_pass_light_batch_size
    }

    /// Values below 1 are clamped to 1.
    pub fn set_single_pass_light_batch_size(&mut self, size: i32) {
        self.single_pass_light_batch_size = size.max(1) as usize;
    }

    /// Lights passed to a material since the queue was last cleared.
    pub fn lights_in_use(&self) -> &HashSet<LightId> {
        &self.lights_in_use
    }

    pub fn statistics(&self) -> &RenderStatistics {
        &self.statistics
    }

    // ---- Misc state ----

    pub fn is_handle_translucent_bucket(&self) -> bool {
        self.handle_translucent_bucket
    }

    /// When disabled, the translucent bucket is left for a post-processing
    /// stage to render at a point of its choosing.
    pub fn set_handle_translucent_bucket(&mut self, handle: bool) {
        self.handle_translucent_bucket = handle;
    }

    /// Install a predicate vetoing the rendering of individual geometries.
    /// Queue contents are not affected.
    pub fn set_render_filter(&mut self, filter: Option<RenderFilter>) {
        self.render_filter = filter;
    }

    pub fn set_profiler(&mut self, profiler: Option<Box<dyn AppProfiler>>) {
        self.profiler = profiler;
    }

    pub fn set_alpha_to_coverage(&mut self, enabled: bool) {
        self.backend.set_alpha_to_coverage(enabled);
    }

    /// Set the world matrix for the next draw and upload the uniforms.
    pub fn set_world_matrix(&mut self, world: Mat4) {
        self.uniforms.set_world_matrix(world);
        self.backend.set_uniforms(self.uniforms.data());
    }

    /// The camera most recently applied with [`RenderManager::set_camera`].
    pub fn current_camera(&self) -> Option<&SharedCamera> {
        self.prev_cam.as_ref()
    }

    /// Report an application frame phase to the profiler.
    pub fn app_step(&mut self, step: AppStep) {
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.app_step(step);
        }
    }

    /// Report a viewport render phase to the profiler.
    pub fn vp_step(&mut self, step: VpStep, vp: &ViewPort, bucket: Option<Bucket>) {
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.vp_step(step, vp, bucket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyBackend;

    fn manager() -> RenderManager {
        RenderManager::new(Box::new(DummyBackend::new()))
    }

    #[test]
    fn test_default_config() {
        let rm = manager();
        assert!(rm.is_handle_translucent_bucket());
        assert!(rm.is_pass_draw_buffer_target_id_to_shaders());
        assert_eq!(rm.single_pass_light_batch_size(), 1);
        assert_eq!(rm.preferred_light_mode(), LightMode::MultiPass);
        assert!(rm.light_filter().is_some());
    }

    #[test]
    fn test_config_batch_size_is_clamped() {
        let config = RenderManagerConfig::default().with_single_pass_light_batch_size(-4);
        let rm = RenderManager::with_config(Box::new(DummyBackend::new()), config);
        assert_eq!(rm.single_pass_light_batch_size(), 1);
    }

    #[test]
    fn test_default_context_is_registered() {
        let rm = manager();
        assert!(rm.get_context::<DefaultPipelineContext>().is_some());
    }
}
