//! Pipeline contexts and their type-keyed registry.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::manager::RenderManager;
use crate::viewport::ViewPort;

/// A context shared between the registry and the pipelines using it.
pub type SharedContext = Arc<Mutex<dyn PipelineContext>>;

/// Backend- or pipeline-specific state that outlives a single frame, e.g.
/// a pool of frame buffers shared by every pipeline of one kind.
pub trait PipelineContext: Send + Sync {
    /// Called before a viewport is rendered with this context.
    ///
    /// Returns `true` if the context was already active this frame.
    fn start_view_port_render(&mut self, rm: &mut RenderManager, vp: &ViewPort) -> bool;

    /// Called after a viewport was rendered with this context.
    fn end_view_port_render(&mut self, _rm: &mut RenderManager, _vp: &ViewPort) {}

    /// Called once at the end of every frame the context was used in.
    fn end_context_render_frame(&mut self, rm: &mut RenderManager);
}

/// Context always available from the render manager.
#[derive(Debug, Default)]
pub struct DefaultPipelineContext {
    rendered: bool,
}

impl DefaultPipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a viewport was rendered with this context this frame.
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }
}

impl PipelineContext for DefaultPipelineContext {
    fn start_view_port_render(&mut self, _rm: &mut RenderManager, _vp: &ViewPort) -> bool {
        std::mem::replace(&mut self.rendered, true)
    }

    fn end_context_render_frame(&mut self, _rm: &mut RenderManager) {
        self.rendered = false;
    }
}

struct ContextEntry {
    typed: Arc<dyn Any + Send + Sync>,
    context: SharedContext,
}

/// Contexts keyed by their concrete type. At most one instance per type.
#[derive(Default)]
pub struct ContextRegistry {
    entries: HashMap<TypeId, ContextEntry>,
}

impl ContextRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context, replacing any previous context of the same type.
    pub fn register<T: PipelineContext + 'static>(&mut self, context: T) -> Arc<Mutex<T>> {
        let typed = Arc::new(Mutex::new(context));
        let shared: SharedContext = typed.clone();
        let previous = self.entries.insert(
            TypeId::of::<T>(),
            ContextEntry {
                typed: typed.clone(),
                context: shared,
            },
        );
        if previous.is_some() {
            log::debug!("Replaced pipeline context {}", type_name::<T>());
        } else {
            log::debug!("Registered pipeline context {}", type_name::<T>());
        }
        typed
    }

    /// The registered context of type `T`.
    pub fn get<T: PipelineContext + 'static>(&self) -> Option<Arc<Mutex<T>>> {
        let entry = self.entries.get(&TypeId::of::<T>())?;
        Arc::clone(&entry.typed).downcast::<Mutex<T>>().ok()
    }

    /// The registered context of type `T` as a trait object.
    pub fn get_shared<T: PipelineContext + 'static>(&self) -> Option<SharedContext> {
        self.entries
            .get(&TypeId::of::<T>())
            .map(|entry| Arc::clone(&entry.context))
    }

    pub fn contains<T: PipelineContext + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct PoolContext {
        frames: u32,
    }

    impl PipelineContext for PoolContext {
        fn start_view_port_render(&mut self, _rm: &mut RenderManager, _vp: &ViewPort) -> bool {
            false
        }

        fn end_context_render_frame(&mut self, _rm: &mut RenderManager) {
            self.frames += 1;
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ContextRegistry::new();
        assert!(registry.get::<PoolContext>().is_none());

        let registered = registry.register(PoolContext::default());
        let fetched = registry.get::<PoolContext>();

        assert!(fetched.is_some_and(|c| Arc::ptr_eq(&c, &registered)));
        assert!(registry.get_shared::<PoolContext>().is_some());
        assert!(!registry.contains::<DefaultPipelineContext>());
    }

    #[test]
    fn test_register_replaces_same_type() {
        let mut registry = ContextRegistry::new();
        let first = registry.register(PoolContext { frames: 1 });
        let second = registry.register(PoolContext { frames: 2 });

        assert_eq!(registry.len(), 1);
        let current = registry.get::<PoolContext>();
        assert!(current.as_ref().is_some_and(|c| Arc::ptr_eq(c, &second)));
        assert!(!current.is_some_and(|c| Arc::ptr_eq(&c, &first)));
    }
}
