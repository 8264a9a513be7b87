//! Per-viewport render queue
//!
//! Geometries are partitioned into [`Bucket`]s while the scene is flattened.
//! Each bucket is sorted against the viewport camera right before it is
//! rendered, using its [`GeometryComparator`].

mod comparator;

pub use comparator::*;

use std::sync::Arc;

use crate::error::RenderResult;
use crate::manager::RenderManager;
use crate::scene::{Camera, Geometry, SharedCamera};

/// Render queue partition a geometry is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bucket {
    /// Solid geometry, rendered first.
    #[default]
    Opaque,
    /// Blended geometry, rendered after the sky.
    Transparent,
    /// Drawn at the far plane behind everything else.
    Sky,
    /// Screen-space geometry drawn with an orthographic projection.
    Gui,
    /// Rendered on request, after post-processing has had a chance to run.
    Translucent,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Opaque,
        Bucket::Transparent,
        Bucket::Sky,
        Bucket::Gui,
        Bucket::Translucent,
    ];
}

/// Participation of a geometry in shadow rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadowMode {
    #[default]
    Off,
    Cast,
    Receive,
    CastAndReceive,
}

impl ShadowMode {
    pub fn casts(self) -> bool {
        matches!(self, ShadowMode::Cast | ShadowMode::CastAndReceive)
    }

    pub fn receives(self) -> bool {
        matches!(self, ShadowMode::Receive | ShadowMode::CastAndReceive)
    }
}

/// Ordered list of geometries with a sort policy.
pub struct GeometryList {
    geometries: Vec<Arc<Geometry>>,
    comparator: Box<dyn GeometryComparator>,
}

impl GeometryList {
    pub fn new(comparator: Box<dyn GeometryComparator>) -> Self {
        Self {
            geometries: Vec::new(),
            comparator,
        }
    }

    pub fn add(&mut self, geometry: Arc<Geometry>) {
        self.geometries.push(geometry);
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Geometry>> {
        self.geometries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Geometry>> {
        self.geometries.iter()
    }

    pub fn clear(&mut self) {
        self.geometries.clear();
    }

    pub fn set_comparator(&mut self, comparator: Box<dyn GeometryComparator>) {
        self.comparator = comparator;
    }

    pub fn set_camera(&mut self, camera: &Camera) {
        self.comparator.set_camera(camera);
    }

    /// Stable sort, so equal keys keep their queue order.
    pub fn sort(&mut self) {
        let comparator = &self.comparator;
        self.geometries.sort_by(|a, b| comparator.compare(a, b));
    }
}

impl std::fmt::Debug for GeometryList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.geometries.iter().map(|g| g.name()))
            .finish()
    }
}

/// Buckets of a single viewport plus its shadow cast/receive lists.
#[derive(Debug)]
pub struct RenderQueue {
    opaque: GeometryList,
    transparent: GeometryList,
    sky: GeometryList,
    gui: GeometryList,
    translucent: GeometryList,
    shadow_cast: GeometryList,
    shadow_recv: GeometryList,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderQueue {
    pub fn new() -> Self {
        Self {
            opaque: GeometryList::new(Box::<OpaqueComparator>::default()),
            transparent: GeometryList::new(Box::<TransparentComparator>::default()),
            sky: GeometryList::new(Box::new(NullComparator)),
            gui: GeometryList::new(Box::new(GuiComparator)),
            translucent: GeometryList::new(Box::<TransparentComparator>::default()),
            shadow_cast: GeometryList::new(Box::<OpaqueComparator>::default()),
            shadow_recv: GeometryList::new(Box::<OpaqueComparator>::default()),
        }
    }

    fn list(&self, bucket: Bucket) -> &GeometryList {
        match bucket {
            Bucket::Opaque => &self.opaque,
            Bucket::Transparent => &self.transparent,
            Bucket::Sky => &self.sky,
            Bucket::Gui => &self.gui,
            Bucket::Translucent => &self.translucent,
        }
    }

    fn list_mut(&mut self, bucket: Bucket) -> &mut GeometryList {
        match bucket {
            Bucket::Opaque => &mut self.opaque,
            Bucket::Transparent => &mut self.transparent,
            Bucket::Sky => &mut self.sky,
            Bucket::Gui => &mut self.gui,
            Bucket::Translucent => &mut self.translucent,
        }
    }

    /// Replace the sort policy of a bucket.
    pub fn set_geometry_comparator(
        &mut self,
        bucket: Bucket,
        comparator: Box<dyn GeometryComparator>,
    ) {
        self.list_mut(bucket).set_comparator(comparator);
    }

    pub fn add_to_queue(&mut self, geometry: Arc<Geometry>, bucket: Bucket) {
        self.list_mut(bucket).add(geometry);
    }

    /// Queue a geometry for shadow rendering according to `mode`.
    pub fn add_to_shadow_queue(&mut self, geometry: Arc<Geometry>, mode: ShadowMode) {
        if mode.casts() {
            self.shadow_cast.add(Arc::clone(&geometry));
        }
        if mode.receives() {
            self.shadow_recv.add(geometry);
        }
    }

    pub fn is_queue_empty(&self, bucket: Bucket) -> bool {
        self.list(bucket).is_empty()
    }

    /// Contents of a bucket in queue order.
    pub fn bucket_content(&self, bucket: Bucket) -> &GeometryList {
        self.list(bucket)
    }

    /// Shadow casters for [`ShadowMode::Cast`], receivers for
    /// [`ShadowMode::Receive`]. Other modes have no list of their own.
    pub fn shadow_queue_content(&self, mode: ShadowMode) -> Option<&GeometryList> {
        match mode {
            ShadowMode::Cast => Some(&self.shadow_cast),
            ShadowMode::Receive => Some(&self.shadow_recv),
            ShadowMode::Off | ShadowMode::CastAndReceive => None,
        }
    }

    /// Sort a bucket against `camera` and render it, optionally clearing it.
    pub fn render_queue(
        &mut self,
        bucket: Bucket,
        rm: &mut RenderManager,
        camera: &SharedCamera,
        clear: bool,
    ) -> RenderResult<()> {
        let list = self.list_mut(bucket);
        Self::render_list(list, rm, camera, clear)
    }

    /// Render the shadow cast or receive list.
    pub fn render_shadow_queue(
        &mut self,
        mode: ShadowMode,
        rm: &mut RenderManager,
        camera: &SharedCamera,
        clear: bool,
    ) -> RenderResult<()> {
        let list = match mode {
            ShadowMode::Cast => &mut self.shadow_cast,
            ShadowMode::Receive => &mut self.shadow_recv,
            ShadowMode::Off | ShadowMode::CastAndReceive => return Ok(()),
        };
        Self::render_list(list, rm, camera, clear)
    }

    fn render_list(
        list: &mut GeometryList,
        rm: &mut RenderManager,
        camera: &SharedCamera,
        clear: bool,
    ) -> RenderResult<()> {
        list.set_camera(&camera.read());
        list.sort();
        rm.render_geometry_list(list)?;
        if clear {
            list.clear();
        }
        Ok(())
    }

    /// Empty every bucket and shadow list.
    pub fn clear(&mut self) {
        for bucket in Bucket::ALL {
            self.list_mut(bucket).clear();
        }
        self.shadow_cast.clear();
        self.shadow_recv.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_mode_routing() {
        let mut queue = RenderQueue::new();
        queue.add_to_shadow_queue(Arc::new(Geometry::new("caster")), ShadowMode::Cast);
        queue.add_to_shadow_queue(Arc::new(Geometry::new("both")), ShadowMode::CastAndReceive);
        queue.add_to_shadow_queue(Arc::new(Geometry::new("none")), ShadowMode::Off);

        let cast = queue.shadow_queue_content(ShadowMode::Cast).map(GeometryList::len);
        let recv = queue.shadow_queue_content(ShadowMode::Receive).map(GeometryList::len);
        assert_eq!(cast, Some(2));
        assert_eq!(recv, Some(1));
    }

    #[test]
    fn test_clear_empties_all_buckets() {
        let mut queue = RenderQueue::new();
        for bucket in Bucket::ALL {
            queue.add_to_queue(Arc::new(Geometry::new("g")), bucket);
            assert!(!queue.is_queue_empty(bucket));
        }
        queue.add_to_shadow_queue(Arc::new(Geometry::new("s")), ShadowMode::CastAndReceive);

        queue.clear();

        for bucket in Bucket::ALL {
            assert!(queue.is_queue_empty(bucket));
        }
        assert_eq!(queue.shadow_queue_content(ShadowMode::Cast).map(GeometryList::len), Some(0));
    }

    #[test]
    fn test_sky_keeps_insertion_order() {
        let mut list = GeometryList::new(Box::new(NullComparator));
        for name in ["c", "a", "b"] {
            list.add(Arc::new(Geometry::new(name)));
        }
        list.sort();
        let names: Vec<_> = list.iter().map(|g| g.name().to_string()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
