//! Per-frame render counters.

/// Counters reset at the start of every frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStatistics {
    /// Geometries handed to a material.
    pub geometries_rendered: u64,
    /// Sum of the filtered light counts of every rendered geometry.
    pub lights: u64,
    /// Distinct lights used since the queue was last cleared.
    pub lights_in_use: usize,
}

impl RenderStatistics {
    pub(crate) fn clear_frame(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn on_geometry(&mut self, lights: usize, lights_in_use: usize) {
        self.geometries_rendered += 1;
        self.lights += lights as u64;
        self.lights_in_use = lights_in_use;
    }
}
