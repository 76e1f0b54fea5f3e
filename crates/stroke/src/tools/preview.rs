//! Preview rebuild cadence.

use glam::DVec2;
use vektor_config::PreviewConfig;

use crate::types::Sample;

/// Gates live preview rebuilds.
///
/// A rebuild is allowed once both the minimum interval (measured on the
/// sample clock) and the minimum path distance have passed since the last
/// one. The first rebuild of a stroke is always allowed. Untimed samples
/// never hold back the interval check.
#[derive(Debug, Clone)]
pub struct PreviewThrottle {
    min_interval_ms: f64,
    min_distance_px: f64,
    last_position: Option<DVec2>,
    now_ms: Option<f64>,
    last_rebuild_ms: Option<f64>,
    distance: f64,
    rebuilt: bool,
}

impl PreviewThrottle {
    pub fn new(config: &PreviewConfig) -> Self {
        let config = config.sanitized();
        Self {
            min_interval_ms: config.min_interval_ms,
            min_distance_px: config.min_distance_px,
            last_position: None,
            now_ms: None,
            last_rebuild_ms: None,
            distance: 0.0,
            rebuilt: false,
        }
    }

    pub fn reset(&mut self) {
        self.last_position = None;
        self.now_ms = None;
        self.last_rebuild_ms = None;
        self.distance = 0.0;
        self.rebuilt = false;
    }

    /// Path length accumulated since the last rebuild
    pub fn pending_distance(&self) -> f64 {
        self.distance
    }

    /// Advance the clock and path length with a kept sample
    pub fn observe(&mut self, sample: &Sample) {
        let position = sample.position();
        if let Some(last) = self.last_position {
            self.distance += last.distance(position);
        }
        self.last_position = Some(position);
        if let Some(time) = sample.time {
            self.now_ms = Some(time);
        }
    }

    /// True if a rebuild may run now. Returning true records the rebuild.
    pub fn try_rebuild(&mut self) -> bool {
        if self.rebuilt && !(self.interval_elapsed() && self.distance >= self.min_distance_px) {
            return false;
        }
        self.rebuilt = true;
        self.last_rebuild_ms = self.now_ms;
        self.distance = 0.0;
        true
    }

    fn interval_elapsed(&self) -> bool {
        match (self.now_ms, self.last_rebuild_ms) {
            (Some(now), Some(last)) => now - last >= self.min_interval_ms,
            _ => true,
        }
    }
}
