//! Shared configuration for Vektor
//!
//! This crate provides the single source of truth for stroke geometry
//! settings, preview cadence, history depth, batching and tessellation
//! limits. Everything here is a plain in-process value object; no file
//! format is defined.

use serde::{Deserialize, Serialize};

pub mod stroke;

pub use stroke::*;

/// Default undo depth
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Default minimum time between preview rebuilds (milliseconds)
pub const DEFAULT_PREVIEW_MIN_MS: f64 = 8.0;

/// Default time the final tessellation of a stroke may take (milliseconds)
pub const DEFAULT_FINAL_TESS_TIMEOUT_MS: u64 = 2000;

/// Preview decimation and rebuild cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Minimum travel before a live sample is kept
    pub decimate_px: f64,
    /// Minimum time between preview rebuilds
    pub min_interval_ms: f64,
    /// Minimum accumulated path length between preview rebuilds
    pub min_distance_px: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            decimate_px: 0.5,
            min_interval_ms: DEFAULT_PREVIEW_MIN_MS,
            min_distance_px: 2.0,
        }
    }
}

impl PreviewConfig {
    pub fn sanitized(&self) -> Self {
        Self {
            decimate_px: non_negative(self.decimate_px),
            min_interval_ms: non_negative(self.min_interval_ms),
            min_distance_px: non_negative(self.min_distance_px),
        }
    }
}

/// Undo/redo stack settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum undo entries; the oldest are evicted first
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Merged draw buffer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Use 16-bit index buffers (partitions batches at the 16-bit limit)
    pub narrow_indices: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            narrow_indices: true,
        }
    }
}

/// Off-thread tessellation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessConfig {
    /// How long a finishing stroke waits for its final tessellation
    pub final_timeout_ms: u64,
}

impl Default for TessConfig {
    fn default() -> Self {
        Self {
            final_timeout_ms: DEFAULT_FINAL_TESS_TIMEOUT_MS,
        }
    }
}

/// Everything the drawing engine needs at construction time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stroke: StrokeConfig,
    pub style: StrokeStyle,
    pub preview: PreviewConfig,
    pub history: HistoryConfig,
    pub batch: BatchConfig,
    pub tess: TessConfig,
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.history.limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.preview.min_interval_ms, DEFAULT_PREVIEW_MIN_MS);
        assert!(config.batch.narrow_indices);
        assert_eq!(config.stroke.base_width, DEFAULT_BASE_WIDTH);
    }

    #[test]
    fn test_preview_sanitized() {
        let preview = PreviewConfig {
            decimate_px: -3.0,
            min_interval_ms: f64::NAN,
            min_distance_px: 4.0,
        }
        .sanitized();
        assert_eq!(preview.decimate_px, 0.0);
        assert_eq!(preview.min_interval_ms, 0.0);
        assert_eq!(preview.min_distance_px, 4.0);
    }
}
