//! Stroke geometry synthesis
//!
//! Turns a centerline of raw samples into offset outlines and a triangle
//! strip:
//! 1. Optional streamline (EMA of positions)
//! 2. Arclength, then per-point width/opacity factors from pressure, speed
//!    and jitter
//! 3. Half widths, clamped to a sane factor range
//! 4. Left/right offsets with miter/bevel/round joins
//! 5. Strip triangulation and end caps
//!
//! The builder is pure: the same samples and config always produce
//! bit-identical output.

mod factors;
mod offsets;
mod strip;

use glam::DVec2;
use tracing::debug;
use vektor_config::{JoinStyle, StrokeConfig};

use crate::constants::{MAX_WIDTH_FACTOR, MIN_WIDTH_FACTOR};
use crate::types::Sample;

pub use factors::StrokeFactors;
pub use offsets::{OffsetOutline, apply_round_joins, build_offsets};
pub use strip::{StripGeometry, apply_caps, build_strip};

/// Everything one geometry pass produces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeBuild {
    /// Offsets aligned to the centerline (before round join expansion)
    pub outlines: OffsetOutline,
    pub strip: StripGeometry,
    pub factors: StrokeFactors,
}

impl StrokeBuild {
    pub fn is_empty(&self) -> bool {
        self.strip.is_empty()
    }

    /// Closed outer contour of the outlines, for fill tessellation
    pub fn outer_polygon(&self) -> Vec<DVec2> {
        build_outer_polygon(&self.outlines.left, &self.outlines.right, true)
    }
}

/// Builds stroke geometry for a frozen configuration
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    config: StrokeConfig,
}

impl Default for StrokeBuilder {
    fn default() -> Self {
        Self::new(StrokeConfig::default())
    }
}

impl StrokeBuilder {
    pub fn new(config: StrokeConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &StrokeConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: StrokeConfig) {
        self.config = config.sanitized();
    }

    /// Build outlines, strip and factors for `points`.
    ///
    /// Fewer than two points or a non-positive width yield empty output.
    pub fn build(&self, points: &[Sample]) -> StrokeBuild {
        let config = &self.config;
        if points.len() < 2 || !config.base_width.is_finite() || config.base_width <= 0.0 {
            return StrokeBuild::default();
        }

        let pts = factors::streamline(points, config.streamline);
        let arclength = factors::arclength(&pts);
        let factors = factors::compute_factors(&pts, &arclength, config);

        let half_base = config.base_width * 0.5;
        let half: Vec<f64> = factors
            .width
            .iter()
            .map(|f| half_base * f.clamp(MIN_WIDTH_FACTOR, MAX_WIDTH_FACTOR))
            .collect();

        let centerline: Vec<DVec2> = pts.iter().map(Sample::position).collect();
        let outlines = build_offsets(&centerline, &half, config.join, config.miter_limit);

        let mut strip = if config.join == JoinStyle::Round {
            build_strip(&apply_round_joins(&centerline, &half, &outlines))
        } else {
            build_strip(&outlines)
        };

        let (half_start, half_end) = (half[0], half[half.len() - 1]);
        apply_caps(&mut strip, config.cap_start, config.cap_end, half_start, half_end);

        debug!(
            "StrokeBuilder::build: {} points -> {} vertices, {} indices",
            points.len(),
            strip.vertex_count(),
            strip.indices.len()
        );

        StrokeBuild {
            outlines,
            strip,
            factors,
        }
    }
}

/// Build with a one-off configuration
pub fn build_stroke(points: &[Sample], config: &StrokeConfig) -> StrokeBuild {
    StrokeBuilder::new(config.clone()).build(points)
}

/// `left` forward followed by `right` reversed. With `close`, the first
/// point is repeated at the end.
pub fn build_outer_polygon(left: &[DVec2], right: &[DVec2], close: bool) -> Vec<DVec2> {
    let n = left.len().min(right.len());
    if n < 2 {
        return Vec::new();
    }
    let mut poly = Vec::with_capacity(n * 2 + 1);
    poly.extend_from_slice(&left[..n]);
    poly.extend(right[..n].iter().rev());
    if close {
        poly.push(left[0]);
    }
    poly
}

#[cfg(test)]
mod tests {
    use super::*;
    use vektor_config::{CapStyle, JitterConfig, PressureMode, ThinningConfig};

    fn wavy(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 3.0;
                Sample::new(x, (x * 0.2).sin() * 15.0, 0.3 + 0.5 * ((i % 7) as f64 / 7.0), i as f64 * 8.0)
            })
            .collect()
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = StrokeConfig {
            streamline: 0.4,
            join: JoinStyle::Round,
            cap_start: CapStyle::Round,
            cap_end: CapStyle::Square,
            thinning: Some(ThinningConfig {
                min_speed_scale: 0.4,
                smooth: 0.5,
                ..Default::default()
            }),
            jitter: Some(JitterConfig {
                amplitude: 0.3,
                frequency: 0.05,
                seed: 1234,
                smooth: 0.3,
                ..Default::default()
            }),
            ..Default::default()
        };
        let points = wavy(80);
        let a = build_stroke(&points, &config);
        let b = build_stroke(&points, &config);
        let bits = |v: &[f32]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a.strip.positions), bits(&b.strip.positions));
        assert_eq!(a.strip.indices, b.strip.indices);
        assert_eq!(a.outlines, b.outlines);
        assert_eq!(a.factors, b.factors);
    }

    #[test]
    fn test_degenerate_input_is_empty() {
        let builder = StrokeBuilder::default();
        for points in [vec![], vec![Sample::new(1.0, 1.0, 0.5, 0.0)]] {
            let build = builder.build(&points);
            assert!(build.outlines.is_empty());
            assert!(build.strip.positions.is_empty());
            assert!(build.strip.indices.is_empty());
            assert!(build.factors.is_empty());
        }
        for width in [0.0, -4.0, f64::NAN] {
            let build = build_stroke(&wavy(10), &StrokeConfig::with_width(width));
            assert_eq!(build, StrokeBuild::default());
        }
    }

    #[test]
    fn test_offset_symmetry_on_straight_line() {
        let config = StrokeConfig {
            base_width: 10.0,
            pressure_mode: PressureMode::None,
            ..Default::default()
        };
        let points: Vec<Sample> = (0..12)
            .map(|i| Sample::new(i as f64 * 4.0, 7.0, 0.5, i as f64 * 10.0))
            .collect();
        let build = build_stroke(&points, &config);
        for i in 1..points.len() - 1 {
            let c = points[i].position();
            assert!((build.outlines.left[i].distance(c) - 5.0).abs() < 1e-9);
            assert!((build.outlines.right[i].distance(c) - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_outer_polygon_closes() {
        let build = build_stroke(&wavy(20), &StrokeConfig::default());
        let poly = build.outer_polygon();
        assert_eq!(poly.len(), 20 * 2 + 1);
        assert_eq!(poly.first(), poly.last());

        let open = build_outer_polygon(&build.outlines.left, &build.outlines.right, false);
        assert_eq!(open.len(), 40);
        assert_eq!(open[20], build.outlines.right[19]);
    }

    #[test]
    fn test_strip_indices_in_bounds() {
        let config = StrokeConfig {
            join: JoinStyle::Round,
            cap_start: CapStyle::Round,
            cap_end: CapStyle::Round,
            ..Default::default()
        };
        let build = build_stroke(&wavy(60), &config);
        let count = build.strip.vertex_count() as u32;
        assert!(build.strip.indices.len() % 3 == 0);
        assert!(build.strip.indices.iter().all(|&i| i < count));
        assert_eq!(build.outlines.len(), 60);
    }
}
