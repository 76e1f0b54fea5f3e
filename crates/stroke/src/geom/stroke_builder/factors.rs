//! Per-point width and opacity modulation.
//!
//! Width factor = pressure scale * speed scale * jitter scale. Opacity
//! factors only exist when the pressure mode drives opacity.

use vektor_config::{JitterConfig, JitterDomain, StrokeConfig, ThinningConfig};

use crate::constants::{DEFAULT_PRESSURE, EMA_STRENGTH, MIN_SPEED_DT_MS};
use crate::types::Sample;

/// Per-point modulation factors of one stroke
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeFactors {
    /// Multiplier applied to the base width
    pub width: Vec<f64>,
    /// Multiplier applied to the material opacity, if pressure drives it
    pub opacity: Option<Vec<f64>>,
}

impl StrokeFactors {
    pub fn is_empty(&self) -> bool {
        self.width.is_empty()
    }
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// EMA coefficient for a smoothing strength in 0..1
#[inline]
pub(crate) fn ema_alpha(smooth: f64) -> f64 {
    1.0 - EMA_STRENGTH * smooth.clamp(0.0, 1.0)
}

/// Deterministic hash noise in [-1, 1]
pub(crate) fn noise_1d(seed: u32, x: f64) -> f64 {
    let n = ((x + seed as f64 * 0.123_456_7) * 12.9898).sin() * 43_758.545_3;
    (n - n.floor()) * 2.0 - 1.0
}

/// EMA-smooth positions; pressure and time stay with the raw sample.
pub(crate) fn streamline(points: &[Sample], amount: f64) -> Vec<Sample> {
    if !(amount > 0.0) || points.is_empty() {
        return points.to_vec();
    }
    let alpha = ema_alpha(amount);
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    for cur in &points[1..] {
        let prev = out[out.len() - 1];
        out.push(Sample {
            x: prev.x + (cur.x - prev.x) * alpha,
            y: prev.y + (cur.y - prev.y) * alpha,
            pressure: cur.pressure,
            time: cur.time,
        });
    }
    out
}

/// Cumulative Euclidean distance along the centerline
pub(crate) fn arclength(points: &[Sample]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            acc += p.position().distance(points[i - 1].position());
        }
        out.push(acc);
    }
    out
}

/// Elapsed time since the first sample, never decreasing. Missing
/// timestamps fall back to the sample index as the clock.
pub(crate) fn cumulative_time(points: &[Sample]) -> Vec<f64> {
    let clock = |i: usize| points[i].time.unwrap_or(i as f64);
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for i in 0..points.len() {
        if i > 0 {
            acc += (clock(i) - clock(i - 1)).max(0.0);
        }
        out.push(acc);
    }
    out
}

/// Normalized speed (0..1) per point over a symmetric sample window
pub(crate) fn speed_norm(points: &[Sample], arclength: &[f64], cfg: &ThinningConfig) -> Vec<f64> {
    let n = points.len();
    let speed_ref = if cfg.speed_ref_px_per_ms > 0.0 {
        cfg.speed_ref_px_per_ms
    } else {
        vektor_config::DEFAULT_SPEED_REF_PX_PER_MS
    };
    let window = cfg.window.max(1);

    (0..n)
        .map(|i| {
            let i0 = i.saturating_sub(window);
            let i1 = (i + window).min(n - 1);
            let ds = arclength[i1] - arclength[i0];
            let dt = match (points[i0].time, points[i1].time) {
                (Some(t0), Some(t1)) => (t1 - t0).max(MIN_SPEED_DT_MS),
                // Index distance as a proxy, assuming a fixed sampling rate
                _ => (i1 - i0).max(1) as f64,
            };
            (ds / dt / speed_ref).clamp(0.0, 1.0)
        })
        .collect()
}

/// Compute width (and optionally opacity) factors for a centerline.
///
/// `config` is expected to be sanitized.
pub(crate) fn compute_factors(points: &[Sample], arclength: &[f64], config: &StrokeConfig) -> StrokeFactors {
    let n = points.len();
    let mode = config.pressure_mode;
    let curve = config.pressure_curve;
    let [w0, w1] = config.width_scale_range;
    let [o0, o1] = config.opacity_range;

    let thinning = config.thinning;
    let speed = thinning.map(|t| speed_norm(points, arclength, &t));
    let min_speed_scale = thinning.map_or(1.0, |t| t.min_speed_scale.clamp(0.0, 1.0));
    let exponent = thinning.map_or(1.0, |t| t.exponent.max(1.0));
    let invert = thinning.is_some_and(|t| t.invert);
    let thin_smooth = thinning.map_or(0.0, |t| t.smooth);
    let thin_alpha = ema_alpha(thin_smooth);

    let jitter = active_jitter(config.jitter);
    let jitter_clock = jitter.map(|j| match j.domain {
        JitterDomain::Distance => arclength.to_vec(),
        JitterDomain::Time => cumulative_time(points),
    });

    let mut width = Vec::with_capacity(n);
    let mut opacity = mode.affects_opacity().then(|| Vec::with_capacity(n));

    let mut prev_speed_width = 1.0;
    let mut prev_jitter = 1.0;

    for (i, sample) in points.iter().enumerate() {
        let p = if sample.pressure.is_finite() {
            sample.pressure.clamp(0.0, 1.0)
        } else {
            DEFAULT_PRESSURE
        };
        let curved = curve.apply(p);

        let press_width = if mode.affects_width() {
            lerp(w0, w1, curved)
        } else {
            1.0
        };

        let mut speed_width = match &speed {
            Some(speed) => {
                let t = speed[i].powf(exponent);
                if invert {
                    lerp(min_speed_scale, 1.0, t)
                } else {
                    lerp(1.0, min_speed_scale, t)
                }
            }
            None => 1.0,
        };
        if thin_smooth > 0.0 && i > 0 {
            speed_width = prev_speed_width + (speed_width - prev_speed_width) * thin_alpha;
        }
        prev_speed_width = speed_width;

        let mut jitter_factor = 1.0;
        if let (Some(j), Some(clock)) = (&jitter, &jitter_clock) {
            let raw = 1.0 + j.amplitude * noise_1d(j.seed, clock[i] * j.frequency);
            jitter_factor = if j.smooth > 0.0 && i > 0 {
                prev_jitter + (raw - prev_jitter) * ema_alpha(j.smooth)
            } else {
                raw
            };
            prev_jitter = jitter_factor;
        }

        width.push(press_width * speed_width * jitter_factor);
        if let Some(opacity) = opacity.as_mut() {
            opacity.push(lerp(o0, o1, curved));
        }
    }

    StrokeFactors { width, opacity }
}

fn active_jitter(jitter: Option<JitterConfig>) -> Option<JitterConfig> {
    jitter.filter(|j| j.amplitude > 0.0 && j.frequency > 0.0)
}
