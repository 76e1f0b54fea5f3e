//! Stroke geometry and material configuration.
//!
//! These are value objects pushed into the active tool by the UI. A tool
//! freezes its [`StrokeConfig`] for the duration of one geometry pass.

use serde::{Deserialize, Serialize};

/// Default full stroke width in pixels
pub const DEFAULT_BASE_WIDTH: f64 = 8.0;

/// Default miter limit (ratio of miter length to half width)
pub const DEFAULT_MITER_LIMIT: f64 = 2.0;

/// Default reference speed for thinning, in pixels per millisecond
pub const DEFAULT_SPEED_REF_PX_PER_MS: f64 = 0.5;

/// Which stroke attributes pressure drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureMode {
    None,
    #[default]
    Width,
    Opacity,
    Both,
}

impl PressureMode {
    pub fn affects_width(self) -> bool {
        matches!(self, PressureMode::Width | PressureMode::Both)
    }

    pub fn affects_opacity(self) -> bool {
        matches!(self, PressureMode::Opacity | PressureMode::Both)
    }
}

/// Response curve applied to normalized pressure before range mapping
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureCurve {
    #[default]
    Linear,
    Sqrt,
    Square,
    Exponent(f64),
}

impl PressureCurve {
    /// Apply the curve to a pressure value, clamping it to [0, 1] first
    pub fn apply(self, pressure: f64) -> f64 {
        let t = pressure.clamp(0.0, 1.0);
        match self {
            PressureCurve::Linear => t,
            PressureCurve::Sqrt => t.sqrt(),
            PressureCurve::Square => t * t,
            PressureCurve::Exponent(k) => t.powf(k),
        }
    }
}

/// Corner treatment between consecutive segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStyle {
    #[default]
    Miter,
    Bevel,
    Round,
}

/// End treatment at the first and last sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapStyle {
    #[default]
    Butt,
    Square,
    Round,
}

/// Progress parameter that drives jitter noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterDomain {
    /// Arclength in pixels
    #[default]
    Distance,
    /// Elapsed time in milliseconds
    Time,
}

/// Speed-based width thinning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinningConfig {
    /// Width scale at very high speed (0..1). 1 disables thinning.
    pub min_speed_scale: f64,
    /// Speed at which thinning saturates
    pub speed_ref_px_per_ms: f64,
    /// Half window (in samples) for speed estimation
    pub window: usize,
    /// Curve exponent (>= 1)
    pub exponent: f64,
    /// EMA smoothing strength (0..1) of the speed factor across the stroke
    pub smooth: f64,
    /// Fast strokes get thicker instead of thinner
    pub invert: bool,
}

impl Default for ThinningConfig {
    fn default() -> Self {
        Self {
            min_speed_scale: 1.0,
            speed_ref_px_per_ms: DEFAULT_SPEED_REF_PX_PER_MS,
            window: 1,
            exponent: 1.0,
            smooth: 0.0,
            invert: false,
        }
    }
}

/// Deterministic width noise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Fraction of width variation (0..1). 0 disables jitter.
    pub amplitude: f64,
    /// Noise cycles per unit of the progress domain
    pub frequency: f64,
    pub seed: u32,
    pub domain: JitterDomain,
    /// EMA smoothing strength (0..1)
    pub smooth: f64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            frequency: 0.0,
            seed: 0,
            domain: JitterDomain::Distance,
            smooth: 0.0,
        }
    }
}

/// Full geometry configuration for one stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    /// Full width in pixels
    pub base_width: f64,
    pub pressure_mode: PressureMode,
    pub pressure_curve: PressureCurve,
    /// Width scale at pressure 0 and 1
    pub width_scale_range: [f64; 2],
    /// Opacity scale at pressure 0 and 1
    pub opacity_range: [f64; 2],
    pub thinning: Option<ThinningConfig>,
    pub jitter: Option<JitterConfig>,
    /// Input smoothing (0..1). 0 = raw.
    pub streamline: f64,
    pub join: JoinStyle,
    pub miter_limit: f64,
    pub cap_start: CapStyle,
    pub cap_end: CapStyle,
}

impl Default for StrokeConfig {
    fn default() -> Self {
        Self {
            base_width: DEFAULT_BASE_WIDTH,
            pressure_mode: PressureMode::Width,
            pressure_curve: PressureCurve::Linear,
            width_scale_range: [0.5, 1.0],
            opacity_range: [0.5, 1.0],
            thinning: None,
            jitter: None,
            streamline: 0.0,
            join: JoinStyle::Miter,
            miter_limit: DEFAULT_MITER_LIMIT,
            cap_start: CapStyle::Butt,
            cap_end: CapStyle::Butt,
        }
    }
}

impl StrokeConfig {
    /// Create a config with the given width and defaults for everything else
    pub fn with_width(base_width: f64) -> Self {
        Self {
            base_width,
            ..Default::default()
        }
    }

    /// Clamp every field into the range the geometry engine expects
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        out.streamline = clamp_unit(out.streamline);
        out.miter_limit = if out.miter_limit.is_finite() {
            out.miter_limit.max(1.0)
        } else {
            DEFAULT_MITER_LIMIT
        };
        if let PressureCurve::Exponent(k) = out.pressure_curve {
            if !k.is_finite() || k <= 0.0 {
                out.pressure_curve = PressureCurve::Linear;
            }
        }
        out.thinning = out.thinning.map(|t| ThinningConfig {
            min_speed_scale: clamp_unit(t.min_speed_scale),
            speed_ref_px_per_ms: if t.speed_ref_px_per_ms > 0.0 {
                t.speed_ref_px_per_ms
            } else {
                DEFAULT_SPEED_REF_PX_PER_MS
            },
            window: t.window.max(1),
            exponent: if t.exponent.is_finite() {
                t.exponent.max(1.0)
            } else {
                1.0
            },
            smooth: clamp_unit(t.smooth),
            invert: t.invert,
        });
        out.jitter = out.jitter.map(|j| JitterConfig {
            amplitude: clamp_unit(j.amplitude),
            frequency: if j.frequency.is_finite() {
                j.frequency.max(0.0)
            } else {
                0.0
            },
            seed: j.seed,
            domain: j.domain,
            smooth: clamp_unit(j.smooth),
        });
        out
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

/// Compositing mode of a merged material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Add,
    Multiply,
    Screen,
    Erase,
}

impl BlendMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Add => "add",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Erase => "erase",
        }
    }

    /// Parse a blend mode name; unknown names fall back to `Normal`
    pub fn from_name(name: &str) -> Self {
        match name {
            "add" => BlendMode::Add,
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "erase" => BlendMode::Erase,
            _ => BlendMode::Normal,
        }
    }
}

/// Material descriptor of a finished stroke: tint, opacity and blend mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    /// 0xRRGGBB tint
    pub color: u32,
    /// 0.01..=1
    pub opacity: f32,
    pub blend_mode: BlendMode,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
        }
    }
}

impl StrokeStyle {
    pub fn new(color: u32, opacity: f32, blend_mode: BlendMode) -> Self {
        Self {
            color,
            opacity: if opacity.is_finite() {
                opacity.clamp(0.01, 1.0)
            } else {
                1.0
            },
            blend_mode,
        }
    }

    /// Material key shared by every stroke that can be merged with this one.
    ///
    /// Format: `blendMode|colorHex|round(opacity*1000)`
    pub fn material_key(&self) -> String {
        format!(
            "{}|{:x}|{}",
            self.blend_mode.as_str(),
            self.color,
            (self.opacity * 1000.0).round() as i64
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_curves() {
        assert!((PressureCurve::Linear.apply(0.25) - 0.25).abs() < 1e-12);
        assert!((PressureCurve::Sqrt.apply(0.25) - 0.5).abs() < 1e-12);
        assert!((PressureCurve::Square.apply(0.5) - 0.25).abs() < 1e-12);
        assert!((PressureCurve::Exponent(3.0).apply(0.5) - 0.125).abs() < 1e-12);
        // Out of range pressure is clamped first
        assert_eq!(PressureCurve::Linear.apply(1.7), 1.0);
        assert_eq!(PressureCurve::Sqrt.apply(-0.3), 0.0);
    }

    #[test]
    fn test_sanitized_clamps_fields() {
        let config = StrokeConfig {
            streamline: 3.0,
            miter_limit: 0.2,
            thinning: Some(ThinningConfig {
                min_speed_scale: -1.0,
                speed_ref_px_per_ms: 0.0,
                window: 0,
                exponent: 0.5,
                ..Default::default()
            }),
            jitter: Some(JitterConfig {
                amplitude: 4.0,
                frequency: -2.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let clean = config.sanitized();
        assert_eq!(clean.streamline, 1.0);
        assert_eq!(clean.miter_limit, 1.0);

        let thinning = clean.thinning.unwrap();
        assert_eq!(thinning.min_speed_scale, 0.0);
        assert_eq!(thinning.speed_ref_px_per_ms, DEFAULT_SPEED_REF_PX_PER_MS);
        assert_eq!(thinning.window, 1);
        assert_eq!(thinning.exponent, 1.0);

        let jitter = clean.jitter.unwrap();
        assert_eq!(jitter.amplitude, 1.0);
        assert_eq!(jitter.frequency, 0.0);
    }

    #[test]
    fn test_material_key_format() {
        let style = StrokeStyle::new(0xff8800, 0.5, BlendMode::Add);
        assert_eq!(style.material_key(), "add|ff8800|500");

        let style = StrokeStyle::new(0x000000, 1.0, BlendMode::Normal);
        assert_eq!(style.material_key(), "normal|0|1000");
    }

    #[test]
    fn test_blend_mode_fallback() {
        assert_eq!(BlendMode::from_name("screen"), BlendMode::Screen);
        assert_eq!(BlendMode::from_name("overlay"), BlendMode::Normal);
    }

    #[test]
    fn test_partial_config_from_ui() {
        // The UI only sends the fields it changed
        let json = r#"{ "base_width": 12.0, "join": "round", "pressure_curve": { "exponent": 2.0 } }"#;
        let config: StrokeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.base_width, 12.0);
        assert_eq!(config.join, JoinStyle::Round);
        assert_eq!(config.pressure_curve, PressureCurve::Exponent(2.0));
        assert_eq!(config.width_scale_range, [0.5, 1.0]);
        assert_eq!(config.cap_end, CapStyle::Butt);
    }
}
