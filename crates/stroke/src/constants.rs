/// Largest vertex (and index) count addressed by a 16-bit index buffer,
/// keeping one value of headroom below `u16::MAX + 1`.
pub const U16_INDEX_LIMIT: usize = 65_535;

/// Segments shorter than this are treated as zero length.
pub const GEOM_EPSILON: f64 = 1e-6;

/// Smallest `|cos|` used when computing the miter scale.
pub const MIN_MITER_DOT: f64 = 1e-3;

/// Width factors are clamped into this range before offsetting.
pub const MIN_WIDTH_FACTOR: f64 = 0.05;
pub const MAX_WIDTH_FACTOR: f64 = 4.0;

/// EMA coefficient: `alpha = 1 - EMA_STRENGTH * smooth`.
pub const EMA_STRENGTH: f64 = 0.85;

/// Smallest time delta used for speed estimation (milliseconds).
pub const MIN_SPEED_DT_MS: f64 = 1e-4;

/// Corners turning less than this (radians) get no round join arc.
pub const ROUND_JOIN_MIN_TURN: f64 = 0.12;

/// Segment count bounds for a round join arc.
pub const ROUND_JOIN_MIN_SEGMENTS: usize = 2;
pub const ROUND_JOIN_MAX_SEGMENTS: usize = 12;

/// Segments along a round cap semicircle.
pub const ROUND_CAP_SEGMENTS: usize = 6;

/// Pressure used when the device reports none.
pub const DEFAULT_PRESSURE: f64 = 0.5;

/// Live decimation never keeps samples closer than this (pixels).
pub const MIN_DECIMATE_PX: f64 = 0.25;

/// Tolerance handed to the fill tessellator.
pub const FILL_TOLERANCE: f32 = 0.1;

/// Distance between raster pen dabs (pixels).
pub const DAB_SPACING_PX: f64 = 2.0;

/// Dab radius is `DAB_BASE_RADIUS + DAB_PRESSURE_RADIUS * pressure`.
pub const DAB_BASE_RADIUS: f64 = 2.0;
pub const DAB_PRESSURE_RADIUS: f64 = 3.0;

/// Rim vertices of one dab disc.
pub const DAB_SEGMENTS: usize = 8;

/// Tolerance used to simplify a contour into editable control points.
pub const CONTROL_POINT_TOLERANCE: f64 = 2.0;
