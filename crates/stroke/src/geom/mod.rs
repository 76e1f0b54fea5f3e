//! Pure geometry: decimation, outline cleanup and stroke synthesis.

pub mod clean;
pub mod decimate;
pub mod stroke_builder;

pub use clean::{clean_outline, dedupe_consecutive, remove_nearly_collinear, simplify};
pub use decimate::{Decimator, decimate_by_distance};
pub use stroke_builder::{
    OffsetOutline, StripGeometry, StrokeBuild, StrokeBuilder, StrokeFactors, build_outer_polygon, build_stroke,
};
