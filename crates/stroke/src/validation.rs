use crate::constants::DEFAULT_PRESSURE;
use crate::types::Sample;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Odd position buffer length: {0}")]
    OddPositions(usize),
    #[error("UV buffer length {uvs} does not match position length {positions}")]
    UvMismatch { positions: usize, uvs: usize },
    #[error("Index count {0} is not a triangle list")]
    RaggedIndices(usize),
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("Non-finite vertex position")]
    NonFinite,
}

/// Check that a mesh chunk is a well-formed, self-contained triangle list
pub fn validate_chunk(positions: &[f32], uvs: &[f32], indices: &[u32]) -> Result<(), ValidationError> {
    if positions.len() % 2 != 0 {
        return Err(ValidationError::OddPositions(positions.len()));
    }
    // An empty UV buffer means "fill with zeros"
    if !uvs.is_empty() && uvs.len() != positions.len() {
        return Err(ValidationError::UvMismatch {
            positions: positions.len(),
            uvs: uvs.len(),
        });
    }
    if indices.len() % 3 != 0 {
        return Err(ValidationError::RaggedIndices(indices.len()));
    }
    if positions.iter().any(|v| !v.is_finite()) {
        return Err(ValidationError::NonFinite);
    }
    let vertex_count = positions.len() / 2;
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ValidationError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }
    Ok(())
}

/// Check if a sample can be used for geometry
pub fn is_usable_sample(sample: &Sample) -> bool {
    sample.x.is_finite() && sample.y.is_finite()
}

/// Normalize a raw sample: clamp pressure and drop unusable timestamps.
///
/// Returns `None` when the position itself is not finite.
pub fn sanitize_sample(sample: &Sample) -> Option<Sample> {
    if !is_usable_sample(sample) {
        return None;
    }
    let pressure = if sample.pressure.is_finite() {
        sample.pressure.clamp(0.0, 1.0)
    } else {
        DEFAULT_PRESSURE
    };
    Some(Sample {
        x: sample.x,
        y: sample.y,
        pressure,
        time: sample.time.filter(|t| t.is_finite()),
    })
}
