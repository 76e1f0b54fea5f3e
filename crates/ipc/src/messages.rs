//! Request/response pair exchanged with the tessellation worker.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;

/// Rule deciding which regions of a self-overlapping contour are inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindingRule {
    #[default]
    NonZero,
    Odd,
}

/// A contour vertex in the drawing's local space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContourPoint {
    pub x: f32,
    pub y: f32,
}

impl ContourPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Tessellation job sent to the worker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TessRequest {
    /// Per-tool monotonically increasing request number
    pub sequence: u64,
    pub contours: Vec<Vec<ContourPoint>>,
    pub winding_rule: WindingRule,
}

impl TessRequest {
    pub fn new(sequence: u64, contours: Vec<Vec<ContourPoint>>, winding_rule: WindingRule) -> Self {
        Self {
            sequence,
            contours,
            winding_rule,
        }
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Worker answer. Empty or absent buffers are a valid "no geometry" result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessResponse {
    pub sequence: u64,
    /// Flat `[x0, y0, x1, y1, ...]`
    pub positions: Vec<f32>,
    /// Triangle list
    pub indices: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TessResponse {
    /// A successful response with no geometry
    pub fn empty(sequence: u64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    /// A failed response; buffers are left empty
    pub fn failed(sequence: u64, error: impl Into<String>) -> Self {
        Self {
            sequence,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Check that the buffers describe a well-formed triangle list
    pub fn validate(&self) -> Result<(), IpcError> {
        if let Some(error) = &self.error {
            return Err(IpcError::Remote(error.clone()));
        }
        if self.positions.len() % 2 != 0 {
            return Err(IpcError::InvalidFormat(format!(
                "odd position buffer length {}",
                self.positions.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(IpcError::InvalidFormat(format!(
                "index count {} is not a triangle list",
                self.indices.len()
            )));
        }
        if self.positions.iter().any(|v| !v.is_finite()) {
            return Err(IpcError::InvalidFormat(
                "non-finite vertex position".to_string(),
            ));
        }
        let vertex_count = self.vertex_count();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(IpcError::IndexOutOfBounds {
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(json)?)
    }
}
