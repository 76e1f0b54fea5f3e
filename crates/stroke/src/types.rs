use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A raw pointer sample, already projected into the drawing's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    /// Normalized pressure 0..1
    pub pressure: f64,
    /// Timestamp in milliseconds; `None` when the device reports no time
    #[serde(default)]
    pub time: Option<f64>,
}

impl Sample {
    pub fn new(x: f64, y: f64, pressure: f64, time: f64) -> Self {
        Self {
            x,
            y,
            pressure,
            time: Some(time),
        }
    }

    /// A sample without a timestamp
    pub fn untimed(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            x,
            y,
            pressure,
            time: None,
        }
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Anything with a 2D position, so decimation and cleaning work on samples
/// and on plain points alike.
pub trait Positioned {
    fn position(&self) -> DVec2;
}

impl Positioned for Sample {
    #[inline]
    fn position(&self) -> DVec2 {
        Sample::position(self)
    }
}

impl Positioned for DVec2 {
    #[inline]
    fn position(&self) -> DVec2 {
        *self
    }
}

/// Pointer lifecycle phase delivered by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Width of an index buffer element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Narrowest width that can address `vertex_count` vertices and hold
    /// `index_count` indices with the 16-bit safety margin.
    pub fn for_counts(vertex_count: usize, index_count: usize) -> Self {
        if vertex_count <= crate::constants::U16_INDEX_LIMIT
            && index_count <= crate::constants::U16_INDEX_LIMIT
        {
            IndexWidth::U16
        } else {
            IndexWidth::U32
        }
    }

    /// Largest vertex count a buffer of this width can address
    pub fn max_vertices(self) -> usize {
        match self {
            IndexWidth::U16 => crate::constants::U16_INDEX_LIMIT,
            IndexWidth::U32 => u32::MAX as usize,
        }
    }
}

/// An index buffer packed at a chosen width
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    /// Pack `indices` at `width`. Returns `None` if a value does not fit.
    pub fn pack(indices: &[u32], width: IndexWidth) -> Option<Self> {
        match width {
            IndexWidth::U32 => Some(Indices::U32(indices.to_vec())),
            IndexWidth::U16 => indices
                .iter()
                .map(|&i| u16::try_from(i).ok())
                .collect::<Option<Vec<u16>>>()
                .map(Indices::U16),
        }
    }

    pub fn width(&self) -> IndexWidth {
        match self {
            Indices::U16(_) => IndexWidth::U16,
            Indices::U32(_) => IndexWidth::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(v) => bytemuck::cast_slice(v),
            Indices::U32(v) => bytemuck::cast_slice(v),
        }
    }

    /// Widen back to 32-bit values
    pub fn to_u32(&self) -> Vec<u32> {
        match self {
            Indices::U16(v) => v.iter().map(|&i| i as u32).collect(),
            Indices::U32(v) => v.clone(),
        }
    }
}

/// Filled mesh produced by the tessellator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Flat `[x0, y0, x1, y1, ...]`
    pub positions: Vec<f32>,
    /// Triangle list
    pub indices: Vec<u32>,
}

impl Triangulation {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Index width the caller should use for this mesh
    pub fn index_width(&self) -> IndexWidth {
        IndexWidth::for_counts(self.vertex_count(), self.indices.len())
    }
}

/// Vertex/UV/index buffers of one mesh, as consumed by the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.indices.clear();
    }
}

impl From<Triangulation> for MeshData {
    fn from(tri: Triangulation) -> Self {
        let uvs = vec![0.0; tri.positions.len()];
        Self {
            positions: tri.positions,
            uvs,
            indices: tri.indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_width_choice() {
        assert_eq!(IndexWidth::for_counts(4, 6), IndexWidth::U16);
        assert_eq!(IndexWidth::for_counts(65_535, 6), IndexWidth::U16);
        assert_eq!(IndexWidth::for_counts(65_536, 6), IndexWidth::U32);
        assert_eq!(IndexWidth::for_counts(10, 70_000), IndexWidth::U32);
    }

    #[test]
    fn test_indices_pack() {
        let packed = Indices::pack(&[0, 1, 2], IndexWidth::U16).unwrap();
        assert_eq!(packed, Indices::U16(vec![0, 1, 2]));
        assert_eq!(packed.as_bytes().len(), 6);
        assert!(Indices::pack(&[0, 70_000], IndexWidth::U16).is_none());
        assert_eq!(
            Indices::pack(&[0, 70_000], IndexWidth::U32).unwrap().to_u32(),
            vec![0, 70_000]
        );
    }
}
