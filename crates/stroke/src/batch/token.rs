use vektor_config::StrokeStyle;

/// Immutable record of one append: enough to truncate it away again or to
/// re-append the exact same data.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAppendToken {
    /// Key of the batch (or partition) that received the data
    pub key: String,
    pub style: StrokeStyle,
    pub positions: Vec<f32>,
    /// Normalized to one UV pair per vertex
    pub uvs: Vec<f32>,
    /// Chunk-local indices, before offsetting
    pub indices: Vec<u32>,
    pub prev_vertex_count: usize,
    pub prev_index_count: usize,
}

impl BatchAppendToken {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Batch vertex count right after this append
    pub fn end_vertex_count(&self) -> usize {
        self.prev_vertex_count + self.vertex_count()
    }

    /// Batch index count right after this append
    pub fn end_index_count(&self) -> usize {
        self.prev_index_count + self.index_count()
    }
}
