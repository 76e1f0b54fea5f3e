//! Merged per-material draw buffers
//!
//! Finished strokes that share a material (blend mode, tint, opacity) are
//! appended into one vertex/UV/index buffer per material key, so a layer
//! full of strokes costs a handful of draw calls. Every append returns a
//! [`BatchAppendToken`] that can exactly undo or redo it.
//!
//! When a batch's index width cannot address more vertices, a partition
//! `key#n` of the same material is started. Partition counters live as
//! long as the [`LayerBatch`].

mod buffer;
mod token;

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};
use vektor_config::{BatchConfig, StrokeStyle};

use crate::types::{IndexWidth, Indices, MeshData};
use crate::validation::{ValidationError, validate_chunk};

pub use buffer::GrowBuffer;
pub use token::BatchAppendToken;

/// Material descriptor of a batch
pub type BatchStyle = StrokeStyle;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("Invalid stroke geometry: {0}")]
    InvalidChunk(#[from] ValidationError),
    #[error("No batch with key {0}")]
    MissingBatch(String),
    #[error("Token for {key} expects {expected_vertices} vertices / {expected_indices} indices, batch has {vertex_count} / {index_count}")]
    RangeMismatch {
        key: String,
        expected_vertices: usize,
        expected_indices: usize,
        vertex_count: usize,
        index_count: usize,
    },
    #[error("Batch {key} cannot address {needed} vertices with {width:?} indices")]
    WidthOverflow {
        key: String,
        needed: usize,
        width: IndexWidth,
    },
}

/// One merged buffer set for a single material key
#[derive(Debug, Clone)]
pub struct Batch {
    key: String,
    style: BatchStyle,
    width: IndexWidth,
    positions: GrowBuffer<f32>,
    uvs: GrowBuffer<f32>,
    indices: GrowBuffer<u32>,
}

impl Batch {
    fn new(key: String, style: BatchStyle, width: IndexWidth) -> Self {
        Self {
            key,
            style,
            width,
            positions: GrowBuffer::new(),
            uvs: GrowBuffer::new(),
            indices: GrowBuffer::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn style(&self) -> &BatchStyle {
        &self.style
    }

    pub fn index_width(&self) -> IndexWidth {
        self.width
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.index_count() == 0
    }

    pub fn positions(&self) -> &[f32] {
        self.positions.as_slice()
    }

    pub fn uvs(&self) -> &[f32] {
        self.uvs.as_slice()
    }

    pub fn indices(&self) -> &[u32] {
        self.indices.as_slice()
    }

    pub fn position_bytes(&self) -> &[u8] {
        self.positions.as_bytes()
    }

    pub fn uv_bytes(&self) -> &[u8] {
        self.uvs.as_bytes()
    }

    /// Index buffer packed at the batch's width
    pub fn packed_indices(&self) -> Indices {
        Indices::pack(self.indices(), self.width).unwrap_or_else(|| Indices::U32(self.indices().to_vec()))
    }

    /// Copy of the merged mesh
    pub fn to_mesh(&self) -> MeshData {
        MeshData {
            positions: self.positions().to_vec(),
            uvs: self.uvs().to_vec(),
            indices: self.indices().to_vec(),
        }
    }

    fn can_fit(&self, extra_vertices: usize) -> bool {
        self.vertex_count() + extra_vertices <= self.width.max_vertices()
    }

    /// Append a validated chunk, offsetting its indices by the current
    /// vertex count.
    fn append(&mut self, positions: &[f32], uvs: &[f32], indices: &[u32]) -> Result<(), BatchError> {
        let added = positions.len() / 2;
        if !self.can_fit(added) {
            return Err(BatchError::WidthOverflow {
                key: self.key.clone(),
                needed: self.vertex_count() + added,
                width: self.width,
            });
        }
        let base = self.vertex_count() as u32;
        self.positions.append(positions);
        self.uvs.append(uvs);
        self.indices.append_mapped(indices, |i| i + base);
        Ok(())
    }

    fn truncate(&mut self, vertex_count: usize, index_count: usize) {
        self.positions.truncate_to(vertex_count * 2);
        self.uvs.truncate_to(vertex_count * 2);
        self.indices.truncate_to(index_count);
    }
}

/// All merged batches of one layer
#[derive(Debug, Default)]
pub struct LayerBatch {
    config: BatchConfig,
    batches: HashMap<String, Batch>,
    /// Back to front; new batches go to the back
    draw_order: Vec<String>,
    /// Material key -> key of the partition currently receiving appends
    active: HashMap<String, String>,
    /// Material key -> number of partitions ever created
    partitions: HashMap<String, u32>,
}

impl LayerBatch {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn batch(&self, key: &str) -> Option<&Batch> {
        self.batches.get(key)
    }

    /// Batches back to front
    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.draw_order.iter().filter_map(|key| self.batches.get(key))
    }

    pub fn draw_order(&self) -> &[String] {
        &self.draw_order
    }

    /// Merge a finished stroke into the batch of its material.
    ///
    /// Returns `None` (and logs) if the geometry is empty or malformed; no
    /// batch is touched in that case.
    pub fn append_stroke(&mut self, geometry: &MeshData, style: &BatchStyle) -> Option<BatchAppendToken> {
        match self.try_append(geometry, style) {
            Ok(token) => token,
            Err(e) => {
                warn!("LayerBatch::append_stroke: {}", e);
                None
            }
        }
    }

    /// Undo an append by truncating its batch back to the recorded counts.
    /// An emptied batch is removed.
    pub fn revert_append(&mut self, token: &BatchAppendToken) -> bool {
        match self.try_revert(token) {
            Ok(()) => true,
            Err(e) => {
                warn!("LayerBatch::revert_append: {}", e);
                false
            }
        }
    }

    /// Redo an append, recreating its batch if needed
    pub fn reapply_append(&mut self, token: &BatchAppendToken) -> bool {
        match self.try_reapply(token) {
            Ok(()) => true,
            Err(e) => {
                warn!("LayerBatch::reapply_append: {}", e);
                false
            }
        }
    }

    /// Drop every batch. Partition counters are kept.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.draw_order.clear();
        self.active.clear();
    }

    fn try_append(&mut self, geometry: &MeshData, style: &BatchStyle) -> Result<Option<BatchAppendToken>, BatchError> {
        let uvs = normalized_uvs(&geometry.positions, &geometry.uvs);
        validate_chunk(&geometry.positions, &uvs, &geometry.indices)?;
        if geometry.is_empty() {
            debug!("LayerBatch::append_stroke: empty geometry, nothing to merge");
            return Ok(None);
        }

        let added = geometry.vertex_count();
        let material = style.material_key();
        let mut key = self
            .active
            .get(&material)
            .cloned()
            .unwrap_or_else(|| material.clone());

        if self.batches.get(&key).is_some_and(|b| !b.can_fit(added)) {
            let counter = self.partitions.entry(material.clone()).or_insert(0);
            *counter += 1;
            key = format!("{}#{}", material, counter);
            debug!("LayerBatch: starting partition {}", key);
        }
        self.active.insert(material, key.clone());

        let width = self.width_for(added, geometry.indices.len());
        let batch = self.get_or_create(&key, style, width);
        let prev_vertex_count = batch.vertex_count();
        let prev_index_count = batch.index_count();
        batch.append(&geometry.positions, &uvs, &geometry.indices)?;

        debug!(
            "LayerBatch::append_stroke: {} +{} vertices (now {})",
            key,
            added,
            prev_vertex_count + added
        );

        Ok(Some(BatchAppendToken {
            key,
            style: *style,
            positions: geometry.positions.clone(),
            uvs,
            indices: geometry.indices.clone(),
            prev_vertex_count,
            prev_index_count,
        }))
    }

    fn try_revert(&mut self, token: &BatchAppendToken) -> Result<(), BatchError> {
        let batch = self
            .batches
            .get_mut(&token.key)
            .ok_or_else(|| BatchError::MissingBatch(token.key.clone()))?;

        if batch.vertex_count() != token.end_vertex_count() || batch.index_count() != token.end_index_count() {
            return Err(BatchError::RangeMismatch {
                key: token.key.clone(),
                expected_vertices: token.end_vertex_count(),
                expected_indices: token.end_index_count(),
                vertex_count: batch.vertex_count(),
                index_count: batch.index_count(),
            });
        }

        batch.truncate(token.prev_vertex_count, token.prev_index_count);
        if batch.is_empty() {
            self.remove_batch(&token.key);
        }
        Ok(())
    }

    fn try_reapply(&mut self, token: &BatchAppendToken) -> Result<(), BatchError> {
        validate_chunk(&token.positions, &token.uvs, &token.indices)?;
        let width = self.width_for(token.vertex_count(), token.index_count());
        let batch = self.get_or_create(&token.key, &token.style, width);

        if batch.vertex_count() != token.prev_vertex_count || batch.index_count() != token.prev_index_count {
            let err = BatchError::RangeMismatch {
                key: token.key.clone(),
                expected_vertices: token.prev_vertex_count,
                expected_indices: token.prev_index_count,
                vertex_count: batch.vertex_count(),
                index_count: batch.index_count(),
            };
            if batch.is_empty() {
                self.remove_batch(&token.key);
            }
            return Err(err);
        }
        batch.append(&token.positions, &token.uvs, &token.indices)
    }

    fn width_for(&self, vertex_count: usize, index_count: usize) -> IndexWidth {
        if self.config.narrow_indices {
            IndexWidth::for_counts(vertex_count, index_count)
        } else {
            IndexWidth::U32
        }
    }

    fn get_or_create(&mut self, key: &str, style: &BatchStyle, width: IndexWidth) -> &mut Batch {
        if !self.batches.contains_key(key) {
            debug!("LayerBatch: new batch {} ({:?})", key, width);
            self.draw_order.insert(0, key.to_string());
        }
        self.batches
            .entry(key.to_string())
            .or_insert_with(|| Batch::new(key.to_string(), *style, width))
    }

    fn remove_batch(&mut self, key: &str) {
        self.batches.remove(key);
        self.draw_order.retain(|k| k != key);
        debug!("LayerBatch: removed empty batch {}", key);
    }
}

/// One UV pair per vertex: extra values are dropped, missing ones are zero
fn normalized_uvs(positions: &[f32], uvs: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0; positions.len()];
    let n = out.len().min(uvs.len());
    out[..n].copy_from_slice(&uvs[..n]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vektor_config::BlendMode;

    fn quad(x: f32) -> MeshData {
        MeshData {
            positions: vec![x, 0.0, x + 1.0, 0.0, x + 1.0, 1.0, x, 1.0],
            uvs: vec![],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    fn red() -> BatchStyle {
        StrokeStyle::new(0xff0000, 1.0, BlendMode::Normal)
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut layer = LayerBatch::new(BatchConfig::default());
        let t1 = layer.append_stroke(&quad(0.0), &red()).unwrap();
        let t2 = layer.append_stroke(&quad(5.0), &red()).unwrap();
        assert_eq!(t1.key, t2.key);
        assert_eq!(t2.prev_vertex_count, 4);
        assert_eq!(t2.prev_index_count, 6);

        let batch = layer.batch(&t1.key).unwrap();
        assert_eq!(batch.vertex_count(), 8);
        assert_eq!(&batch.indices()[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(batch.uvs().len(), batch.positions().len());
        assert_eq!(batch.index_width(), IndexWidth::U16);
    }

    #[test]
    fn test_materials_get_separate_batches() {
        let mut layer = LayerBatch::new(BatchConfig::default());
        let blue = StrokeStyle::new(0x0000ff, 0.5, BlendMode::Multiply);
        let a = layer.append_stroke(&quad(0.0), &red()).unwrap();
        let b = layer.append_stroke(&quad(0.0), &blue).unwrap();
        assert_ne!(a.key, b.key);
        // Newest batch sits at the back
        assert_eq!(layer.draw_order(), &[b.key.clone(), a.key.clone()]);
    }

    #[test]
    fn test_revert_restores_bytes() {
        let mut layer = LayerBatch::new(BatchConfig::default());
        let first = layer.append_stroke(&quad(0.0), &red()).unwrap();
        let before = layer.batch(&first.key).unwrap().to_mesh();

        let token = layer.append_stroke(&quad(3.0), &red()).unwrap();
        assert!(layer.revert_append(&token));
        let after = layer.batch(&first.key).unwrap();
        assert_eq!(after.position_bytes(), bytemuck::cast_slice::<f32, u8>(&before.positions));
        assert_eq!(after.indices(), &before.indices[..]);

        // Reverting the first append removes the batch entirely
        assert!(layer.revert_append(&first));
        assert!(layer.batch(&first.key).is_none());
        assert!(layer.draw_order().is_empty());
    }

    #[test]
    fn test_reapply_reproduces_ranges() {
        let mut layer = LayerBatch::new(BatchConfig::default());
        let a = layer.append_stroke(&quad(0.0), &red()).unwrap();
        let b = layer.append_stroke(&quad(2.0), &red()).unwrap();
        let merged = layer.batch(&a.key).unwrap().to_mesh();

        for _ in 0..3 {
            assert!(layer.revert_append(&b));
            assert!(layer.revert_append(&a));
            assert!(layer.is_empty());
            assert!(layer.reapply_append(&a));
            assert!(layer.reapply_append(&b));
            assert_eq!(layer.batch(&a.key).unwrap().to_mesh(), merged);
        }
    }

    #[test]
    fn test_out_of_order_revert_is_rejected() {
        let mut layer = LayerBatch::new(BatchConfig::default());
        let a = layer.append_stroke(&quad(0.0), &red()).unwrap();
        let _b = layer.append_stroke(&quad(2.0), &red()).unwrap();
        assert!(!layer.revert_append(&a));
        assert_eq!(layer.batch(&a.key).unwrap().vertex_count(), 8);
    }

    #[test]
    fn test_invalid_geometry_leaves_batches_untouched() {
        let mut layer = LayerBatch::new(BatchConfig::default());
        let a = layer.append_stroke(&quad(0.0), &red()).unwrap();
        let mut bad = quad(1.0);
        bad.indices[2] = 9;
        assert!(layer.append_stroke(&bad, &red()).is_none());
        let mut odd = quad(1.0);
        odd.positions.pop();
        assert!(layer.append_stroke(&odd, &red()).is_none());
        assert!(layer.append_stroke(&MeshData::default(), &red()).is_none());
        assert_eq!(layer.batch(&a.key).unwrap().vertex_count(), 4);
    }

    #[test]
    fn test_partition_at_u16_limit() {
        let mut layer = LayerBatch::new(BatchConfig::default());
        let verts = 40_000;
        let big = MeshData {
            positions: vec![0.0; verts * 2],
            uvs: vec![],
            indices: vec![0, 1, 2],
        };
        let a = layer.append_stroke(&big, &red()).unwrap();
        let b = layer.append_stroke(&big, &red()).unwrap();
        assert_eq!(b.key, format!("{}#1", a.key));
        assert_eq!(b.prev_vertex_count, 0);
        assert_eq!(layer.len(), 2);

        // Counters persist: emptying the partition and appending again
        // keeps using the partition key
        assert!(layer.revert_append(&b));
        let c = layer.append_stroke(&big, &red()).unwrap();
        assert_eq!(c.key, b.key);

        let d = layer.append_stroke(&big, &red()).unwrap();
        assert_eq!(d.key, format!("{}#2", a.key));
    }

    #[test]
    fn test_wide_indices_never_partition() {
        let mut layer = LayerBatch::new(BatchConfig {
            narrow_indices: false,
        });
        let big = MeshData {
            positions: vec![0.0; 40_000 * 2],
            uvs: vec![],
            indices: vec![0, 1, 2],
        };
        let a = layer.append_stroke(&big, &red()).unwrap();
        let b = layer.append_stroke(&big, &red()).unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(layer.batch(&a.key).unwrap().index_width(), IndexWidth::U32);
    }
}
