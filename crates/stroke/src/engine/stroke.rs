//! Input routing and stroke commits for the drawing engine

use tracing::{debug, warn};

use crate::scene::{LayerId, NodeId, SceneAction};
use crate::tools::{DrawingTool, StrokeResult};
use crate::types::{PointerPhase, Sample};

use super::DrawingEngine;

/// Where a finished stroke ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Committed {
    /// Merged into the batch with this key
    Batch { layer: LayerId, key: String },
    /// Attached as a standalone node
    Node { layer: LayerId, node: NodeId },
}

impl DrawingEngine {
    /// Route one input phase to the active tool.
    ///
    /// Samples that arrive with `Start` or `End` are fed to the tool before
    /// the phase transition. Returns where the stroke went when `End`
    /// produced drawable geometry.
    pub fn handle_samples(&mut self, phase: PointerPhase, samples: &[Sample]) -> Option<Committed> {
        if self.disposed {
            debug!("handle_samples: engine disposed, ignoring {:?}", phase);
            return None;
        }
        let layer = self.active_layer;
        let tool = self.tool_mut(self.active_tool)?;

        match phase {
            PointerPhase::Start => {
                tool.start(layer);
                if !samples.is_empty() {
                    tool.update(samples);
                }
                None
            }
            PointerPhase::Move => {
                tool.update(samples);
                tool.poll();
                None
            }
            PointerPhase::End => {
                if !tool.is_drawing() {
                    return None;
                }
                if !samples.is_empty() {
                    tool.update(samples);
                }
                let result = tool.end()?;
                self.commit(result)
            }
            PointerPhase::Cancel => {
                tool.cancel();
                None
            }
        }
    }

    /// True while the active tool has a stroke in progress
    pub fn is_drawing(&self) -> bool {
        self.tool(self.active_tool).is_some_and(|t| t.is_drawing())
    }

    /// Apply a finished stroke to the scene and record it in history
    pub(crate) fn commit(&mut self, result: StrokeResult) -> Option<Committed> {
        match result {
            StrokeResult::Batched { layer, mesh, style } => {
                let Some(batch) = self.scene.batch_mut(layer) else {
                    warn!("commit: layer {:?} no longer exists", layer);
                    return None;
                };
                let token = batch.append_stroke(&mesh, &style)?;
                let key = token.key.clone();
                self.history.push(SceneAction::batch_append(layer, token));
                debug!("commit: merged stroke into {}", key);
                Some(Committed::Batch { layer, key })
            }
            StrokeResult::Mesh { layer, mesh } => {
                if self.scene.layer(layer).is_none() {
                    warn!("commit: layer {:?} no longer exists", layer);
                    return None;
                }
                let node = self.scene.insert_node(mesh);
                let index = self.scene.add_child(layer, node, None)?;
                self.history.push(SceneAction::add_child(layer, node, index));
                debug!("commit: added node {:?} at {}", node, index);
                Some(Committed::Node { layer, node })
            }
        }
    }

    /// Detach `node` from `layer` as an undoable action
    pub fn remove_node(&mut self, layer: LayerId, node: NodeId) -> bool {
        let Some(index) = self.scene.remove_child(layer, node) else {
            return false;
        };
        self.history.push(SceneAction::remove_child(layer, node, index));
        true
    }
}
