//! In-memory model of the scene collaborator
//!
//! The renderer owns the real scene graph; the core only needs to know
//! which standalone meshes are attached to which layer, in what order, and
//! which merged batches each layer carries. Nodes stay in the store after
//! being detached so undo/redo can re-attach them.

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vektor_config::{BatchConfig, StrokeStyle};

use crate::batch::{BatchAppendToken, LayerBatch};
use crate::history::Reversible;
use crate::types::MeshData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// A finished stroke kept as its own mesh
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMesh {
    pub mesh: MeshData,
    pub style: StrokeStyle,
    /// Simplified centerline for later editing, if the tool produced one
    pub control_points: Vec<DVec2>,
}

/// One drawing layer: ordered standalone nodes plus merged batches
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    children: Vec<NodeId>,
    batch: LayerBatch,
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Attached nodes, back to front
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn batch(&self) -> &LayerBatch {
        &self.batch
    }

    pub fn batch_mut(&mut self) -> &mut LayerBatch {
        &mut self.batch
    }
}

#[derive(Debug)]
pub struct Scene {
    batch_config: BatchConfig,
    layers: Vec<Layer>,
    nodes: HashMap<NodeId, SceneMesh>,
    next_layer: u32,
    next_node: u64,
}

impl Scene {
    pub fn new(batch_config: BatchConfig) -> Self {
        Self {
            batch_config,
            layers: Vec::new(),
            nodes: HashMap::new(),
            next_layer: 0,
            next_node: 0,
        }
    }

    pub fn add_layer(&mut self) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.push(Layer {
            id,
            children: Vec::new(),
            batch: LayerBatch::new(self.batch_config),
        });
        debug!("Scene: added layer {:?}", id);
        id
    }

    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Store a mesh without attaching it anywhere
    pub fn insert_node(&mut self, mesh: SceneMesh) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, mesh);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneMesh> {
        self.nodes.get(&id)
    }

    /// Attach `node` to `layer` at `index` (clamped), or on top when
    /// `index` is `None`. Returns the index it landed at.
    pub fn add_child(&mut self, layer: LayerId, node: NodeId, index: Option<usize>) -> Option<usize> {
        if !self.nodes.contains_key(&node) {
            warn!("Scene::add_child: unknown node {:?}", node);
            return None;
        }
        let Some(layer) = self.layer_mut(layer) else {
            warn!("Scene::add_child: unknown layer {:?}", layer);
            return None;
        };
        if let Some(existing) = layer.children.iter().position(|&n| n == node) {
            return Some(existing);
        }
        let at = index.unwrap_or(layer.children.len()).min(layer.children.len());
        layer.children.insert(at, node);
        Some(at)
    }

    /// Detach `node` from `layer`. Returns the index it had.
    pub fn remove_child(&mut self, layer: LayerId, node: NodeId) -> Option<usize> {
        let layer = self.layer_mut(layer)?;
        let index = layer.children.iter().position(|&n| n == node)?;
        layer.children.remove(index);
        Some(index)
    }

    pub fn child_index(&self, layer: LayerId, node: NodeId) -> Option<usize> {
        self.layer(layer)?.children.iter().position(|&n| n == node)
    }

    pub fn batch_mut(&mut self, layer: LayerId) -> Option<&mut LayerBatch> {
        self.layer_mut(layer).map(Layer::batch_mut)
    }
}

/// Undoable scene mutation
#[derive(Debug, Clone, PartialEq)]
pub enum SceneAction {
    AddChild {
        layer: LayerId,
        node: NodeId,
        index: usize,
    },
    RemoveChild {
        layer: LayerId,
        node: NodeId,
        index: usize,
    },
    BatchAppend {
        layer: LayerId,
        token: BatchAppendToken,
    },
}

impl SceneAction {
    /// Undo detaches the node; redo re-attaches it at `index`
    pub fn add_child(layer: LayerId, node: NodeId, index: usize) -> Self {
        SceneAction::AddChild { layer, node, index }
    }

    /// Undo re-attaches the node at `index`; redo detaches it
    pub fn remove_child(layer: LayerId, node: NodeId, index: usize) -> Self {
        SceneAction::RemoveChild { layer, node, index }
    }

    /// Undo truncates the batch; redo re-appends the token's data
    pub fn batch_append(layer: LayerId, token: BatchAppendToken) -> Self {
        SceneAction::BatchAppend { layer, token }
    }
}

impl Reversible for SceneAction {
    type Target = Scene;

    fn undo(&self, scene: &mut Scene) {
        match self {
            SceneAction::AddChild { layer, node, .. } => {
                scene.remove_child(*layer, *node);
            }
            SceneAction::RemoveChild { layer, node, index } => {
                scene.add_child(*layer, *node, Some(*index));
            }
            SceneAction::BatchAppend { layer, token } => match scene.batch_mut(*layer) {
                Some(batch) => {
                    batch.revert_append(token);
                }
                None => warn!("SceneAction::undo: unknown layer {:?}", layer),
            },
        }
    }

    fn redo(&self, scene: &mut Scene) {
        match self {
            SceneAction::AddChild { layer, node, index } => {
                scene.add_child(*layer, *node, Some(*index));
            }
            SceneAction::RemoveChild { layer, node, .. } => {
                scene.remove_child(*layer, *node);
            }
            SceneAction::BatchAppend { layer, token } => match scene.batch_mut(*layer) {
                Some(batch) => {
                    batch.reapply_append(token);
                }
                None => warn!("SceneAction::redo: unknown layer {:?}", layer),
            },
        }
    }

    fn label(&self) -> &str {
        match self {
            SceneAction::AddChild { .. } => "addChild",
            SceneAction::RemoveChild { .. } => "removeChild",
            SceneAction::BatchAppend { .. } => "batchAppend",
        }
    }
}
