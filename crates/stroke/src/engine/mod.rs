//! Drawing engine
//!
//! This module provides the document context that connects:
//! - Input phases (from the host's pointer capture)
//! - Drawing tools (preview and final geometry)
//! - The scene model and per-layer batches
//! - Undo/redo history
//! - The tessellation worker
//!
//! There is no global state: hosts create one engine per document with
//! [`DrawingEngine::init`] and release it with [`DrawingEngine::dispose`].

mod stroke;
mod undo;

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use vektor_config::{EngineConfig, StrokeConfig, StrokeStyle};

use crate::history::{HistoryEvent, HistoryManager};
use crate::scene::{LayerId, Scene, SceneAction};
use crate::tess::{TessError, TessWorker};
use crate::tools::{
    ContourBrushTool, DrawingTool, PenTool, RasterPenTool, RopeTool, Tool, ToolKind, ToolSettings, VectorPenTool,
};
use crate::types::MeshData;

pub use stroke::Committed;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Tess(#[from] TessError),
}

/// One document's drawing state
///
/// Typical use:
/// 1. `handle_samples(Start, ..)`, `handle_samples(Move, ..)`*, `pump()` per frame
/// 2. `handle_samples(End, ..)` commits the stroke as an undoable action
/// 3. `undo` / `redo` replay actions against the scene
#[derive(Debug)]
pub struct DrawingEngine {
    pub(crate) config: EngineConfig,
    pub(crate) scene: Scene,
    pub(crate) history: HistoryManager<SceneAction>,
    pub(crate) worker: TessWorker,
    pub(crate) tools: Vec<Tool>,
    pub(crate) active_tool: ToolKind,
    pub(crate) active_layer: LayerId,
    pub(crate) disposed: bool,
}

impl DrawingEngine {
    /// Create an engine with one empty layer and the pen active
    pub fn init(config: EngineConfig) -> Result<Self, EngineError> {
        let mut config = config;
        config.stroke = config.stroke.sanitized();
        config.preview = config.preview.sanitized();

        let worker = TessWorker::spawn()?;
        let settings = ToolSettings {
            stroke: config.stroke.clone(),
            style: config.style,
            preview: config.preview,
        };
        let final_timeout = Duration::from_millis(config.tess.final_timeout_ms);
        let tools = ToolKind::ALL
            .into_iter()
            .map(|kind| match kind {
                ToolKind::Pen => Tool::Pen(PenTool::new(&settings)),
                ToolKind::VectorPen => Tool::VectorPen(VectorPenTool::new(&settings)),
                ToolKind::RasterPen => Tool::RasterPen(RasterPenTool::new(&settings)),
                ToolKind::ContourBrush => {
                    Tool::ContourBrush(ContourBrushTool::new(&settings, worker.client(), final_timeout))
                }
                ToolKind::Rope => Tool::Rope(RopeTool::new(&settings)),
            })
            .collect();

        let mut scene = Scene::new(config.batch);
        let active_layer = scene.add_layer();
        let history = HistoryManager::new(config.history.limit);

        info!(
            "DrawingEngine::init: history limit {}, final tessellation timeout {}ms",
            history.limit(),
            config.tess.final_timeout_ms
        );

        Ok(Self {
            config,
            scene,
            history,
            worker,
            tools,
            active_tool: ToolKind::Pen,
            active_layer,
            disposed: false,
        })
    }

    /// Cancel any stroke, stop the worker and drop history.
    ///
    /// Every later call is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for tool in &mut self.tools {
            tool.cancel();
        }
        self.worker.shutdown();
        self.history.clear();
        self.disposed = true;
        info!("DrawingEngine::dispose: done");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &HistoryManager<SceneAction> {
        &self.history
    }

    /// Forward history changes to `listener`
    pub fn add_history_listener<F>(&mut self, listener: F)
    where
        F: Fn(HistoryEvent) + Send + Sync + 'static,
    {
        self.history.add_listener(listener);
    }

    pub fn add_layer(&mut self) -> LayerId {
        self.scene.add_layer()
    }

    pub fn active_layer(&self) -> LayerId {
        self.active_layer
    }

    /// Target later strokes at `layer`. Returns false for an unknown layer.
    pub fn set_active_layer(&mut self, layer: LayerId) -> bool {
        if self.scene.layer(layer).is_none() {
            return false;
        }
        self.active_layer = layer;
        true
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    /// Switch tools. A stroke in progress on the old tool is cancelled.
    pub fn set_active_tool(&mut self, kind: ToolKind) {
        if kind == self.active_tool {
            return;
        }
        if let Some(tool) = self.tool_mut(self.active_tool) {
            if tool.is_drawing() {
                debug!("DrawingEngine::set_active_tool: cancelling stroke in progress");
                tool.cancel();
            }
        }
        info!("DrawingEngine: active tool {}", kind.as_str());
        self.active_tool = kind;
    }

    pub fn style(&self) -> StrokeStyle {
        self.config.style
    }

    /// Apply `style` to every tool. Strokes in progress pick it up on end.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.config.style = style;
        for tool in &mut self.tools {
            tool.set_style(style);
        }
    }

    /// Apply a new geometry configuration to every tool
    pub fn set_stroke_config(&mut self, config: StrokeConfig) {
        let config = config.sanitized();
        for tool in &mut self.tools {
            tool.set_stroke_config(config.clone());
        }
        self.config.stroke = config;
    }

    pub fn tool(&self, kind: ToolKind) -> Option<&Tool> {
        self.tools.iter().find(|t| t.kind() == kind)
    }

    pub(crate) fn tool_mut(&mut self, kind: ToolKind) -> Option<&mut Tool> {
        self.tools.iter_mut().find(|t| t.kind() == kind)
    }

    /// Live geometry of the active tool's stroke
    pub fn preview(&self) -> Option<&MeshData> {
        self.tool(self.active_tool).and_then(|t| t.preview())
    }

    /// Collect finished asynchronous work of the active tool
    pub fn pump(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(tool) = self.tool_mut(self.active_tool) {
            tool.poll();
        }
    }
}

impl Drop for DrawingEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PointerPhase, Sample};

    fn line(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(i as f64 * 5.0, 10.0, 0.5, i as f64 * 16.0))
            .collect()
    }

    #[test]
    fn test_engine_init() {
        let engine = DrawingEngine::init(EngineConfig::default()).unwrap();
        assert_eq!(engine.active_tool(), ToolKind::Pen);
        assert_eq!(engine.scene().layers().count(), 1);
        assert!(!engine.history().can_undo());
        for kind in ToolKind::ALL {
            assert!(engine.tool(kind).is_some());
        }
    }

    #[test]
    fn test_switching_tools_cancels_stroke() {
        let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();
        engine.handle_samples(PointerPhase::Start, &line(3));
        assert!(engine.is_drawing());
        engine.set_active_tool(ToolKind::Rope);
        assert!(!engine.is_drawing());
        assert!(engine.tool(ToolKind::Pen).is_some_and(|t| !t.is_drawing()));
    }

    #[test]
    fn test_set_active_layer() {
        let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();
        let second = engine.add_layer();
        assert!(engine.set_active_layer(second));
        assert!(!engine.set_active_layer(LayerId(99)));
        assert_eq!(engine.active_layer(), second);
    }

    #[test]
    fn test_dispose_stops_input() {
        let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();
        engine.dispose();
        assert!(engine.is_disposed());
        engine.handle_samples(PointerPhase::Start, &line(2));
        assert!(engine.handle_samples(PointerPhase::End, &line(4)).is_none());
        engine.dispose();
    }
}
