//! Vektor stroke core - vector stroke geometry and batched rendering data
//!
//! This crate turns pointer samples into GPU-ready geometry:
//! - [`types`] - Samples, meshes, index buffers
//! - [`validation`] - Sample sanitizing and mesh chunk checks
//! - [`geom`] - Decimation, outline cleaning, stroke builder
//! - [`tess`] - Off-thread fill tessellation with stale-result rejection
//! - [`batch`] - Per-material merged buffers with token rollback
//! - [`history`] - Bounded undo/redo of reversible actions
//! - [`scene`] - Layers, standalone nodes and scene actions
//! - [`tools`] - Pen, vector pen, raster pen, contour brush, rope
//! - [`engine`] - The document context tying everything together
//!
//! Logging goes through `tracing`; the library installs no subscriber.

pub mod batch;
pub mod constants;
pub mod engine;
pub mod geom;
pub mod history;
pub mod scene;
pub mod tess;
pub mod tools;
pub mod types;
pub mod validation;

pub use batch::{Batch, BatchAppendToken, BatchError, BatchStyle, LayerBatch};
pub use constants::*;
pub use engine::{Committed, DrawingEngine, EngineError};
pub use geom::{
    Decimator, OffsetOutline, StripGeometry, StrokeBuild, StrokeBuilder, StrokeFactors, build_outer_polygon,
    build_stroke, clean_outline, decimate_by_distance, dedupe_consecutive, remove_nearly_collinear, simplify,
};
pub use history::{HistoryEntry, HistoryEvent, HistoryManager, Reversible};
pub use scene::{Layer, LayerId, NodeId, Scene, SceneAction, SceneMesh};
pub use tess::{SequenceGate, TessClient, TessError, TessWorker, accept_response, tessellate, triangulate};
pub use tools::{DrawingTool, PreviewThrottle, StrokeResult, Tool, ToolKind, ToolSettings};
pub use types::*;
pub use validation::*;

pub use vektor_config as config;
pub use vektor_ipc as ipc;
