//! Drawing tools
//!
//! Every tool follows the same lifecycle, driven by pointer phases:
//! `start(layer)` → `update(samples)`* → `end()` or `cancel()`. Between
//! updates the host may call `poll()` to collect asynchronous work and
//! `preview()` to fetch the live mesh.
//!
//! - [`PenTool`] - decimated, throttled strip preview; merged into the layer batch
//! - [`VectorPenTool`] - strip preview on every update; standalone mesh
//! - [`RasterPenTool`] - distance-spaced disc dabs; merged into the layer batch
//! - [`ContourBrushTool`] - off-thread fill of the cleaned outer contour
//! - [`RopeTool`] - pressure-free throttled strip; standalone mesh

mod contour_brush;
mod live;
mod pen;
pub mod preview;
mod raster_pen;
mod rope;
mod vector_pen;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vektor_config::{PreviewConfig, StrokeConfig, StrokeStyle};

use crate::scene::{LayerId, SceneMesh};
use crate::types::{MeshData, Sample};
use crate::validation::sanitize_sample;

pub use contour_brush::ContourBrushTool;
pub use pen::PenTool;
pub use preview::PreviewThrottle;
pub use raster_pen::{Dab, DabSpacer, RasterPenTool, dab_radius, disc_mesh};
pub use rope::RopeTool;
pub use vector_pen::VectorPenTool;

/// The closed set of drawing tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Pen,
    VectorPen,
    RasterPen,
    ContourBrush,
    Rope,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::Pen,
        ToolKind::VectorPen,
        ToolKind::RasterPen,
        ToolKind::ContourBrush,
        ToolKind::Rope,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::VectorPen => "vector-pen",
            ToolKind::RasterPen => "raster-pen",
            ToolKind::ContourBrush => "contour-brush",
            ToolKind::Rope => "rope",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// What a finished stroke turns into
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeResult {
    /// Geometry to merge into the layer's batch for `style`
    Batched {
        layer: LayerId,
        mesh: MeshData,
        style: StrokeStyle,
    },
    /// A standalone scene node
    Mesh { layer: LayerId, mesh: SceneMesh },
}

impl StrokeResult {
    pub fn layer(&self) -> LayerId {
        match self {
            StrokeResult::Batched { layer, .. } | StrokeResult::Mesh { layer, .. } => *layer,
        }
    }

    pub fn mesh(&self) -> &MeshData {
        match self {
            StrokeResult::Batched { mesh, .. } => mesh,
            StrokeResult::Mesh { mesh, .. } => &mesh.mesh,
        }
    }
}

/// Common interface of every drawing tool
pub trait DrawingTool {
    fn kind(&self) -> ToolKind;

    /// Begin a stroke on `layer`, discarding any previous one
    fn start(&mut self, layer: LayerId);

    /// Feed new samples. Ignored when no stroke is active.
    fn update(&mut self, samples: &[Sample]);

    /// Collect finished asynchronous work
    fn poll(&mut self) {}

    /// Finish the stroke. `None` if nothing drawable was produced.
    fn end(&mut self) -> Option<StrokeResult>;

    /// Drop the stroke and its preview
    fn cancel(&mut self);

    /// Live geometry of the stroke in progress
    fn preview(&self) -> Option<&MeshData>;

    fn is_drawing(&self) -> bool;

    fn set_style(&mut self, style: StrokeStyle);

    fn set_stroke_config(&mut self, config: StrokeConfig);
}

/// Tagged dispatch over the tool set
#[derive(Debug)]
pub enum Tool {
    Pen(PenTool),
    VectorPen(VectorPenTool),
    RasterPen(RasterPenTool),
    ContourBrush(ContourBrushTool),
    Rope(RopeTool),
}

macro_rules! dispatch {
    ($self:expr, $tool:ident => $body:expr) => {
        match $self {
            Tool::Pen($tool) => $body,
            Tool::VectorPen($tool) => $body,
            Tool::RasterPen($tool) => $body,
            Tool::ContourBrush($tool) => $body,
            Tool::Rope($tool) => $body,
        }
    };
}

impl DrawingTool for Tool {
    fn kind(&self) -> ToolKind {
        dispatch!(self, t => t.kind())
    }

    fn start(&mut self, layer: LayerId) {
        dispatch!(self, t => t.start(layer))
    }

    fn update(&mut self, samples: &[Sample]) {
        dispatch!(self, t => t.update(samples))
    }

    fn poll(&mut self) {
        dispatch!(self, t => t.poll())
    }

    fn end(&mut self) -> Option<StrokeResult> {
        dispatch!(self, t => t.end())
    }

    fn cancel(&mut self) {
        dispatch!(self, t => t.cancel())
    }

    fn preview(&self) -> Option<&MeshData> {
        dispatch!(self, t => t.preview())
    }

    fn is_drawing(&self) -> bool {
        dispatch!(self, t => t.is_drawing())
    }

    fn set_style(&mut self, style: StrokeStyle) {
        dispatch!(self, t => t.set_style(style))
    }

    fn set_stroke_config(&mut self, config: StrokeConfig) {
        dispatch!(self, t => t.set_stroke_config(config))
    }
}

/// Settings every tool is created with
#[derive(Debug, Clone, Default)]
pub struct ToolSettings {
    pub stroke: StrokeConfig,
    pub style: StrokeStyle,
    pub preview: PreviewConfig,
}

/// Samples and target layer of the stroke in progress
#[derive(Debug, Default)]
pub(crate) struct Session {
    layer: Option<LayerId>,
    samples: Vec<Sample>,
}

impl Session {
    pub(crate) fn start(&mut self, layer: LayerId) {
        self.layer = Some(layer);
        self.samples.clear();
    }

    pub(crate) fn is_active(&self) -> bool {
        self.layer.is_some()
    }

    pub(crate) fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Append sanitized samples. Returns the index of the first new one,
    /// or `None` if no stroke is active or nothing usable arrived.
    pub(crate) fn extend(&mut self, samples: &[Sample]) -> Option<usize> {
        self.layer?;
        let first = self.samples.len();
        self.samples.extend(samples.iter().filter_map(sanitize_sample));
        let dropped = samples.len() - (self.samples.len() - first);
        if dropped > 0 {
            debug!("Session::extend: dropped {} unusable samples", dropped);
        }
        (self.samples.len() > first).then_some(first)
    }

    pub(crate) fn finish(&mut self) -> Option<(LayerId, Vec<Sample>)> {
        let layer = self.layer.take()?;
        Some((layer, std::mem::take(&mut self.samples)))
    }

    pub(crate) fn cancel(&mut self) {
        self.layer = None;
        self.samples.clear();
    }
}

pub(crate) fn non_empty(mesh: &MeshData) -> Option<&MeshData> {
    (!mesh.is_empty()).then_some(mesh)
}
