use tracing::debug;
use vektor_config::{PreviewConfig, StrokeConfig, StrokeStyle};

use crate::scene::{LayerId, SceneMesh};
use crate::types::{MeshData, Sample};

use super::live::LiveStrip;
use super::{DrawingTool, Session, StrokeResult, ToolKind, ToolSettings, non_empty};

/// Rebuilds the full strip on every update and finishes as its own node
#[derive(Debug)]
pub struct VectorPenTool {
    style: StrokeStyle,
    session: Session,
    live: LiveStrip,
}

impl VectorPenTool {
    pub fn new(settings: &ToolSettings) -> Self {
        let unthrottled = PreviewConfig {
            decimate_px: 0.0,
            min_interval_ms: 0.0,
            min_distance_px: 0.0,
        };
        Self {
            style: settings.style,
            session: Session::default(),
            live: LiveStrip::new(settings.stroke.clone(), &unthrottled, 0.0),
        }
    }
}

impl DrawingTool for VectorPenTool {
    fn kind(&self) -> ToolKind {
        ToolKind::VectorPen
    }

    fn start(&mut self, layer: LayerId) {
        self.session.start(layer);
        self.live.reset();
    }

    fn update(&mut self, samples: &[Sample]) {
        let Some(first) = self.session.extend(samples) else {
            return;
        };
        self.live.push(&self.session.samples()[first..]);
    }

    fn end(&mut self) -> Option<StrokeResult> {
        let (layer, samples) = self.session.finish()?;
        self.live.reset();

        let build = self.live.builder().build(&samples);
        if build.is_empty() {
            debug!("VectorPenTool::end: no geometry");
            return None;
        }
        Some(StrokeResult::Mesh {
            layer,
            mesh: SceneMesh {
                mesh: build.strip.into(),
                style: self.style,
                control_points: Vec::new(),
            },
        })
    }

    fn cancel(&mut self) {
        self.session.cancel();
        self.live.reset();
    }

    fn preview(&self) -> Option<&MeshData> {
        non_empty(self.live.mesh())
    }

    fn is_drawing(&self) -> bool {
        self.session.is_active()
    }

    fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    fn set_stroke_config(&mut self, config: StrokeConfig) {
        self.live.set_config(config);
    }
}
