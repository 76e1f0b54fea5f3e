use tracing::debug;
use vektor_config::{PressureMode, StrokeConfig, StrokeStyle};

use crate::scene::{LayerId, SceneMesh};
use crate::types::{MeshData, Sample};

use super::live::LiveStrip;
use super::{DrawingTool, Session, StrokeResult, ToolKind, ToolSettings, non_empty};

/// Constant-width strip; pressure is ignored
#[derive(Debug)]
pub struct RopeTool {
    style: StrokeStyle,
    session: Session,
    live: LiveStrip,
}

fn without_pressure(mut config: StrokeConfig) -> StrokeConfig {
    config.pressure_mode = PressureMode::None;
    config
}

impl RopeTool {
    pub fn new(settings: &ToolSettings) -> Self {
        let preview = settings.preview.sanitized();
        Self {
            style: settings.style,
            session: Session::default(),
            live: LiveStrip::new(without_pressure(settings.stroke.clone()), &preview, preview.decimate_px),
        }
    }
}

impl DrawingTool for RopeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rope
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
            debug!("RopeTool::end: no geometry");
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
        self.live.set_config(without_pressure(config));
    }
}
