//! Pressure pen: cheap live preview, full-quality merged result.

use tracing::debug;
use vektor_config::{StrokeConfig, StrokeStyle};

use crate::constants::MIN_DECIMATE_PX;
use crate::scene::LayerId;
use crate::types::{MeshData, Sample};

use super::live::LiveStrip;
use super::{DrawingTool, Session, StrokeResult, ToolKind, ToolSettings, non_empty};

/// Preview runs on decimated samples; the final strip uses every sample
/// and is merged into the layer batch.
#[derive(Debug)]
pub struct PenTool {
    style: StrokeStyle,
    session: Session,
    live: LiveStrip,
}

impl PenTool {
    pub fn new(settings: &ToolSettings) -> Self {
        let min_dist = settings.preview.sanitized().decimate_px.max(MIN_DECIMATE_PX);
        Self {
            style: settings.style,
            session: Session::default(),
            live: LiveStrip::new(settings.stroke.clone(), &settings.preview, min_dist),
        }
    }
}

impl DrawingTool for PenTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pen
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
            debug!("PenTool::end: {} samples produced no geometry", samples.len());
            return None;
        }
        Some(StrokeResult::Batched {
            layer,
            mesh: build.strip.into(),
            style: self.style,
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
