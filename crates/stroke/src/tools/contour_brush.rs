//! Contour brush
//!
//! Fills the cleaned outer contour of the stroke outline instead of drawing
//! a strip, which removes self-overlap artifacts. Preview fills are
//! computed off-thread: one request in flight at a time, newer input marks
//! the preview dirty and is re-requested as soon as the worker answers.
//! Responses older than the newest applied one are dropped.

use std::time::Duration;

use glam::DVec2;
use tracing::{debug, warn};
use vektor_config::{StrokeConfig, StrokeStyle};
use vektor_ipc::{ContourPoint, TessRequest, WindingRule};

use crate::constants::CONTROL_POINT_TOLERANCE;
use crate::geom::{StrokeBuilder, clean_outline, simplify};
use crate::scene::{LayerId, SceneMesh};
use crate::tess::{SequenceGate, TessClient, accept_response};
use crate::types::{MeshData, Sample};

use super::{DrawingTool, Session, StrokeResult, ToolKind, ToolSettings, non_empty};

#[derive(Debug)]
pub struct ContourBrushTool {
    builder: StrokeBuilder,
    style: StrokeStyle,
    session: Session,
    client: TessClient,
    gate: SequenceGate,
    /// Input arrived while a request was in flight
    dirty: bool,
    final_timeout: Duration,
    preview: MeshData,
}

impl ContourBrushTool {
    pub fn new(settings: &ToolSettings, client: TessClient, final_timeout: Duration) -> Self {
        Self {
            builder: StrokeBuilder::new(settings.stroke.clone()),
            style: settings.style,
            session: Session::default(),
            client,
            gate: SequenceGate::new(),
            dirty: false,
            final_timeout,
            preview: MeshData::default(),
        }
    }

    /// Cleaned closed contour of the current samples
    fn contour(&self, samples: &[Sample]) -> Vec<DVec2> {
        let build = self.builder.build(samples);
        if build.is_empty() {
            return Vec::new();
        }
        clean_outline(&build.outer_polygon(), self.builder.config().base_width)
    }

    fn request_for(&mut self, contour: &[DVec2]) -> TessRequest {
        let sequence = self.gate.issue();
        let points = contour.iter().map(|p| ContourPoint::new(p.x as f32, p.y as f32)).collect();
        TessRequest::new(sequence, vec![points], WindingRule::NonZero)
    }

    /// Ask for a preview fill of the current samples
    fn request_preview(&mut self) {
        if self.client.is_busy() {
            self.dirty = true;
            return;
        }
        self.dirty = false;
        let contour = self.contour(self.session.samples());
        if contour.len() < 3 {
            self.preview.clear();
            return;
        }
        let request = self.request_for(&contour);
        if let Err(e) = self.client.submit(request) {
            warn!("ContourBrushTool: preview request failed: {}", e);
        }
    }

    fn reset(&mut self) {
        self.client.abandon();
        self.dirty = false;
        self.preview.clear();
    }
}

impl DrawingTool for ContourBrushTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ContourBrush
    }

    fn start(&mut self, layer: LayerId) {
        self.reset();
        self.gate.begin();
        self.session.start(layer);
    }

    fn update(&mut self, samples: &[Sample]) {
        if self.session.extend(samples).is_some() {
            self.request_preview();
        }
    }

    fn poll(&mut self) {
        let Some(response) = self.client.poll() else {
            return;
        };
        let sequence = response.sequence;
        if self.gate.accept(sequence) {
            match accept_response(response) {
                Some(tri) => self.preview = tri.into(),
                None => self.preview.clear(),
            }
        } else {
            debug!("ContourBrushTool::poll: stale sequence {}", sequence);
        }
        if self.dirty && self.session.is_active() {
            self.request_preview();
        }
    }

    /// Blocks until the final fill is ready or the timeout passes
    fn end(&mut self) -> Option<StrokeResult> {
        self.gate.end();
        // The in-flight preview is for an older outline
        self.client.drain(self.final_timeout);
        self.dirty = false;
        self.preview.clear();

        let (layer, samples) = self.session.finish()?;
        let contour = self.contour(&samples);
        if contour.len() < 3 {
            debug!("ContourBrushTool::end: degenerate contour");
            return None;
        }

        let request = self.request_for(&contour);
        let sequence = request.sequence;
        if let Err(e) = self.client.submit(request) {
            warn!("ContourBrushTool::end: {}", e);
            return None;
        }
        let response = match self.client.wait_for(sequence, self.final_timeout) {
            Ok(response) => response,
            Err(e) => {
                warn!("ContourBrushTool::end: {}", e);
                return None;
            }
        };
        let tri = accept_response(response)?;

        Some(StrokeResult::Mesh {
            layer,
            mesh: SceneMesh {
                mesh: tri.into(),
                style: self.style,
                control_points: simplify(&contour, CONTROL_POINT_TOLERANCE),
            },
        })
    }

    fn cancel(&mut self) {
        self.gate.end();
        self.session.cancel();
        self.reset();
    }

    fn preview(&self) -> Option<&MeshData> {
        non_empty(&self.preview)
    }

    fn is_drawing(&self) -> bool {
        self.session.is_active()
    }

    fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    fn set_stroke_config(&mut self, config: StrokeConfig) {
        self.builder.set_config(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tess::TessWorker;

    fn wave(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::untimed(i as f64 * 4.0, (i as f64 * 0.5).sin() * 10.0, 0.7))
            .collect()
    }

    fn tool(worker: &TessWorker) -> ContourBrushTool {
        ContourBrushTool::new(&ToolSettings::default(), worker.client(), Duration::from_secs(5))
    }

    #[test]
    fn test_end_produces_fill_and_control_points() {
        let worker = TessWorker::spawn().unwrap();
        let mut brush = tool(&worker);
        brush.start(LayerId(1));
        for chunk in wave(20).chunks(4) {
            brush.update(chunk);
            brush.poll();
        }
        let result = brush.end().unwrap();
        let StrokeResult::Mesh { layer, mesh } = result else {
            panic!("contour brush must produce a standalone mesh");
        };
        assert_eq!(layer, LayerId(1));
        assert!(!mesh.mesh.is_empty());
        assert!(mesh.mesh.indices.len() % 3 == 0);
        assert!(mesh.control_points.len() >= 2);
        assert!(!brush.is_drawing());
    }

    #[test]
    fn test_preview_arrives_after_poll() {
        let worker = TessWorker::spawn().unwrap();
        let mut brush = tool(&worker);
        brush.start(LayerId(0));
        brush.update(&wave(6));
        for _ in 0..500 {
            brush.poll();
            if brush.preview().is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(brush.preview().is_some());
        brush.cancel();
        assert!(brush.preview().is_none());
    }

    #[test]
    fn test_degenerate_stroke_yields_nothing() {
        let worker = TessWorker::spawn().unwrap();
        let mut brush = tool(&worker);
        brush.start(LayerId(0));
        brush.update(&[Sample::untimed(1.0, 1.0, 0.5)]);
        assert!(brush.end().is_none());
    }
}
