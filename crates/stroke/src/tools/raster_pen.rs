//! Raster pen
//!
//! Places round dabs at a fixed distance along the input path and emits
//! each as a small disc fan. Spacing carries over between segments and
//! between updates, so dab placement does not depend on how the samples
//! were chunked.

use std::f64::consts::TAU;

use glam::DVec2;
use tracing::debug;
use vektor_config::{StrokeConfig, StrokeStyle};

use crate::constants::{DAB_BASE_RADIUS, DAB_PRESSURE_RADIUS, DAB_SEGMENTS, DAB_SPACING_PX, GEOM_EPSILON};
use crate::scene::LayerId;
use crate::types::{MeshData, Sample};

use super::{DrawingTool, Session, StrokeResult, ToolKind, ToolSettings, non_empty};

/// A single disc stamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dab {
    pub center: DVec2,
    pub radius: f64,
}

/// Dab radius for a normalized pressure
pub fn dab_radius(pressure: f64) -> f64 {
    DAB_BASE_RADIUS + DAB_PRESSURE_RADIUS * pressure.clamp(0.0, 1.0)
}

/// Generates dabs at a constant distance along a sample stream
#[derive(Debug, Clone)]
pub struct DabSpacer {
    spacing: f64,
    /// Last sample seen (None until the stream starts)
    last: Option<Sample>,
    /// Distance still to travel before the next dab
    residual: f64,
}

impl Default for DabSpacer {
    fn default() -> Self {
        Self::new(DAB_SPACING_PX)
    }
}

impl DabSpacer {
    pub fn new(spacing: f64) -> Self {
        Self {
            spacing: if spacing.is_finite() { spacing.max(0.01) } else { DAB_SPACING_PX },
            last: None,
            residual: 0.0,
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.residual = 0.0;
    }

    /// Advance to `sample`, returning the dabs placed on the way.
    ///
    /// The first sample of a stream always gets a dab. Pressure is
    /// interpolated along each segment.
    pub fn push(&mut self, sample: &Sample) -> Vec<Dab> {
        let mut dabs = Vec::new();

        let Some(prev) = self.last else {
            dabs.push(Dab {
                center: sample.position(),
                radius: dab_radius(sample.pressure),
            });
            self.last = Some(*sample);
            self.residual = self.spacing;
            return dabs;
        };

        let from = prev.position();
        let delta = sample.position() - from;
        let seg_len = delta.length();
        self.last = Some(*sample);
        if seg_len < GEOM_EPSILON {
            return dabs;
        }

        let dir = delta / seg_len;
        let mut to_next = if self.residual > 0.0 { self.residual } else { self.spacing };
        let mut traveled = 0.0;
        while seg_len - traveled >= to_next - GEOM_EPSILON {
            let at = traveled + to_next;
            let t = (at / seg_len).min(1.0);
            let pressure = prev.pressure + (sample.pressure - prev.pressure) * t;
            dabs.push(Dab {
                center: from + dir * at,
                radius: dab_radius(pressure),
            });
            traveled = at;
            to_next = self.spacing;
        }
        self.residual = to_next - (seg_len - traveled);
        dabs
    }
}

/// Append one triangle fan per dab to `mesh`
pub fn disc_mesh(mesh: &mut MeshData, dabs: &[Dab]) {
    for dab in dabs {
        let center = (mesh.positions.len() / 2) as u32;
        mesh.positions.extend([dab.center.x as f32, dab.center.y as f32]);
        for k in 0..DAB_SEGMENTS {
            let angle = TAU * k as f64 / DAB_SEGMENTS as f64;
            let rim = dab.center + DVec2::from_angle(angle) * dab.radius;
            mesh.positions.extend([rim.x as f32, rim.y as f32]);
        }
        for k in 0..DAB_SEGMENTS as u32 {
            let a = center + 1 + k;
            let b = center + 1 + (k + 1) % DAB_SEGMENTS as u32;
            mesh.indices.extend([center, a, b]);
        }
    }
    mesh.uvs.resize(mesh.positions.len(), 0.0);
}

/// Distance-spaced dab pen merged into the layer batch
#[derive(Debug)]
pub struct RasterPenTool {
    style: StrokeStyle,
    session: Session,
    spacer: DabSpacer,
    dab_count: usize,
    mesh: MeshData,
}

impl RasterPenTool {
    pub fn new(settings: &ToolSettings) -> Self {
        Self {
            style: settings.style,
            session: Session::default(),
            spacer: DabSpacer::default(),
            dab_count: 0,
            mesh: MeshData::default(),
        }
    }

    fn reset(&mut self) {
        self.spacer.reset();
        self.dab_count = 0;
        self.mesh.clear();
    }
}

impl DrawingTool for RasterPenTool {
    fn kind(&self) -> ToolKind {
        ToolKind::RasterPen
    }

    fn start(&mut self, layer: LayerId) {
        self.session.start(layer);
        self.reset();
    }

    fn update(&mut self, samples: &[Sample]) {
        let Some(first) = self.session.extend(samples) else {
            return;
        };
        for sample in &self.session.samples()[first..] {
            let dabs = self.spacer.push(sample);
            self.dab_count += dabs.len();
            disc_mesh(&mut self.mesh, &dabs);
        }
    }

    fn end(&mut self) -> Option<StrokeResult> {
        let (layer, samples) = self.session.finish()?;
        let mesh = std::mem::take(&mut self.mesh);
        let dabs = self.dab_count;
        self.reset();

        if samples.len() < 2 || mesh.is_empty() {
            return None;
        }
        debug!("RasterPenTool::end: {} dabs from {} samples", dabs, samples.len());
        Some(StrokeResult::Batched {
            layer,
            mesh,
            style: self.style,
        })
    }

    fn cancel(&mut self) {
        self.session.cancel();
        self.reset();
    }

    fn preview(&self) -> Option<&MeshData> {
        non_empty(&self.mesh)
    }

    fn is_drawing(&self) -> bool {
        self.session.is_active()
    }

    fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    /// Dab geometry does not use the stroke configuration
    fn set_stroke_config(&mut self, _config: StrokeConfig) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centers(dabs: &[Dab]) -> Vec<f64> {
        dabs.iter().map(|d| d.center.x).collect()
    }

    #[test]
    fn test_first_dab_at_start() {
        let mut spacer = DabSpacer::new(2.0);
        let dabs = spacer.push(&Sample::untimed(5.0, 5.0, 1.0));
        assert_eq!(dabs.len(), 1);
        assert_eq!(dabs[0].center, DVec2::new(5.0, 5.0));
        assert_eq!(dabs[0].radius, 5.0);
    }

    #[test]
    fn test_spacing_carries_across_segments() {
        let mut spacer = DabSpacer::new(2.0);
        let mut all = spacer.push(&Sample::untimed(0.0, 0.0, 0.5));
        all.extend(spacer.push(&Sample::untimed(3.0, 0.0, 0.5)));
        all.extend(spacer.push(&Sample::untimed(5.0, 0.0, 0.5)));
        assert_eq!(centers(&all), vec![0.0, 2.0, 4.0]);

        // Chunking the same path differently gives the same dabs
        let mut spacer = DabSpacer::new(2.0);
        let mut other = spacer.push(&Sample::untimed(0.0, 0.0, 0.5));
        for x in [1.0, 2.5, 3.0, 4.5, 5.0] {
            other.extend(spacer.push(&Sample::untimed(x, 0.0, 0.5)));
        }
        let xs = centers(&other);
        assert_eq!(xs.len(), 3);
        for (a, b) in xs.iter().zip([0.0, 2.0, 4.0]) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_pressure_interpolates_radius() {
        let mut spacer = DabSpacer::new(2.0);
        spacer.push(&Sample::untimed(0.0, 0.0, 0.0));
        let dabs = spacer.push(&Sample::untimed(4.0, 0.0, 1.0));
        assert_eq!(dabs.len(), 2);
        assert!((dabs[0].radius - 3.5).abs() < 1e-9);
        assert!((dabs[1].radius - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_disc_mesh_layout() {
        let mut mesh = MeshData::default();
        disc_mesh(
            &mut mesh,
            &[
                Dab {
                    center: DVec2::ZERO,
                    radius: 2.0,
                },
                Dab {
                    center: DVec2::new(5.0, 0.0),
                    radius: 2.0,
                },
            ],
        );
        assert_eq!(mesh.vertex_count(), 2 * (DAB_SEGMENTS + 1));
        assert_eq!(mesh.indices.len(), 2 * DAB_SEGMENTS * 3);
        assert_eq!(mesh.uvs.len(), mesh.positions.len());
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_raster_pen_needs_two_samples() {
        let mut tool = RasterPenTool::new(&ToolSettings::default());
        tool.start(LayerId(0));
        tool.update(&[Sample::untimed(0.0, 0.0, 0.5)]);
        assert!(tool.preview().is_some());
        assert!(tool.end().is_none());

        tool.start(LayerId(0));
        tool.update(&[Sample::untimed(0.0, 0.0, 0.5), Sample::untimed(10.0, 0.0, 0.5)]);
        let result = tool.end().unwrap();
        assert!(matches!(result, StrokeResult::Batched { .. }));
        assert_eq!(result.mesh().vertex_count(), 6 * (DAB_SEGMENTS + 1));
    }
}
