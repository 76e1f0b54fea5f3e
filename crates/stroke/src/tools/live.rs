use vektor_config::{PreviewConfig, StrokeConfig};

use crate::geom::{Decimator, StrokeBuilder};
use crate::types::{MeshData, Sample};

use super::preview::PreviewThrottle;

/// Decimated, throttled strip preview shared by the strip-based tools
#[derive(Debug)]
pub(crate) struct LiveStrip {
    builder: StrokeBuilder,
    decimator: Decimator,
    throttle: PreviewThrottle,
    kept: Vec<Sample>,
    mesh: MeshData,
}

impl LiveStrip {
    pub(crate) fn new(config: StrokeConfig, preview: &PreviewConfig, min_dist: f64) -> Self {
        Self {
            builder: StrokeBuilder::new(config),
            decimator: Decimator::new(min_dist),
            throttle: PreviewThrottle::new(preview),
            kept: Vec::new(),
            mesh: MeshData::default(),
        }
    }

    pub(crate) fn builder(&self) -> &StrokeBuilder {
        &self.builder
    }

    pub(crate) fn set_config(&mut self, config: StrokeConfig) {
        self.builder.set_config(config);
    }

    pub(crate) fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    /// Decimate `samples` into the live set and rebuild if the throttle
    /// allows it
    pub(crate) fn push(&mut self, samples: &[Sample]) {
        for sample in samples {
            if self.decimator.push(sample) {
                self.kept.push(*sample);
                self.throttle.observe(sample);
            }
        }
        if self.kept.len() >= 2 && self.throttle.try_rebuild() {
            self.mesh = self.builder.build(&self.kept).strip.into();
        }
    }

    pub(crate) fn reset(&mut self) {
        self.decimator.reset();
        self.throttle.reset();
        self.kept.clear();
        self.mesh.clear();
    }
}
