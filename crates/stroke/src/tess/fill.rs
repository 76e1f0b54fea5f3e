//! Sweep-line fill tessellation of closed contours.

use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Path;
use tracing::debug;
use vektor_ipc::{ContourPoint, TessRequest, TessResponse, WindingRule};

use crate::constants::FILL_TOLERANCE;
use crate::types::Triangulation;

use super::TessError;

fn fill_rule(rule: WindingRule) -> FillRule {
    match rule {
        WindingRule::NonZero => FillRule::NonZero,
        WindingRule::Odd => FillRule::EvenOdd,
    }
}

/// Fill `contours` under `rule`.
///
/// Contours with fewer than three points are skipped; if none remain the
/// result is empty. Self-intersecting contours are supported.
pub fn triangulate(contours: &[Vec<ContourPoint>], rule: WindingRule) -> Result<Triangulation, TessError> {
    let usable: Vec<&Vec<ContourPoint>> = contours.iter().filter(|c| c.len() >= 3).collect();
    if usable.is_empty() {
        return Ok(Triangulation::default());
    }
    if usable.iter().any(|c| c.iter().any(|p| !p.is_finite())) {
        return Err(TessError::NonFinite);
    }

    let mut builder = Path::builder();
    for contour in &usable {
        builder.begin(point(contour[0].x, contour[0].y));
        for p in &contour[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut geometry: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    let options = FillOptions::default()
        .with_tolerance(FILL_TOLERANCE)
        .with_fill_rule(fill_rule(rule));

    tessellator
        .tessellate_path(
            &path,
            &options,
            &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| vertex.position().to_array()),
        )
        .map_err(|e| TessError::Fill(format!("{e:?}")))?;

    debug!(
        "triangulate: {} contours -> {} vertices, {} indices",
        usable.len(),
        geometry.vertices.len(),
        geometry.indices.len()
    );

    Ok(Triangulation {
        positions: geometry.vertices.into_iter().flatten().collect(),
        indices: geometry.indices,
    })
}

/// Answer a wire request. Failures become an error response with empty
/// buffers.
pub fn tessellate(request: &TessRequest) -> TessResponse {
    match triangulate(&request.contours, request.winding_rule) {
        Ok(tri) => TessResponse {
            sequence: request.sequence,
            positions: tri.positions,
            indices: tri.indices,
            error: None,
        },
        Err(e) => TessResponse::failed(request.sequence, e.to_string()),
    }
}
