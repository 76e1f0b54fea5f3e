//! Triangle strip assembly and end caps.

use std::f64::consts::PI;

use glam::DVec2;
use vektor_config::CapStyle;

use crate::constants::ROUND_CAP_SEGMENTS;
use crate::types::{IndexWidth, Indices, MeshData};

use super::offsets::OffsetOutline;

/// Interleaved left/right vertex pairs plus cap fans, ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StripGeometry {
    /// Flat `[lx0, ly0, rx0, ry0, lx1, ...]`, followed by cap vertices
    pub positions: Vec<f32>,
    /// Placeholder UVs, two per vertex
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl StripGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 16-bit when both the vertex and index counts fit
    pub fn index_width(&self) -> IndexWidth {
        IndexWidth::for_counts(self.vertex_count(), self.indices.len())
    }

    pub fn packed_indices(&self) -> Indices {
        match Indices::pack(&self.indices, self.index_width()) {
            Some(indices) => indices,
            None => Indices::U32(self.indices.clone()),
        }
    }

    fn vertex(&self, index: usize) -> DVec2 {
        DVec2::new(self.positions[index * 2] as f64, self.positions[index * 2 + 1] as f64)
    }

    fn set_vertex(&mut self, index: usize, v: DVec2) {
        self.positions[index * 2] = v.x as f32;
        self.positions[index * 2 + 1] = v.y as f32;
    }

    fn push_vertex(&mut self, v: DVec2) -> u32 {
        let index = self.vertex_count() as u32;
        self.positions.push(v.x as f32);
        self.positions.push(v.y as f32);
        self.uvs.push(0.0);
        self.uvs.push(0.0);
        index
    }
}

impl From<StripGeometry> for MeshData {
    fn from(strip: StripGeometry) -> Self {
        Self {
            positions: strip.positions,
            uvs: strip.uvs,
            indices: strip.indices,
        }
    }
}

/// Two triangles per consecutive left/right pair
pub fn build_strip(outline: &OffsetOutline) -> StripGeometry {
    let n = outline.len();
    if n < 2 {
        return StripGeometry::default();
    }
    let mut positions = Vec::with_capacity(n * 4);
    for (l, r) in outline.left.iter().zip(&outline.right) {
        positions.extend_from_slice(&[l.x as f32, l.y as f32, r.x as f32, r.y as f32]);
    }
    let mut indices = Vec::with_capacity((n - 1) * 6);
    for i in 0..(n - 1) as u32 {
        let (i0, i1, i2, i3) = (i * 2, i * 2 + 1, (i + 1) * 2, (i + 1) * 2 + 1);
        indices.extend_from_slice(&[i0, i1, i2, i1, i3, i2]);
    }
    StripGeometry {
        uvs: vec![0.0; positions.len()],
        positions,
        indices,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum End {
    Start,
    End,
}

/// Apply start/end caps to a strip built from `pair_count` pairs.
///
/// `half_start`/`half_end` are the half-widths at the centerline endpoints.
pub fn apply_caps(strip: &mut StripGeometry, cap_start: CapStyle, cap_end: CapStyle, half_start: f64, half_end: f64) {
    if cap_start == CapStyle::Butt && cap_end == CapStyle::Butt {
        return;
    }
    let pair_count = strip.vertex_count() / 2;
    if pair_count < 2 {
        return;
    }

    // Tangents come from the unshifted pair centers
    let t_start = end_tangent(strip, End::Start, pair_count);
    let t_end = end_tangent(strip, End::End, pair_count);

    if cap_start == CapStyle::Square {
        shift_pair(strip, 0, -t_start * half_start);
    }
    if cap_end == CapStyle::Square {
        shift_pair(strip, pair_count - 1, t_end * half_end);
    }
    if cap_start == CapStyle::Round {
        add_round_cap(strip, 0, -t_start, half_start);
    }
    if cap_end == CapStyle::Round {
        add_round_cap(strip, pair_count - 1, t_end, half_end);
    }
}

fn pair_center(strip: &StripGeometry, pair: usize) -> DVec2 {
    (strip.vertex(pair * 2) + strip.vertex(pair * 2 + 1)) * 0.5
}

fn end_tangent(strip: &StripGeometry, end: End, pair_count: usize) -> DVec2 {
    let (from, to) = match end {
        End::Start => (pair_center(strip, 0), pair_center(strip, 1)),
        End::End => (
            pair_center(strip, pair_count - 2),
            pair_center(strip, pair_count - 1),
        ),
    };
    let d = to - from;
    let len = d.length();
    if len > 0.0 { d / len } else { d }
}

fn shift_pair(strip: &mut StripGeometry, pair: usize, offset: DVec2) {
    for vertex in [pair * 2, pair * 2 + 1] {
        let v = strip.vertex(vertex);
        strip.set_vertex(vertex, v + offset);
    }
}

/// Semicircular fan from the left to the right vertex of `pair`, bulging
/// towards `outward`.
fn add_round_cap(strip: &mut StripGeometry, pair: usize, outward: DVec2, fallback_radius: f64) {
    let left_index = (pair * 2) as u32;
    let right_index = left_index + 1;
    let center = pair_center(strip, pair);
    let to_left = strip.vertex(pair * 2) - center;

    let radius = match to_left.length() {
        r if r > 0.0 => r,
        _ => fallback_radius,
    };
    let start_angle = to_left.y.atan2(to_left.x);
    // Sweep through the outward tangent rather than back over the strip
    let dir = if to_left.perp().dot(outward) >= 0.0 { 1.0 } else { -1.0 };

    let center_index = strip.push_vertex(center);
    let mut prev = left_index;
    for j in 1..=ROUND_CAP_SEGMENTS {
        let next = if j < ROUND_CAP_SEGMENTS {
            let a = start_angle + dir * PI * (j as f64 / ROUND_CAP_SEGMENTS as f64);
            strip.push_vertex(center + DVec2::new(a.cos(), a.sin()) * radius)
        } else {
            right_index
        };
        strip.indices.extend_from_slice(&[center_index, prev, next]);
        prev = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(n: usize) -> OffsetOutline {
        OffsetOutline {
            left: (0..n).map(|i| DVec2::new(i as f64 * 10.0, 1.0)).collect(),
            right: (0..n).map(|i| DVec2::new(i as f64 * 10.0, -1.0)).collect(),
        }
    }

    #[test]
    fn test_strip_indices() {
        let strip = build_strip(&straight(3));
        assert_eq!(strip.vertex_count(), 6);
        assert_eq!(strip.indices, vec![0, 1, 2, 1, 3, 2, 2, 3, 4, 3, 5, 4]);
        assert_eq!(strip.uvs.len(), strip.positions.len());
        assert_eq!(strip.index_width(), IndexWidth::U16);
        assert!(matches!(strip.packed_indices(), Indices::U16(_)));
    }

    #[test]
    fn test_single_pair_has_no_strip() {
        assert!(build_strip(&straight(1)).positions.is_empty());
    }

    #[test]
    fn test_square_caps_extend_ends() {
        let mut strip = build_strip(&straight(2));
        apply_caps(&mut strip, CapStyle::Square, CapStyle::Square, 1.0, 1.0);
        assert_eq!(strip.vertex(0), DVec2::new(-1.0, 1.0));
        assert_eq!(strip.vertex(1), DVec2::new(-1.0, -1.0));
        assert_eq!(strip.vertex(2), DVec2::new(11.0, 1.0));
        assert_eq!(strip.vertex(3), DVec2::new(11.0, -1.0));
    }

    #[test]
    fn test_round_caps_bulge_outward() {
        let mut strip = build_strip(&straight(2));
        apply_caps(&mut strip, CapStyle::Round, CapStyle::Round, 1.0, 1.0);
        // Two caps: center + 5 arc vertices each
        assert_eq!(strip.vertex_count(), 4 + 2 * 6);
        // Two strip triangles plus six fan triangles per cap
        assert_eq!(strip.indices.len(), 6 + 2 * 6 * 3);
        assert!(strip.indices.iter().all(|&i| (i as usize) < strip.vertex_count()));

        // Start cap arc lies behind x = 0, end cap arc beyond x = 10
        for k in 5..10 {
            assert!(strip.vertex(k).x < 1e-6);
        }
        for k in 11..16 {
            assert!(strip.vertex(k).x > 10.0 - 1e-6);
        }
        // The middle arc vertex sits on the axis, one radius out
        assert!((strip.vertex(7) - DVec2::new(-1.0, 0.0)).length() < 1e-5);
    }
}
