//! Left/right offset polylines and corner joins.

use std::f64::consts::PI;

use glam::DVec2;
use vektor_config::JoinStyle;

use crate::constants::{
    GEOM_EPSILON, MIN_MITER_DOT, ROUND_JOIN_MAX_SEGMENTS, ROUND_JOIN_MIN_SEGMENTS, ROUND_JOIN_MIN_TURN,
};

/// Two index-aligned offset polylines around a centerline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetOutline {
    pub left: Vec<DVec2>,
    pub right: Vec<DVec2>,
}

impl OffsetOutline {
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Unit tangents of the incoming and outgoing segment at `i`.
///
/// A zero-length side borrows the other side's direction.
fn segment_tangents(points: &[DVec2], i: usize) -> (DVec2, DVec2) {
    let n = points.len();
    let p = points[i];
    let prev = points[i.saturating_sub(1)];
    let next = points[(i + 1).min(n - 1)];

    let d0 = p - prev;
    let d1 = next - p;
    let l0 = d0.length();
    let l1 = d1.length();

    let t0 = (l0 > GEOM_EPSILON).then(|| d0 / l0);
    let t1 = (l1 > GEOM_EPSILON).then(|| d1 / l1);
    match (t0, t1) {
        (Some(t0), Some(t1)) => (t0, t1),
        (Some(t), None) | (None, Some(t)) => (t, t),
        (None, None) => (DVec2::ZERO, DVec2::ZERO),
    }
}

/// Offset the centerline by `half_width` on both sides.
///
/// Miter and round joins clamp the miter scale to `miter_limit`; bevel joins
/// above the limit fall back to the outgoing segment normal.
pub fn build_offsets(points: &[DVec2], half_width: &[f64], join: JoinStyle, miter_limit: f64) -> OffsetOutline {
    let limit = miter_limit.max(1.0);
    let mut left = Vec::with_capacity(points.len());
    let mut right = Vec::with_capacity(points.len());

    for (i, &p) in points.iter().enumerate() {
        let (t0, t1) = segment_tangents(points, i);
        let n0 = t0.perp();
        let n1 = t1.perp();

        let sum = n0 + n1;
        let mut miter = if sum.length() < GEOM_EPSILON {
            // Full reversal: use the outgoing normal
            n1
        } else {
            sum.normalize()
        };

        let mut scale = 1.0 / miter.dot(n1).abs().max(MIN_MITER_DOT);
        if join == JoinStyle::Bevel && scale > limit {
            miter = n1;
            scale = 1.0;
        } else {
            scale = scale.min(limit);
        }

        let w = half_width[i] * scale;
        left.push(p + miter * w);
        right.push(p - miter * w);
    }

    OffsetOutline { left, right }
}

/// Replace sharp interior corners with an arc on the outer side while the
/// inner side stays fixed. The result may be longer than the centerline.
pub fn apply_round_joins(points: &[DVec2], half_width: &[f64], outline: &OffsetOutline) -> OffsetOutline {
    let n = points.len();
    if n < 3 {
        return outline.clone();
    }
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);

    for i in 0..n {
        if i > 0 && i < n - 1 {
            if let Some(arc) = corner_arc(points, half_width, i) {
                let outer_is_right = arc.turn > 0.0;
                for o in arc.points {
                    if outer_is_right {
                        left.push(outline.left[i]);
                        right.push(o);
                    } else {
                        left.push(o);
                        right.push(outline.right[i]);
                    }
                }
                continue;
            }
        }
        left.push(outline.left[i]);
        right.push(outline.right[i]);
    }

    OffsetOutline { left, right }
}

struct CornerArc {
    /// Positive for a left turn
    turn: f64,
    points: Vec<DVec2>,
}

fn corner_arc(points: &[DVec2], half_width: &[f64], i: usize) -> Option<CornerArc> {
    let (t0, t1) = segment_tangents(points, i);
    let cross = t0.perp_dot(t1);
    let turn_angle = t0.dot(t1).clamp(-1.0, 1.0).acos();
    if cross.abs() <= GEOM_EPSILON || turn_angle <= ROUND_JOIN_MIN_TURN {
        return None;
    }

    // The outer side is opposite the turn direction
    let sign = cross.signum();
    let out0 = -t0.perp() * sign;
    let out1 = -t1.perp() * sign;
    let a0 = out0.y.atan2(out0.x);
    let a1 = out1.y.atan2(out1.x);
    let delta = sweep_towards(a1 - a0, sign);

    let segments = ((delta.abs() / (PI / 8.0)).ceil() as usize)
        .clamp(ROUND_JOIN_MIN_SEGMENTS, ROUND_JOIN_MAX_SEGMENTS);
    let radius = half_width[i];
    let center = points[i];

    let points = (0..=segments)
        .map(|j| {
            let theta = a0 + delta * (j as f64 / segments as f64);
            center + DVec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect();

    Some(CornerArc { turn: cross, points })
}

/// Wrap an angle delta into (-PI, PI] and force it to sweep in the
/// direction of `sign`.
fn sweep_towards(mut d: f64, sign: f64) -> f64 {
    while d <= -PI {
        d += 2.0 * PI;
    }
    while d > PI {
        d -= 2.0 * PI;
    }
    if sign > 0.0 && d < 0.0 {
        d += 2.0 * PI;
    }
    if sign < 0.0 && d > 0.0 {
        d -= 2.0 * PI;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> DVec2 {
        DVec2::new(x, y)
    }

    #[test]
    fn test_straight_line_offsets() {
        let pts = [v(0.0, 0.0), v(5.0, 0.0), v(10.0, 0.0)];
        let out = build_offsets(&pts, &[2.0; 3], JoinStyle::Miter, 2.0);
        for i in 0..3 {
            assert!((out.left[i] - v(pts[i].x, 2.0)).length() < 1e-12);
            assert!((out.right[i] - v(pts[i].x, -2.0)).length() < 1e-12);
        }
    }

    #[test]
    fn test_duplicate_points_borrow_neighbour_direction() {
        let pts = [v(0.0, 0.0), v(5.0, 0.0), v(5.0, 0.0), v(10.0, 0.0)];
        let out = build_offsets(&pts, &[1.0; 4], JoinStyle::Miter, 2.0);
        assert!(out.left.iter().all(|p| p.is_finite()));
        assert!((out.left[1].y - 1.0).abs() < 1e-12);
        assert!((out.left[2].y - 1.0).abs() < 1e-12);

        let stacked = [v(3.0, 3.0); 3];
        let out = build_offsets(&stacked, &[1.0; 3], JoinStyle::Miter, 2.0);
        assert!(out.left.iter().chain(&out.right).all(|p| p.is_finite()));
    }

    #[test]
    fn test_right_angle_miter_and_bevel() {
        let pts = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)];
        // 90 degree corner: miter scale is sqrt(2)
        let miter = build_offsets(&pts, &[1.0; 3], JoinStyle::Miter, 2.0);
        let d = (miter.left[1] - pts[1]).length();
        assert!((d - 2f64.sqrt()).abs() < 1e-9);

        // Limit 1.2 < sqrt(2): bevel falls back to the outgoing normal
        let bevel = build_offsets(&pts, &[1.0; 3], JoinStyle::Bevel, 1.2);
        assert!((bevel.left[1] - v(9.0, 0.0)).length() < 1e-9);

        // Miter is clamped instead
        let clamped = build_offsets(&pts, &[1.0; 3], JoinStyle::Miter, 1.2);
        assert!(((clamped.left[1] - pts[1]).length() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_round_join_inserts_arc_on_outer_side() {
        let pts = [v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)];
        let half = [1.0; 3];
        let base = build_offsets(&pts, &half, JoinStyle::Round, 2.0);
        let round = apply_round_joins(&pts, &half, &base);
        // 90 degrees -> ceil(4) = 4 segments -> 5 pairs at the corner
        assert_eq!(round.len(), 2 + 5);
        assert_eq!(round.left.len(), round.right.len());
        // Left turn: the right side is outside, the left (inner) side is fixed
        for k in 1..6 {
            assert_eq!(round.left[k], base.left[1]);
            assert!(((round.right[k] - pts[1]).length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_sweep_towards() {
        assert!((sweep_towards(-PI / 2.0, 1.0) - 1.5 * PI).abs() < 1e-12);
        assert!((sweep_towards(3.0 * PI / 2.0, -1.0) + PI / 2.0).abs() < 1e-12);
    }
}
