//! Outline cleanup before tessellation.
//!
//! Generated outlines at large widths tend to carry duplicate points and
//! long runs of nearly collinear vertices, which turn into sliver
//! triangles. The passes here strip them with tolerances relative to the
//! stroke size.

use glam::DVec2;

/// Drop points within `eps` of their predecessor. A last point equal to the
/// first is dropped too, so closed outlines don't carry a degenerate edge.
pub fn dedupe_consecutive(points: &[DVec2], eps: f64) -> Vec<DVec2> {
    if points.len() <= 1 {
        return points.to_vec();
    }
    let eps_sq = eps * eps;
    let mut out: Vec<DVec2> = Vec::with_capacity(points.len());
    for &p in points {
        let keep = match out.last() {
            None => true,
            Some(last) => {
                let d = p.distance_squared(*last);
                !d.is_finite() || d > eps_sq
            }
        };
        if keep {
            out.push(p);
        }
    }
    if out.len() > 2 {
        if let (Some(first), Some(last)) = (out.first(), out.last()) {
            if first.distance_squared(*last) <= eps_sq {
                out.pop();
            }
        }
    }
    out
}

/// Drop points whose doubled triangle area with their cyclic neighbours is
/// at most `area_eps`.
pub fn remove_nearly_collinear(points: &[DVec2], area_eps: f64) -> Vec<DVec2> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    (0..n)
        .filter_map(|i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            let area2 = (cur - prev).perp_dot(next - prev).abs();
            (area2 > area_eps).then_some(cur)
        })
        .collect()
}

/// Ramer-Douglas-Peucker simplification using distance to the segment
/// (not the infinite line).
pub fn simplify(points: &[DVec2], tolerance: f64) -> Vec<DVec2> {
    if points.len() <= 2 || !(tolerance > 0.0) {
        return points.to_vec();
    }
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    // Explicit stack instead of recursion: outlines can be thousands of points
    let tol_sq = tolerance * tolerance;
    let mut stack = vec![(0usize, last)];
    while let Some((first, end)) = stack.pop() {
        if end <= first + 1 {
            continue;
        }
        let mut max_sq = 0.0;
        let mut index = first;
        for i in first + 1..end {
            let d = segment_distance_sq(points[i], points[first], points[end]);
            if d > max_sq {
                max_sq = d;
                index = i;
            }
        }
        if max_sq > tol_sq {
            keep[index] = true;
            stack.push((first, index));
            stack.push((index, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Full cleanup chain with tolerances scaled by `stroke_size`.
///
/// Returns an empty outline if fewer than 3 points survive any stage.
pub fn clean_outline(points: &[DVec2], stroke_size: f64) -> Vec<DVec2> {
    if points.len() < 3 {
        return Vec::new();
    }
    let size = if stroke_size.is_finite() { stroke_size } else { 0.0 };
    let eps = (size * 0.02).max(0.25);
    let area_eps = eps * eps * 0.5;

    let pts = dedupe_consecutive(points, eps * 0.5);
    if pts.len() < 3 {
        return Vec::new();
    }
    let pts = remove_nearly_collinear(&pts, area_eps);
    if pts.len() < 3 {
        return Vec::new();
    }
    let pts = simplify(&pts, eps);
    if pts.len() < 3 {
        return Vec::new();
    }
    pts
}

fn segment_distance_sq(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a + ab * t)
}
