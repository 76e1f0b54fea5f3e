//! Minimum-travel decimation of live point streams.
//!
//! Decimation only bounds preview cost; final geometry is always built
//! from the full sample set.

use glam::DVec2;

use crate::types::Positioned;

/// Keep the first and last point, and in between only points that moved at
/// least `min_dist` from the last kept one.
///
/// Sub-threshold motion is accumulated so slow, steady drags in one
/// direction still produce points. Inputs shorter than 3 points or a
/// non-positive distance are returned unchanged.
pub fn decimate_by_distance<T: Positioned + Clone>(points: &[T], min_dist: f64) -> Vec<T> {
    if points.len() < 3 || !(min_dist > 0.0) {
        return points.to_vec();
    }
    let min_sq = min_dist * min_dist;
    let mut out = Vec::with_capacity(points.len());
    let mut last = points[0].position();
    out.push(points[0].clone());
    let mut acc = DVec2::ZERO;

    for p in &points[1..points.len() - 1] {
        let delta = p.position() - last;
        let keep = if delta.length_squared() >= min_sq {
            true
        } else {
            acc += delta;
            acc.length_squared() >= min_sq
        };
        if keep {
            out.push(p.clone());
            last = p.position();
            acc = DVec2::ZERO;
        }
    }

    if let Some(tail) = points.last() {
        out.push(tail.clone());
    }
    out
}

/// Streaming form of [`decimate_by_distance`] for samples arriving one at
/// a time.
#[derive(Debug, Clone)]
pub struct Decimator {
    min_dist: f64,
    last: Option<DVec2>,
}

impl Decimator {
    pub fn new(min_dist: f64) -> Self {
        Self {
            min_dist: if min_dist.is_finite() { min_dist.max(0.0) } else { 0.0 },
            last: None,
        }
    }

    pub fn min_dist(&self) -> f64 {
        self.min_dist
    }

    /// Returns true if `point` should be kept. The first point of a stream
    /// is always kept.
    pub fn push(&mut self, point: &impl Positioned) -> bool {
        let p = point.position();
        let keep = match self.last {
            None => true,
            Some(last) => p.distance_squared(last) >= self.min_dist * self.min_dist,
        };
        if keep {
            self.last = Some(p);
        }
        keep
    }

    /// Forget the last kept point
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize, step: f64) -> Vec<DVec2> {
        (0..n).map(|i| DVec2::new(i as f64 * step, 0.0)).collect()
    }

    #[test]
    fn test_short_input_unchanged() {
        let pts = line(2, 0.1);
        assert_eq!(decimate_by_distance(&pts, 5.0), pts);
        let pts = line(10, 0.1);
        assert_eq!(decimate_by_distance(&pts, 0.0), pts);
    }

    #[test]
    fn test_keeps_endpoints() {
        let pts = line(100, 0.1);
        let out = decimate_by_distance(&pts, 2.0);
        assert_eq!(out.first(), pts.first());
        assert_eq!(out.last(), pts.last());
        assert!(out.len() < pts.len());
    }

    #[test]
    fn test_large_steps_all_kept() {
        let pts = line(10, 3.0);
        assert_eq!(decimate_by_distance(&pts, 2.0), pts);
    }

    #[test]
    fn test_streaming_decimator() {
        let mut decimator = Decimator::new(1.0);
        assert!(decimator.push(&DVec2::new(0.0, 0.0)));
        assert!(!decimator.push(&DVec2::new(0.5, 0.0)));
        assert!(decimator.push(&DVec2::new(1.0, 0.0)));
        assert!(!decimator.push(&DVec2::new(1.9, 0.0)));
        decimator.reset();
        assert!(decimator.push(&DVec2::new(1.9, 0.0)));
    }
}
