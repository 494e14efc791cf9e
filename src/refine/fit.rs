//! Weighted orthogonal line fitting.

use crate::geometry::LineGeneral;
use nalgebra::{Point2, Vector2};

const EPS: f64 = 1e-12;

/// Line through the weighted centroid along the principal axis of the
/// weighted covariance.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FittedLine {
    pub(crate) centroid: Point2<f64>,
    pub(crate) direction: Vector2<f64>,
}

impl FittedLine {
    #[inline]
    pub(crate) fn normal(&self) -> Vector2<f64> {
        Vector2::new(-self.direction.y, self.direction.x)
    }

    pub(crate) fn to_general(self) -> LineGeneral {
        LineGeneral::from_normal(self.normal(), &self.centroid)
    }
}

/// Fit a line minimising the weighted sum of squared orthogonal distances.
///
/// Returns `None` when the weights sum to zero.
pub(crate) fn weighted_line_fit(points: &[Point2<f64>], weights: &[f64]) -> Option<FittedLine> {
    debug_assert_eq!(points.len(), weights.len());
    let mut sum_w = 0.0;
    let mut mu = Vector2::zeros();
    for (p, &w) in points.iter().zip(weights) {
        sum_w += w;
        mu += p.coords * w;
    }
    if sum_w <= EPS {
        return None;
    }
    mu /= sum_w;

    let mut cov_xx = 0.0;
    let mut cov_xy = 0.0;
    let mut cov_yy = 0.0;
    for (p, &w) in points.iter().zip(weights) {
        let dx = p.x - mu.x;
        let dy = p.y - mu.y;
        cov_xx += w * dx * dx;
        cov_xy += w * dx * dy;
        cov_yy += w * dy * dy;
    }
    cov_xx /= sum_w;
    cov_xy /= sum_w;
    cov_yy /= sum_w;

    // largest eigenvalue of the 2x2 covariance
    let trace = cov_xx + cov_yy;
    let det_part = (cov_xx - cov_yy) * (cov_xx - cov_yy) + 4.0 * cov_xy * cov_xy;
    let lambda = 0.5 * (trace + det_part.max(0.0).sqrt());

    // two algebraically equivalent eigenvectors; take the better conditioned one
    let a = Vector2::new(cov_xy, lambda - cov_xx);
    let b = Vector2::new(lambda - cov_yy, cov_xy);
    let dir = if a.norm_squared() >= b.norm_squared() { a } else { b };
    let norm = dir.norm();
    let direction = if norm <= EPS {
        Vector2::new(1.0, 0.0)
    } else {
        dir / norm
    };

    Some(FittedLine {
        centroid: Point2::from(mu),
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_a_slanted_line() {
        let points: Vec<Point2<f64>> = (0..10)
            .map(|i| {
                let t = i as f64;
                Point2::new(3.0 + t, 1.0 + 0.5 * t)
            })
            .collect();
        let weights = vec![1.0; points.len()];
        let line = weighted_line_fit(&points, &weights).expect("fit");
        let general = line.to_general();
        for p in &points {
            assert!(general.distance(p).abs() < 1e-9);
        }
    }

    #[test]
    fn weights_pull_the_fit() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(10.0, 1.0),
        ];
        let weights = vec![1.0, 1.0, 3.0, 3.0];
        let line = weighted_line_fit(&points, &weights).expect("fit");
        assert!((line.centroid.y - 0.75).abs() < 1e-12);
        assert!(line.direction.y.abs() < 1e-12);
    }

    #[test]
    fn zero_weights_fail() {
        let points = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)];
        assert!(weighted_line_fit(&points, &[0.0, 0.0]).is_none());
    }
}
