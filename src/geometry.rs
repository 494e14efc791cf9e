//! Line primitives shared by the polyline fitter and the refiners.
//!
//! Squared distances are used on every hot path so no square root is taken
//! while searching for split points. Lines built from two identical points
//! have a zero direction; the resulting NaN distances are propagated as-is and
//! simply never win a comparison.

use crate::types::Point2i;
use nalgebra::{Point2, Vector2, Vector3};

/// Squared Euclidean distance between two contour points.
#[inline]
pub fn distance_sq(a: Point2i, b: Point2i) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx * dx + dy * dy
}

/// Acute angle in radians at `b` between segments `a→b` and `b→c`.
pub fn acute_angle(a: Point2i, b: Point2i, c: Point2i) -> f64 {
    let dx0 = (b.x - a.x) as f64;
    let dy0 = (b.y - a.y) as f64;
    let dx1 = (c.x - b.x) as f64;
    let dy1 = (c.y - b.y) as f64;

    let dot = dx0 * dx1 + dy0 * dy1;
    let bottom = (dx0 * dx0 + dy0 * dy0).sqrt() * (dx1 * dx1 + dy1 * dy1).sqrt();
    (dot / bottom).acos()
}

/// Line through `p` with direction `slope` (not normalised).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineParametric {
    pub p: Point2<f64>,
    pub slope: Vector2<f64>,
}

impl LineParametric {
    #[inline]
    pub fn from_points(a: Point2i, b: Point2i) -> Self {
        Self {
            p: a.to_f64(),
            slope: Vector2::new((b.x - a.x) as f64, (b.y - a.y) as f64),
        }
    }

    /// Squared perpendicular distance from `q` to the line.
    #[inline]
    pub fn distance_sq(&self, q: &Point2<f64>) -> f64 {
        let d = q - self.p;
        let t = self.slope.dot(&d) / self.slope.norm_squared();
        (d - self.slope * t).norm_squared()
    }
}

/// Line `a·x + b·y + c = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineGeneral {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LineGeneral {
    /// Line through two points, normalised so that `a² + b² = 1`.
    ///
    /// The coefficients are derived from the direction vector rather than the
    /// homogeneous cross product so large pixel coordinates do not lose
    /// precision in `c`.
    pub fn from_points(p0: &Point2<f64>, p1: &Point2<f64>) -> Self {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        let norm = (dx * dx + dy * dy).sqrt();
        let a = dy / norm;
        let b = -dx / norm;
        Self {
            a,
            b,
            c: -(a * p0.x + b * p0.y),
        }
    }

    /// Line through `point` with unit normal `normal`.
    pub fn from_normal(normal: Vector2<f64>, point: &Point2<f64>) -> Self {
        Self {
            a: normal.x,
            b: normal.y,
            c: -(normal.x * point.x + normal.y * point.y),
        }
    }

    /// Signed distance; the magnitude is Euclidean for normalised lines.
    #[inline]
    pub fn distance(&self, p: &Point2<f64>) -> f64 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Orthogonal projection of `p` onto the line.
    pub fn closest_point(&self, p: &Point2<f64>) -> Point2<f64> {
        let n2 = self.a * self.a + self.b * self.b;
        let t = self.distance(p) / n2;
        Point2::new(p.x - t * self.a, p.y - t * self.b)
    }

    #[inline]
    fn homogeneous(&self) -> Vector3<f64> {
        Vector3::new(self.a, self.b, self.c)
    }

    /// Intersection with `other`, `None` when the lines are (nearly) parallel.
    pub fn intersection(&self, other: &LineGeneral) -> Option<Point2<f64>> {
        let x = self.homogeneous().cross(&other.homogeneous());
        if x.z.abs() <= 1e-12 || !x.z.is_finite() {
            return None;
        }
        let p = Point2::new(x.x / x.z, x.y / x.z);
        (p.x.is_finite() && p.y.is_finite()).then_some(p)
    }
}

/// Pre-squared split tolerances.
///
/// A point splits a segment when its squared distance to the segment's line
/// exceeds `max(minimum_split_pixels², |ab|² · split_fraction²)`: the
/// fractional term keeps large shapes scale invariant while the pixel floor
/// stops short segments of small shapes from splitting on pixel noise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitThreshold {
    pub(crate) tolerance_fraction_sq: f64,
    pub(crate) minimum_split_pixels_sq: f64,
}

impl SplitThreshold {
    pub fn new(split_fraction: f64, minimum_split_pixels: f64) -> Self {
        Self {
            tolerance_fraction_sq: split_fraction * split_fraction,
            minimum_split_pixels_sq: minimum_split_pixels * minimum_split_pixels,
        }
    }

    #[inline]
    pub fn threshold_sq(&self, a: Point2i, b: Point2i) -> f64 {
        self.minimum_split_pixels_sq
            .max(distance_sq(a, b) * self.tolerance_fraction_sq)
    }

    pub fn set_split_fraction(&mut self, split_fraction: f64) {
        self.tolerance_fraction_sq = split_fraction * split_fraction;
    }

    pub fn set_minimum_split_pixels(&mut self, minimum_split_pixels: f64) {
        self.minimum_split_pixels_sq = minimum_split_pixels * minimum_split_pixels;
    }
}
