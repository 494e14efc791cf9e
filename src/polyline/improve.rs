//! Local corner search on the contour.
//!
//! Split-and-merge places corners on the point farthest from a chord, which
//! on blurred or aliased shapes often lands a pixel or two away from the true
//! corner. Each corner is nudged along the contour to the index minimising the
//! summed line distance of its two adjacent sides.

use super::split_merge::{add_offset, circular_distance};
use crate::geometry::LineGeneral;
use crate::types::Point2i;
use serde::Deserialize;

/// Tuning for [`ImproveContourCorners`].
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ImproveCornerParams {
    /// Full passes over all corners before giving up on convergence.
    pub max_iterations: usize,
    /// Contour points sampled per side when scoring a candidate corner.
    pub max_line_samples: usize,
}

impl Default for ImproveCornerParams {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            max_line_samples: 20,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ImproveContourCorners {
    params: ImproveCornerParams,
    looping: bool,
    search_radius: usize,
}

impl ImproveContourCorners {
    /// `looping` selects closed contours; open ones keep their end corners.
    pub fn new(looping: bool, params: ImproveCornerParams) -> Self {
        Self {
            params,
            looping,
            search_radius: 3,
        }
    }

    /// Search radius used for a contour of `n` points.
    pub fn search_radius_for(n: usize) -> usize {
        (n / 12).clamp(3, 6)
    }

    /// Improve `corners` in place. Returns `false` when the corner set is
    /// unusable; running out of iterations is not a failure.
    pub fn fit(&mut self, contour: &[Point2i], corners: &mut [usize]) -> bool {
        let m = corners.len();
        if (self.looping && m < 3) || (!self.looping && m < 2) {
            return false;
        }
        let n = contour.len();
        self.search_radius = Self::search_radius_for(n);
        if n <= 2 * self.search_radius {
            return false;
        }
        let segments = if self.looping { m } else { m - 1 };
        if (0..segments).any(|i| corners[i] == corners[(i + 1) % m]) {
            return false;
        }

        let (first, last) = if self.looping { (0, m) } else { (1, m - 1) };
        for _ in 0..self.params.max_iterations {
            let mut moved = false;
            for i in first..last {
                let c0 = corners[(i + m - 1) % m];
                let c2 = corners[(i + 1) % m];
                let improved = self.optimize(contour, c0, corners[i], c2);
                if improved != corners[i] {
                    corners[i] = improved;
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }
        true
    }

    fn optimize(&self, contour: &[Point2i], c0: usize, c1: usize, c2: usize) -> usize {
        let n = contour.len();
        let r = self.search_radius as isize;
        // keep the candidate strictly between its neighbours
        let back = (circular_distance(c0, c1, n) as isize - 1).min(r);
        let ahead = (circular_distance(c1, c2, n) as isize - 1).min(r);

        let mut best_cost = self.cost(contour, c0, c1, c2);
        let mut best_offset = 0isize;
        for offset in -back..=ahead {
            if offset == 0 {
                if best_offset != 0 {
                    break;
                }
                continue;
            }
            let cost = self.cost(contour, c0, add_offset(c1, offset, n), c2);
            if cost < best_cost {
                best_cost = cost;
                best_offset = offset;
            }
        }
        add_offset(c1, best_offset, n)
    }

    fn cost(&self, contour: &[Point2i], c0: usize, c1: usize, c2: usize) -> f64 {
        self.side_cost(contour, c0, c1) + self.side_cost(contour, c1, c2)
    }

    fn side_cost(&self, contour: &[Point2i], from: usize, to: usize) -> f64 {
        let n = contour.len();
        let line = LineGeneral::from_points(&contour[from].to_f64(), &contour[to].to_f64());
        let length = circular_distance(from, to, n) + 1;
        let samples = self.params.max_line_samples.min(length).max(2);
        (0..samples)
            .map(|i| {
                let index = (from + i * (length - 1) / (samples - 1)) % n;
                line.distance(&contour[index].to_f64()).abs()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed contour of an axis-aligned `w × h` rectangle starting at the
    /// origin and walking clockwise on screen.
    fn rectangle(w: i32, h: i32) -> Vec<Point2i> {
        let mut contour = Vec::new();
        contour.extend((0..w).map(|x| Point2i::new(x, 0)));
        contour.extend((0..h).map(|y| Point2i::new(w, y)));
        contour.extend((0..w).map(|x| Point2i::new(w - x, h)));
        contour.extend((0..h).map(|y| Point2i::new(0, h - y)));
        contour
    }

    #[test]
    fn search_radius_is_bounded() {
        assert_eq!(ImproveContourCorners::search_radius_for(10), 3);
        assert_eq!(ImproveContourCorners::search_radius_for(60), 5);
        assert_eq!(ImproveContourCorners::search_radius_for(500), 6);
    }

    #[test]
    fn displaced_corners_move_back() {
        let contour = rectangle(20, 20);
        let truth = [0usize, 20, 40, 60];
        let mut corners = [2usize, 18, 41, 63];
        let mut alg = ImproveContourCorners::new(true, ImproveCornerParams::default());
        assert!(alg.fit(&contour, &mut corners));
        assert_eq!(corners, truth);
    }

    #[test]
    fn exact_corners_stay_put() {
        let contour = rectangle(16, 10);
        let mut corners = [0usize, 16, 26, 42];
        let mut alg = ImproveContourCorners::new(true, ImproveCornerParams::default());
        assert!(alg.fit(&contour, &mut corners));
        assert_eq!(corners, [0, 16, 26, 42]);
    }

    #[test]
    fn rejects_degenerate_input() {
        let contour = rectangle(20, 20);
        let mut alg = ImproveContourCorners::new(true, ImproveCornerParams::default());
        assert!(!alg.fit(&contour, &mut [0, 20]));
        assert!(!alg.fit(&contour, &mut [0, 20, 20, 60]));

        // six points cannot hold a search radius of three on both sides
        let short = rectangle(1, 2);
        assert!(!alg.fit(&short, &mut [0, 1, 3, 4]));
    }

    #[test]
    fn open_polyline_keeps_end_points() {
        let mut contour: Vec<Point2i> = (0..20).map(|x| Point2i::new(x, 0)).collect();
        contour.extend((1..20).map(|y| Point2i::new(19, y)));
        let mut corners = [0usize, 16, 38];
        let mut alg = ImproveContourCorners::new(false, ImproveCornerParams::default());
        assert!(alg.fit(&contour, &mut corners));
        assert_eq!(corners, [0, 19, 38]);
    }
}
