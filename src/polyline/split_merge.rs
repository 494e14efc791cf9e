//! Shared split-and-merge machinery over a circular contour buffer.
//!
//! Contour positions are plain indices; walking from `start` to `end` always
//! moves forward and wraps past the last point. The looped and bounded
//! fitters only differ in how they seed and which corners they may merge.

use crate::geometry::{LineParametric, SplitThreshold};
use crate::types::Point2i;
use serde::Deserialize;

/// Tuning for the split-and-merge fitters.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SplitMergeParams {
    /// Split when a point is farther than this fraction of the segment length.
    pub split_fraction: f64,
    /// Always split when a point is farther than this many pixels.
    pub minimum_split_pixels: f64,
    /// Merge/split rounds after the initial pass. Zero keeps the seeds only.
    pub max_iterations: usize,
}

impl Default for SplitMergeParams {
    fn default() -> Self {
        Self {
            split_fraction: 0.05,
            minimum_split_pixels: 1.0,
            max_iterations: 20,
        }
    }
}

/// Approximates an ordered contour with a list of corner indices.
pub trait SplitMergeLineFit {
    /// Fit corners to `contour`. Previous results are discarded.
    fn process(&mut self, contour: &[Point2i]);

    /// Corner indices into the last processed contour.
    fn splits(&self) -> &[usize];

    fn set_split_fraction(&mut self, split_fraction: f64);

    fn set_minimum_split_pixels(&mut self, minimum_split_pixels: f64);

    fn set_max_iterations(&mut self, max_iterations: usize);
}

/// Number of forward steps from `i` to `j` on a ring of `n` points.
#[inline]
pub fn circular_distance(i: usize, j: usize, n: usize) -> usize {
    if j >= i {
        j - i
    } else {
        n - i + j
    }
}

/// `i + offset` wrapped onto a ring of `n` points. Negative offsets walk back.
#[inline]
pub fn add_offset(i: usize, offset: isize, n: usize) -> usize {
    (i as isize + offset).rem_euclid(n as isize) as usize
}

/// Signed shortest step count from `j` to `i` on a ring of `n` points.
pub fn subtract(i: usize, j: usize, n: usize) -> isize {
    let forward = circular_distance(j, i, n) as isize;
    if forward > n as isize / 2 {
        forward - n as isize
    } else {
        forward
    }
}

/// Split search against a fixed threshold.
#[derive(Clone, Copy, Debug)]
pub struct LineSplitter {
    pub threshold: SplitThreshold,
}

impl LineSplitter {
    pub fn new(params: &SplitMergeParams) -> Self {
        Self {
            threshold: SplitThreshold::new(params.split_fraction, params.minimum_split_pixels),
        }
    }

    /// Offset from `start` of the point farthest from the chord `start → end`.
    ///
    /// Only points strictly beyond the split threshold qualify and the first
    /// of equally distant points wins. Spans without an interior point return
    /// `None`.
    pub fn select_split_offset(&self, contour: &[Point2i], start: usize, end: usize) -> Option<usize> {
        let n = contour.len();
        let length = circular_distance(start, end, n);
        if length < 2 {
            return None;
        }

        let a = contour[start];
        let b = contour[end];
        let line = LineParametric::from_points(a, b);
        let mut best = self.threshold.threshold_sq(a, b);
        let mut found = None;
        for offset in 1..length {
            let p = contour[(start + offset) % n].to_f64();
            let d = line.distance_sq(&p);
            if d > best {
                best = d;
                found = Some(offset);
            }
        }
        found
    }

    /// Recursively split `start → end`, appending interior corners in
    /// traversal order. The end points themselves are not written.
    pub fn split_pixels(&self, contour: &[Point2i], start: usize, end: usize, out: &mut Vec<usize>) {
        let Some(offset) = self.select_split_offset(contour, start, end) else {
            return;
        };
        let mid = (start + offset) % contour.len();
        self.split_pixels(contour, start, mid, out);
        out.push(mid);
        self.split_pixels(contour, mid, end, out);
    }
}
