//! Split-and-merge over a closed contour.

use super::split_merge::{LineSplitter, SplitMergeLineFit, SplitMergeParams};
use crate::geometry::distance_sq;
use crate::types::Point2i;

/// Split-and-merge fitter for contours whose last point connects to the first.
///
/// Seeds with the two mutually farthest points, recursively splits both
/// halves, then alternates merge and split rounds until nothing changes or
/// the iteration budget runs out. Never reports fewer than three corners
/// unless the initial pass already found fewer.
#[derive(Clone, Debug)]
pub struct SplitMergeLineFitLoop {
    splitter: LineSplitter,
    max_iterations: usize,
    splits: Vec<usize>,
    // changed[i] flags the segment splits[i] -> splits[i + 1]
    changed: Vec<bool>,
    work: Vec<usize>,
    work_changed: Vec<bool>,
}

impl SplitMergeLineFitLoop {
    pub fn new(params: SplitMergeParams) -> Self {
        Self {
            splitter: LineSplitter::new(&params),
            max_iterations: params.max_iterations,
            splits: Vec::new(),
            changed: Vec::new(),
            work: Vec::new(),
            work_changed: Vec::new(),
        }
    }

    fn select_farthest(contour: &[Point2i], from: usize) -> usize {
        let origin = contour[from];
        let mut best = from;
        let mut best_d = 0.0;
        for (i, &p) in contour.iter().enumerate() {
            let d = distance_sq(origin, p);
            if d > best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }

    /// Remove corners whose neighbours already bound a valid segment.
    pub(crate) fn merge_segments(&mut self, contour: &[Point2i]) -> bool {
        let mut any = false;
        let mut i = 0;
        while i < self.splits.len() && self.splits.len() > 3 {
            let n = self.splits.len();
            let prev = self.splits[(i + n - 1) % n];
            let next = self.splits[(i + 1) % n];
            if self.splitter.select_split_offset(contour, prev, next).is_none() {
                self.splits.remove(i);
                self.changed.remove(i);
                let m = self.splits.len();
                self.changed[(i + m - 1) % m] = true;
                any = true;
            } else {
                i += 1;
            }
        }
        any
    }

    /// Split every flagged segment at most once.
    pub(crate) fn split_segments(&mut self, contour: &[Point2i]) -> bool {
        let n = self.splits.len();
        let mut any = false;
        self.work.clear();
        self.work_changed.clear();
        for i in 0..n {
            let start = self.splits[i];
            if !self.changed[i] {
                self.work.push(start);
                self.work_changed.push(false);
                continue;
            }
            let end = self.splits[(i + 1) % n];
            match self.splitter.select_split_offset(contour, start, end) {
                Some(offset) => {
                    self.work.push(start);
                    self.work_changed.push(true);
                    self.work.push((start + offset) % contour.len());
                    self.work_changed.push(true);
                    any = true;
                }
                None => {
                    self.work.push(start);
                    self.work_changed.push(false);
                }
            }
        }
        std::mem::swap(&mut self.splits, &mut self.work);
        std::mem::swap(&mut self.changed, &mut self.work_changed);
        any
    }
}

impl SplitMergeLineFit for SplitMergeLineFitLoop {
    fn process(&mut self, contour: &[Point2i]) {
        self.splits.clear();
        self.changed.clear();
        let n = contour.len();
        if n <= 1 {
            return;
        }

        let a = Self::select_farthest(contour, 0);
        let b = Self::select_farthest(contour, a);
        if a == b {
            return;
        }
        let (a, b) = if a < b { (a, b) } else { (b, a) };

        if self.max_iterations == 0 {
            self.splits.extend([a, b]);
            return;
        }

        self.work.clear();
        self.work.push(a);
        self.splitter.split_pixels(contour, a, b, &mut self.work);
        self.work.push(b);
        self.splitter.split_pixels(contour, b, a, &mut self.work);
        std::mem::swap(&mut self.splits, &mut self.work);
        self.changed.resize(self.splits.len(), false);

        for _ in 0..self.max_iterations {
            let merged = self.merge_segments(contour);
            let split = self.split_segments(contour);
            if !merged && !split {
                break;
            }
        }
    }

    fn splits(&self) -> &[usize] {
        &self.splits
    }

    fn set_split_fraction(&mut self, split_fraction: f64) {
        self.splitter.threshold.set_split_fraction(split_fraction);
    }

    fn set_minimum_split_pixels(&mut self, minimum_split_pixels: f64) {
        self.splitter
            .threshold
            .set_minimum_split_pixels(minimum_split_pixels);
    }

    fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }
}
