//! Split-and-merge over an open polyline.

use super::split_merge::{LineSplitter, SplitMergeLineFit, SplitMergeParams};
use crate::types::Point2i;

/// Split-and-merge fitter for contours with distinct first and last points.
///
/// The end points are always corners and never merged away; there is no
/// segment connecting the last corner back to the first.
#[derive(Clone, Debug)]
pub struct SplitMergeLineFitSegment {
    splitter: LineSplitter,
    max_iterations: usize,
    splits: Vec<usize>,
    changed: Vec<bool>,
    work: Vec<usize>,
    work_changed: Vec<bool>,
}

impl SplitMergeLineFitSegment {
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

    fn merge_segments(&mut self, contour: &[Point2i]) -> bool {
        let mut any = false;
        let mut i = 1;
        while i + 1 < self.splits.len() {
            let prev = self.splits[i - 1];
            let next = self.splits[i + 1];
            if self.splitter.select_split_offset(contour, prev, next).is_none() {
                self.splits.remove(i);
                self.changed.remove(i);
                self.changed[i - 1] = true;
                any = true;
            } else {
                i += 1;
            }
        }
        any
    }

    fn split_segments(&mut self, contour: &[Point2i]) -> bool {
        let mut any = false;
        self.work.clear();
        self.work_changed.clear();
        for i in 0..self.splits.len() - 1 {
            let start = self.splits[i];
            let end = self.splits[i + 1];
            let offset = if self.changed[i] {
                self.splitter.select_split_offset(contour, start, end)
            } else {
                None
            };
            self.work.push(start);
            match offset {
                Some(offset) => {
                    self.work_changed.push(true);
                    self.work.push(start + offset);
                    self.work_changed.push(true);
                    any = true;
                }
                None => self.work_changed.push(false),
            }
        }
        if let Some(&last) = self.splits.last() {
            self.work.push(last);
            self.work_changed.push(false);
        }
        std::mem::swap(&mut self.splits, &mut self.work);
        std::mem::swap(&mut self.changed, &mut self.work_changed);
        any
    }
}

impl SplitMergeLineFit for SplitMergeLineFitSegment {
    fn process(&mut self, contour: &[Point2i]) {
        self.splits.clear();
        self.changed.clear();
        let n = contour.len();
        if n <= 1 {
            return;
        }

        if self.max_iterations == 0 {
            self.splits.extend([0, n - 1]);
            return;
        }

        self.splits.push(0);
        self.splitter.split_pixels(contour, 0, n - 1, &mut self.splits);
        self.splits.push(n - 1);
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
