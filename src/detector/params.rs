//! Parameter types configuring the detector stages.
//!
//! Defaults target dark convex quadrilaterals (fiducials, calibration
//! squares) on a bright background at common resolutions. For tuning, start
//! with `min_contour_fraction` and the edge score threshold.

use super::refinement::ParallelRefineOptions;
use crate::contour::ConnectRule;
use crate::edge_score::EdgeScoreParams;
use crate::error::Error;
use crate::polyline::{ImproveCornerParams, SplitMergeParams};
use crate::refine::{CornerRefineParams, LineRefineParams};
use crate::types::Winding;
use serde::Deserialize;

/// Detector-wide parameters controlling the candidate pipeline.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PolygonDetectorParams {
    /// Accepted side counts. A fitted polygon with any other count is dropped.
    pub number_of_sides: Vec<usize>,
    /// Minimum external contour length as a fraction of the image width.
    pub min_contour_fraction: f64,
    /// Minimum split distance in pixels as a fraction of the image width.
    /// Applied per image with a floor of one pixel.
    pub minimum_split_fraction: f64,
    pub split_merge: SplitMergeParams,
    pub improve_corners: ImproveCornerParams,
    /// Vertex order of the reported polygons.
    pub output_winding: Winding,
    /// Pixel adjacency used by the default contour tracer.
    pub connect_rule: ConnectRule,
    /// Edge contrast check. `None` disables it.
    pub edge_score: Option<EdgeScoreParams>,
    /// Score the crude polygon before refinement instead of the refined one
    /// after it.
    pub check_edge_before: bool,
    /// Per-corner refinement. Takes precedence over `refine_lines`.
    pub refine_corners: Option<CornerRefineParams>,
    /// Whole-polygon line refinement, used when `refine_corners` is `None`.
    pub refine_lines: Option<LineRefineParams>,
    /// Refined corners required to accept a polygon, capped at its side
    /// count.
    pub min_refined_corners: usize,
    /// Rayon fan-out for the refinement stage. Not part of the JSON config.
    #[serde(skip)]
    pub parallel: ParallelRefineOptions,
}

impl Default for PolygonDetectorParams {
    fn default() -> Self {
        Self {
            number_of_sides: vec![4],
            min_contour_fraction: 0.05,
            minimum_split_fraction: 0.01,
            split_merge: SplitMergeParams::default(),
            improve_corners: ImproveCornerParams::default(),
            output_winding: Winding::Clockwise,
            connect_rule: ConnectRule::default(),
            edge_score: Some(EdgeScoreParams::default()),
            check_edge_before: true,
            refine_corners: Some(CornerRefineParams::default()),
            refine_lines: None,
            min_refined_corners: 3,
            parallel: ParallelRefineOptions::default(),
        }
    }
}

impl PolygonDetectorParams {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.number_of_sides.is_empty() {
            return Err(invalid("number_of_sides must not be empty"));
        }
        if let Some(&n) = self.number_of_sides.iter().find(|&&n| n < 3) {
            return Err(invalid(format!("a polygon needs at least 3 sides, got {n}")));
        }
        if !(self.min_contour_fraction > 0.0 && self.min_contour_fraction <= 1.0) {
            return Err(invalid(format!(
                "min_contour_fraction must be in (0, 1], got {}",
                self.min_contour_fraction
            )));
        }
        if !(self.minimum_split_fraction >= 0.0 && self.minimum_split_fraction.is_finite()) {
            return Err(invalid(format!(
                "minimum_split_fraction must be non-negative, got {}",
                self.minimum_split_fraction
            )));
        }
        if !(self.split_merge.split_fraction >= 0.0 && self.split_merge.split_fraction.is_finite()) {
            return Err(invalid(format!(
                "split_merge.split_fraction must be non-negative, got {}",
                self.split_merge.split_fraction
            )));
        }
        if let Some(edge) = &self.edge_score {
            if edge.num_samples == 0 {
                return Err(invalid("edge_score.num_samples must be positive"));
            }
        }
        if let Some(corners) = &self.refine_corners {
            if corners.max_line_samples == 0 || corners.end_point_distance == 0 {
                return Err(invalid(
                    "refine_corners needs positive max_line_samples and end_point_distance",
                ));
            }
        }
        if let Some(lines) = &self.refine_lines {
            if lines.line_samples == 0 {
                return Err(invalid("refine_lines.line_samples must be positive"));
            }
        }
        Ok(())
    }

    pub fn accepts_sides(&self, sides: usize) -> bool {
        self.number_of_sides.contains(&sides)
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidParams(msg.into())
}
