use super::{CandidateReport, TimingBreakdown};
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    /// Contours shorter than this many pixels were skipped.
    pub min_contour_pixels: usize,
    pub min_area: f64,
    pub minimum_split_pixels: f64,
    pub lens_distortion: bool,
}

/// Structured trace of one [`PolygonDetector::process`](crate::PolygonDetector::process) call.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub input: InputDescriptor,
    pub contours_total: usize,
    pub contours_too_small: usize,
    pub candidates: Vec<CandidateReport>,
    pub found: usize,
    pub timings: TimingBreakdown,
}

impl DetectionReport {
    /// Candidates that were rejected, paired with their reason.
    pub fn rejections(&self) -> impl Iterator<Item = (&CandidateReport, &super::RejectReason)> {
        self.candidates
            .iter()
            .filter_map(|c| c.rejected.as_ref().map(|r| (c, r)))
    }
}
