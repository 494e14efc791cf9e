use crate::types::Polygon;
use serde::Serialize;
use std::fmt;

/// Why a contour did not become a detected polygon.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RejectReason {
    /// The contour touches the image border, so the shape may be clipped.
    TouchesBorder,
    /// Split-and-merge produced a side count outside the allow-list.
    SideCount { found: usize },
    /// Corner improvement rejected the split set.
    ImproveCorners,
    NotConvex,
    AreaTooSmall { area: f64 },
    /// Edge contrast of the crude polygon was too weak.
    EdgeScoreBefore { score: f64 },
    /// Too few corners could be refined against the image.
    Refinement { refined_corners: usize },
    /// Edge contrast of the refined polygon was too weak.
    EdgeScoreAfter { score: f64 },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TouchesBorder => write!(f, "touches image border"),
            Self::SideCount { found } => write!(f, "{found} sides not allowed"),
            Self::ImproveCorners => write!(f, "corner improvement failed"),
            Self::NotConvex => write!(f, "not convex"),
            Self::AreaTooSmall { area } => write!(f, "area {area:.1} too small"),
            Self::EdgeScoreBefore { score } => write!(f, "crude edge score {score:.2} too low"),
            Self::Refinement { refined_corners } => {
                write!(f, "only {refined_corners} corners refined")
            }
            Self::EdgeScoreAfter { score } => write!(f, "refined edge score {score:.2} too low"),
        }
    }
}

/// Outcome of one contour that passed the size filter.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateReport {
    pub contour_id: usize,
    pub contour_len: usize,
    /// Corner indices into the (undistorted) contour, when fitting got that far.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub splits: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_corners: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<RejectReason>,
    /// Index into the detector's found polygons when accepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,
}

impl CandidateReport {
    pub fn new(contour_id: usize, contour_len: usize) -> Self {
        Self {
            contour_id,
            contour_len,
            splits: Vec::new(),
            edge_score: None,
            refined_corners: None,
            rejected: None,
            found_index: None,
            polygon: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.rejected.is_none()
    }
}
