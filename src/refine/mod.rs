//! Sub-pixel polygon refinement against the gray image.
//!
//! Two strategies share one contract through [`PolygonRefiner`]:
//!
//! - [`RefinePolygonCorners`] refines each corner independently from the two
//!   edges meeting there, using contour points to seed the side directions.
//! - [`RefinePolygonLines`] fits every side and rebuilds the corners from the
//!   intersections of neighbouring sides.
//!
//! Both fit edges with [`SnapToEdge`], which samples intensity steps across a
//! segment and performs a weighted orthogonal line fit.

pub mod corner;
pub mod edge;
mod fit;
pub mod polygon_corners;
pub mod polygon_lines;

pub use corner::{CornerRefineParams, RefineCornerLines};
pub use edge::SnapToEdge;
pub use polygon_corners::RefinePolygonCorners;
pub use polygon_lines::{LineRefineParams, RefinePolygonLines};

use crate::error::Error;
use crate::image::{ImageSampler, ImageView};
use crate::types::{Point2i, Polygon};

/// Selected refinement strategy.
#[derive(Clone, Debug)]
pub enum PolygonRefiner {
    Corners(RefinePolygonCorners),
    Lines(RefinePolygonLines),
}

/// Refined polygon plus the number of vertices that were actually improved.
#[derive(Clone, Debug)]
pub struct RefineOutcome {
    pub polygon: Polygon,
    pub refined_corners: usize,
}

impl PolygonRefiner {
    /// Refine `crude`, whose vertices are the contour points at `splits`.
    ///
    /// The line strategy is all-or-nothing: on failure the crude polygon is
    /// returned with zero refined corners.
    pub fn refine<I>(
        &mut self,
        sampler: &ImageSampler<'_, I>,
        contour: &[Point2i],
        splits: &[usize],
        crude: &Polygon,
    ) -> Result<RefineOutcome, Error>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        match self {
            Self::Corners(alg) => {
                let mut polygon = crude.clone();
                let refined_corners = alg.refine(sampler, contour, splits, &mut polygon)?;
                Ok(RefineOutcome {
                    polygon,
                    refined_corners,
                })
            }
            Self::Lines(alg) => Ok(match alg.refine(sampler, crude) {
                Some(polygon) => RefineOutcome {
                    refined_corners: polygon.len(),
                    polygon,
                },
                None => RefineOutcome {
                    polygon: crude.clone(),
                    refined_corners: 0,
                },
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Corners(_) => "corners",
            Self::Lines(_) => "lines",
        }
    }
}
