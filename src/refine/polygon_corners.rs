use super::corner::{CornerRefineParams, RefineCornerLines};
use crate::error::Error;
use crate::image::{ImageSampler, ImageView};
use crate::polyline::{add_offset, circular_distance};
use crate::types::{Point2i, Polygon};

/// Refines every corner of a polygon fitted to a closed contour.
///
/// The sides used for each corner end `end_point_distance` contour steps
/// away, or at the neighbouring corner when that is closer.
#[derive(Clone, Debug)]
pub struct RefinePolygonCorners {
    corner: RefineCornerLines,
    end_point_distance: usize,
}

impl RefinePolygonCorners {
    pub fn new(params: CornerRefineParams) -> Self {
        Self {
            corner: RefineCornerLines::new(params),
            end_point_distance: params.end_point_distance,
        }
    }

    /// Refine the corners selected by `splits` into `refined`.
    ///
    /// Corners that fail keep their contour position. Returns how many were
    /// refined.
    pub fn refine<I>(
        &mut self,
        sampler: &ImageSampler<'_, I>,
        contour: &[Point2i],
        splits: &[usize],
        refined: &mut Polygon,
    ) -> Result<usize, Error>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        if refined.len() != splits.len() {
            return Err(Error::SplitCountMismatch {
                splits: splits.len(),
                vertices: refined.len(),
            });
        }

        let m = splits.len();
        let mut good = 0;
        for i in 0..m {
            let prev = splits[(i + m - 1) % m];
            let cur = splits[i];
            let next = splits[(i + 1) % m];
            let forward = self.pick_end_index(contour.len(), cur, next, true);
            let backward = self.pick_end_index(contour.len(), cur, prev, false);

            let corner = contour[cur].to_f64();
            match self.corner.refine(
                sampler,
                corner,
                contour[forward].to_f64(),
                contour[backward].to_f64(),
            ) {
                Some(p) => {
                    refined.vertices[i] = p;
                    good += 1;
                }
                None => refined.vertices[i] = corner,
            }
        }
        Ok(good)
    }

    /// Contour index `end_point_distance` steps from `corner` toward
    /// `neighbour`, never past it.
    fn pick_end_index(&self, n: usize, corner: usize, neighbour: usize, forward: bool) -> usize {
        if forward {
            let steps = circular_distance(corner, neighbour, n).min(self.end_point_distance);
            add_offset(corner, steps as isize, n)
        } else {
            let steps = circular_distance(neighbour, corner, n).min(self.end_point_distance);
            add_offset(corner, -(steps as isize), n)
        }
    }
}
