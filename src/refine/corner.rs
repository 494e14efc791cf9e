//! Sub-pixel refinement of a single polygon corner.

use super::edge::SnapToEdge;
use crate::geometry::LineGeneral;
use crate::image::{ImageSampler, ImageView};
use nalgebra::Point2;
use serde::Deserialize;

/// Tuning for the per-corner two-line refiner.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CornerRefineParams {
    /// Pixels skipped next to each segment end, where the two edges blur
    /// into each other.
    pub corner_offset: f64,
    /// Positions sampled along each side.
    pub max_line_samples: usize,
    /// Perpendicular sampling radius in pixels.
    pub sample_radius: usize,
    /// Fit/intersect rounds per corner.
    pub max_iterations: usize,
    /// Stop once the corner moves less than this many pixels.
    pub converge_tol_pixels: f64,
    /// Contour steps from a corner to the far end of each side it uses.
    pub end_point_distance: usize,
}

impl Default for CornerRefineParams {
    fn default() -> Self {
        Self {
            corner_offset: 2.0,
            max_line_samples: 10,
            sample_radius: 1,
            max_iterations: 10,
            converge_tol_pixels: 1e-6,
            end_point_distance: 12,
        }
    }
}

/// Refines a corner by fitting both adjacent edges and intersecting them.
#[derive(Clone, Debug)]
pub struct RefineCornerLines {
    params: CornerRefineParams,
    snap: SnapToEdge,
}

impl RefineCornerLines {
    pub fn new(params: CornerRefineParams) -> Self {
        Self {
            snap: SnapToEdge::new(params.max_line_samples, params.sample_radius),
            params,
        }
    }

    pub fn params(&self) -> &CornerRefineParams {
        &self.params
    }

    /// Refine `corner`, whose sides run toward `left` and `right`.
    ///
    /// Each round fits both edges, takes their intersection as the new corner
    /// and projects the far end points onto the fitted lines. `None` when an
    /// edge cannot be fitted or the lines do not intersect.
    pub fn refine<I>(
        &mut self,
        sampler: &ImageSampler<'_, I>,
        corner: Point2<f64>,
        left: Point2<f64>,
        right: Point2<f64>,
    ) -> Option<Point2<f64>>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        let mut corner = corner;
        let mut left = left;
        let mut right = right;
        let mut refined = None;

        for _ in 0..self.params.max_iterations {
            let line_left = self.fit_side(sampler, &corner, &left)?;
            let line_right = self.fit_side(sampler, &corner, &right)?;
            let found = line_left.intersection(&line_right)?;

            left = line_left.closest_point(&left);
            right = line_right.closest_point(&right);

            let moved = (found - corner).norm();
            corner = found;
            refined = Some(found);
            if moved < self.params.converge_tol_pixels {
                break;
            }
        }
        refined
    }

    fn fit_side<I>(
        &mut self,
        sampler: &ImageSampler<'_, I>,
        corner: &Point2<f64>,
        end: &Point2<f64>,
    ) -> Option<LineGeneral>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        let along = end - corner;
        let length = along.norm();
        let offset = self.params.corner_offset;
        if !(length > 2.0 * offset + 1.0) {
            return None;
        }
        let dir = along / length;
        let a = corner + dir * offset;
        let b = end - dir * offset;
        self.snap.refine(sampler, &a, &b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageF32;

    /// Dark quadrant `x < cx, y < cy` on a bright background, rendered with
    /// exact area coverage.
    fn dark_quadrant(cx: f64, cy: f64) -> ImageF32 {
        let cover = |p: f64, edge: f64| (edge - (p - 0.5)).clamp(0.0, 1.0);
        ImageF32::from_fn(60, 60, |x, y| {
            let c = cover(x as f64, cx) * cover(y as f64, cy);
            (20.0 * c + 200.0 * (1.0 - c)) as f32
        })
    }

    #[test]
    fn recovers_a_right_angle_corner() {
        let img = dark_quadrant(30.4, 29.7);
        let sampler = ImageSampler::new(&img);
        let mut alg = RefineCornerLines::new(CornerRefineParams::default());

        // coarse guess from boundary pixels, a pixel off
        let found = alg
            .refine(
                &sampler,
                Point2::new(30.0, 29.0),
                Point2::new(30.0, 15.0),
                Point2::new(16.0, 29.0),
            )
            .expect("corner refined");
        assert!((found.x - 30.4).abs() < 0.15, "{found:?}");
        assert!((found.y - 29.7).abs() < 0.15, "{found:?}");
    }

    #[test]
    fn short_sides_are_rejected() {
        let img = dark_quadrant(30.0, 30.0);
        let sampler = ImageSampler::new(&img);
        let mut alg = RefineCornerLines::new(CornerRefineParams::default());
        assert!(alg
            .refine(
                &sampler,
                Point2::new(30.0, 30.0),
                Point2::new(30.0, 27.0),
                Point2::new(27.0, 30.0),
            )
            .is_none());
    }
}
