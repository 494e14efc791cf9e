//! Snap an approximate segment onto the nearest intensity edge.

use super::fit::weighted_line_fit;
use crate::geometry::LineGeneral;
use crate::image::{ImageSampler, ImageView};
use nalgebra::{Point2, Vector2};

/// Samples the gray image across a segment and fits a line through the
/// locations of the intensity step.
///
/// At each of `line_samples` positions along the segment, `2·radius + 2`
/// samples are taken one pixel apart perpendicular to it. Every adjacent pair
/// contributes its midpoint weighted by the absolute intensity difference.
#[derive(Clone, Debug)]
pub struct SnapToEdge {
    line_samples: usize,
    radius: usize,
    points: Vec<Point2<f64>>,
    weights: Vec<f64>,
}

impl SnapToEdge {
    pub fn new(line_samples: usize, radius: usize) -> Self {
        Self {
            line_samples: line_samples.max(2),
            radius,
            points: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Fit the edge near segment `a → b`. `None` when fewer than four
    /// weighted points were collected.
    pub fn refine<I>(
        &mut self,
        sampler: &ImageSampler<'_, I>,
        a: &Point2<f64>,
        b: &Point2<f64>,
    ) -> Option<LineGeneral>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        let slope = b - a;
        let length = slope.norm();
        if !(length > 0.0) {
            return None;
        }
        // unit step perpendicular to the segment
        let tangent = Vector2::new(slope.y / length, -slope.x / length);

        // local frame keeps the fit well conditioned anywhere in the image
        let center = Point2::from((a.coords + b.coords) * 0.5);
        let scale = 0.5 * length;

        self.points.clear();
        self.weights.clear();
        let num_samples = 2 * self.radius + 2;
        let half_width = self.radius as f64 + 0.5;
        for i in 0..self.line_samples {
            let frac = i as f64 / (self.line_samples - 1) as f64;
            let on_line = a + slope * frac;
            let first = on_line - tangent * half_width;
            let last = on_line + tangent * half_width;
            if !sampler.is_inside(first.x, first.y) || !sampler.is_inside(last.x, last.y) {
                continue;
            }

            let mut prev = sampler.get(first.x, first.y);
            for k in 1..num_samples {
                let p = first + tangent * k as f64;
                let value = sampler.get(p.x, p.y);
                let w = (value - prev).abs() as f64;
                if w > 0.0 {
                    let mid = p - tangent * 0.5;
                    self.points
                        .push(Point2::from((mid - center) / scale));
                    self.weights.push(w);
                }
                prev = value;
            }
        }

        if self.points.len() < 4 {
            return None;
        }
        let local = weighted_line_fit(&self.points, &self.weights)?;
        let centroid = Point2::from(local.centroid.coords * scale + center.coords);
        Some(LineGeneral::from_normal(local.normal(), &centroid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageF32;

    /// Vertical step: dark left of `edge_x`, bright right of it, with linear
    /// partial coverage on the boundary pixel.
    fn vertical_step(edge_x: f64) -> ImageF32 {
        ImageF32::from_fn(40, 40, |x, _| {
            let left = x as f64 - 0.5;
            let cover = (edge_x - left).clamp(0.0, 1.0) as f32;
            20.0 * cover + 200.0 * (1.0 - cover)
        })
    }

    #[test]
    fn snaps_to_a_vertical_edge() {
        let img = vertical_step(20.3);
        let sampler = ImageSampler::new(&img);
        let mut snap = SnapToEdge::new(10, 2);
        let line = snap
            .refine(&sampler, &Point2::new(19.4, 5.0), &Point2::new(20.6, 35.0))
            .expect("edge found");
        for y in [5.0, 20.0, 35.0] {
            let x = line.closest_point(&Point2::new(20.0, y)).x;
            assert!((x - 20.3).abs() < 0.1, "x={x} at y={y}");
        }
    }

    #[test]
    fn flat_image_has_no_edge() {
        let img = ImageF32::from_fn(20, 20, |_, _| 100.0);
        let sampler = ImageSampler::new(&img);
        let mut snap = SnapToEdge::new(10, 1);
        assert!(snap
            .refine(&sampler, &Point2::new(5.0, 5.0), &Point2::new(5.0, 15.0))
            .is_none());
    }

    #[test]
    fn segment_outside_the_image_fails() {
        let img = vertical_step(10.0);
        let sampler = ImageSampler::new(&img);
        let mut snap = SnapToEdge::new(10, 1);
        assert!(snap
            .refine(&sampler, &Point2::new(-10.0, 5.0), &Point2::new(-10.0, 15.0))
            .is_none());
    }
}
