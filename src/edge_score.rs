//! Edge contrast check for candidate polygons.
//!
//! Samples the gray image just inside and just outside every side. A real
//! dark shape on a bright background has a clear step across all sides; a
//! polygon fitted to noise or texture does not.

use crate::image::{ImageSampler, ImageView};
use crate::types::Polygon;
use nalgebra::{Point2, Vector2};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct EdgeScoreParams {
    /// Distance along each side kept clear of its corners.
    pub corner_offset: f64,
    /// Perpendicular distance of the inside and outside samples.
    pub tangent_distance: f64,
    /// Sample positions per side.
    pub num_samples: usize,
    /// Minimum average outside-minus-inside intensity to accept a polygon.
    pub min_edge_score: f64,
}

impl Default for EdgeScoreParams {
    fn default() -> Self {
        Self {
            corner_offset: 2.0,
            tangent_distance: 1.5,
            num_samples: 15,
            min_edge_score: 6.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PolygonEdgeScore {
    params: EdgeScoreParams,
    average_inside: f64,
    average_outside: f64,
}

impl PolygonEdgeScore {
    pub fn new(params: EdgeScoreParams) -> Self {
        Self {
            params,
            average_inside: 0.0,
            average_outside: 0.0,
        }
    }

    pub fn params(&self) -> &EdgeScoreParams {
        &self.params
    }

    /// Sample both sides of every edge. Returns `false` when no side had a
    /// single sample inside the image.
    pub fn compute_edge<I>(&mut self, sampler: &ImageSampler<'_, I>, polygon: &Polygon) -> bool
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        self.average_inside = 0.0;
        self.average_outside = 0.0;
        let n = polygon.len();
        let Some(centroid) = polygon.centroid() else {
            return false;
        };

        let mut sides = 0usize;
        for i in 0..n {
            let a = polygon.vertices[i];
            let b = polygon.vertices[(i + 1) % n];
            if let Some((inside, outside)) = self.sample_side(sampler, &a, &b, &centroid) {
                self.average_inside += inside;
                self.average_outside += outside;
                sides += 1;
            }
        }
        if sides == 0 {
            return false;
        }
        self.average_inside /= sides as f64;
        self.average_outside /= sides as f64;
        true
    }

    fn sample_side<I>(
        &self,
        sampler: &ImageSampler<'_, I>,
        a: &Point2<f64>,
        b: &Point2<f64>,
        centroid: &Point2<f64>,
    ) -> Option<(f64, f64)>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        let along = b - a;
        let length = along.norm();
        if !(length > 0.0) {
            return None;
        }
        let dir = along / length;
        let (start, end) = if length < 3.0 * self.params.corner_offset {
            (*a, *b)
        } else {
            (
                a + dir * self.params.corner_offset,
                b - dir * self.params.corner_offset,
            )
        };

        let mut normal = Vector2::new(-dir.y, dir.x);
        let mid = Point2::from((a.coords + b.coords) * 0.5);
        if (centroid - mid).dot(&normal) < 0.0 {
            normal = -normal;
        }
        let tangent = normal * self.params.tangent_distance;

        let samples = self.params.num_samples.max(1);
        let mut inside = 0.0;
        let mut outside = 0.0;
        let mut count = 0usize;
        for k in 0..samples {
            let frac = if samples == 1 {
                0.5
            } else {
                k as f64 / (samples - 1) as f64
            };
            let p = start + (end - start) * frac;
            let pin = p + tangent;
            let pout = p - tangent;
            if !sampler.is_inside(pin.x, pin.y) || !sampler.is_inside(pout.x, pout.y) {
                continue;
            }
            inside += sampler.get(pin.x, pin.y) as f64;
            outside += sampler.get(pout.x, pout.y) as f64;
            count += 1;
        }
        (count > 0).then(|| (inside / count as f64, outside / count as f64))
    }

    /// Mean intensity step across the edges, positive for a dark shape on a
    /// bright background.
    pub fn average_edge_intensity(&self) -> f64 {
        self.average_outside - self.average_inside
    }

    pub fn average_inside(&self) -> f64 {
        self.average_inside
    }

    pub fn average_outside(&self) -> f64 {
        self.average_outside
    }

    /// Compute the edge and compare it against `min_edge_score`.
    pub fn validate<I>(&mut self, sampler: &ImageSampler<'_, I>, polygon: &Polygon) -> bool
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        self.compute_edge(sampler, polygon)
            && self.average_edge_intensity() >= self.params.min_edge_score
    }
}
