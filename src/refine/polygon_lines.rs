//! Whole-polygon refinement by fitting every side to the image.

use super::edge::SnapToEdge;
use crate::geometry::LineGeneral;
use crate::image::{ImageSampler, ImageView};
use crate::types::Polygon;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct LineRefineParams {
    /// Pixels trimmed from both ends of each side before sampling.
    pub corner_offset: f64,
    /// Positions sampled along each side.
    pub line_samples: usize,
    /// Perpendicular sampling radius in pixels.
    pub sample_radius: usize,
    pub max_iterations: usize,
    /// Stop once no vertex moves more than this many pixels.
    pub converge_tol_pixels: f64,
}

impl Default for LineRefineParams {
    fn default() -> Self {
        Self {
            corner_offset: 2.0,
            line_samples: 20,
            sample_radius: 1,
            max_iterations: 10,
            converge_tol_pixels: 1e-6,
        }
    }
}

/// Snaps each side onto the image edge and rebuilds the vertices from the
/// intersections of neighbouring sides.
#[derive(Clone, Debug)]
pub struct RefinePolygonLines {
    params: LineRefineParams,
    snap: SnapToEdge,
    lines: Vec<LineGeneral>,
}

impl RefinePolygonLines {
    pub fn new(params: LineRefineParams) -> Self {
        Self {
            snap: SnapToEdge::new(params.line_samples, params.sample_radius),
            params,
            lines: Vec::new(),
        }
    }

    /// Refine `input`. `None` when any side cannot be fitted or two
    /// neighbouring sides are parallel.
    pub fn refine<I>(&mut self, sampler: &ImageSampler<'_, I>, input: &Polygon) -> Option<Polygon>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        let n = input.len();
        if n < 3 {
            return None;
        }
        let mut current = input.clone();
        let offset = self.params.corner_offset;

        for _ in 0..self.params.max_iterations.max(1) {
            self.lines.clear();
            for i in 0..n {
                let a = current.vertices[i];
                let b = current.vertices[(i + 1) % n];
                let along = b - a;
                let length = along.norm();
                if !(length > 2.0 * offset + 1.0) {
                    return None;
                }
                let dir = along / length;
                let line = self.snap.refine(sampler, &(a + dir * offset), &(b - dir * offset))?;
                self.lines.push(line);
            }

            let mut moved = 0.0f64;
            for i in 0..n {
                let before = &self.lines[(i + n - 1) % n];
                let after = &self.lines[i];
                let p = before.intersection(after)?;
                moved = moved.max((p - current.vertices[i]).norm());
                current.vertices[i] = p;
            }
            if moved < self.params.converge_tol_pixels {
                break;
            }
        }
        Some(current)
    }
}
