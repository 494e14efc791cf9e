//! Lens distortion transforms between the input image and the undistorted
//! working frame.
//!
//! The detector only consumes the [`PixelTransform`] interface. A
//! single-parameter division model is provided so a full pipeline can run
//! without an external calibration library.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-wise pixel coordinate mapping.
pub trait PixelTransform: Send + Sync {
    fn compute(&self, x: f64, y: f64) -> [f64; 2];
}

/// Axis-aligned bounds of a transformed image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// True when the bounds lie within the pixel domain `[0, width) × [0, height)`.
    /// `tol` only relaxes the lower edges.
    pub fn fits(&self, width: usize, height: usize, tol: f64) -> bool {
        self.x0 >= -tol && self.y0 >= -tol && self.x1 < width as f64 && self.y1 < height as f64
    }
}

/// Bounds of the image border after applying `transform`.
///
/// Every pixel on the four borders (`x = 0`, `x = width - 1`, `y = 0`,
/// `y = height - 1`) is mapped; non-finite results are skipped.
pub fn bound_box(width: usize, height: usize, transform: &dyn PixelTransform) -> Bounds {
    let mut b = Bounds {
        x0: f64::MAX,
        y0: f64::MAX,
        x1: f64::MIN,
        y1: f64::MIN,
    };
    let right = width.saturating_sub(1);
    let bottom = height.saturating_sub(1);
    let mut include = |x: f64, y: f64| {
        let [u, v] = transform.compute(x, y);
        if u.is_finite() && v.is_finite() {
            b.x0 = b.x0.min(u);
            b.y0 = b.y0.min(v);
            b.x1 = b.x1.max(u);
            b.y1 = b.y1.max(v);
        }
    };
    for y in 0..=bottom {
        include(0.0, y as f64);
        include(right as f64, y as f64);
    }
    for x in 0..=right {
        include(x as f64, 0.0);
        include(x as f64, bottom as f64);
    }
    b
}

/// Single-parameter division distortion model.
///
/// Negative `lambda` is barrel distortion, positive is pincushion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivisionModel {
    pub lambda: f64,
    /// Distortion center x (pixels).
    pub cx: f64,
    /// Distortion center y (pixels).
    pub cy: f64,
}

impl DivisionModel {
    pub fn new(lambda: f64, cx: f64, cy: f64) -> Self {
        Self { lambda, cx, cy }
    }

    /// Model centered on a `width × height` image.
    pub fn centered(lambda: f64, width: usize, height: usize) -> Self {
        Self::new(lambda, width as f64 / 2.0, height as f64 / 2.0)
    }

    /// Distorted input pixel → undistorted pixel. Closed form.
    pub fn undistort_point(&self, p: [f64; 2]) -> [f64; 2] {
        let dx = p[0] - self.cx;
        let dy = p[1] - self.cy;
        let denom = 1.0 + self.lambda * (dx * dx + dy * dy);
        if denom.abs() < 1e-12 || !denom.is_finite() {
            return p;
        }
        [self.cx + dx / denom, self.cy + dy / denom]
    }

    /// Undistorted pixel → distorted input pixel, solved by fixed-point
    /// iteration. `None` when the iteration diverges.
    pub fn distort_point(&self, p: [f64; 2]) -> Option<[f64; 2]> {
        if self.lambda.abs() < 1e-18 {
            return Some(p);
        }
        let ux = p[0] - self.cx;
        let uy = p[1] - self.cy;
        let (mut dx, mut dy) = (ux, uy);
        for _ in 0..50 {
            let factor = 1.0 + self.lambda * (dx * dx + dy * dy);
            if factor.abs() < 1e-12 || !factor.is_finite() {
                return None;
            }
            let nx = ux * factor;
            let ny = uy * factor;
            if !nx.is_finite() || !ny.is_finite() {
                return None;
            }
            let delta = (nx - dx).hypot(ny - dy);
            dx = nx;
            dy = ny;
            if delta < 1e-12 {
                break;
            }
        }
        Some([self.cx + dx, self.cy + dy])
    }
}

/// Division model followed by a scale and translation of the output frame.
#[derive(Clone, Copy, Debug)]
struct AdjustedUndistort {
    model: DivisionModel,
    scale: f64,
    offset: [f64; 2],
}

impl PixelTransform for AdjustedUndistort {
    fn compute(&self, x: f64, y: f64) -> [f64; 2] {
        let [u, v] = self.model.undistort_point([x, y]);
        [
            u * self.scale + self.offset[0],
            v * self.scale + self.offset[1],
        ]
    }
}

/// Inverse of [`AdjustedUndistort`]. Yields NaN where the model cannot be
/// inverted.
#[derive(Clone, Copy, Debug)]
struct AdjustedDistort {
    model: DivisionModel,
    scale: f64,
    offset: [f64; 2],
}

impl PixelTransform for AdjustedDistort {
    fn compute(&self, x: f64, y: f64) -> [f64; 2] {
        let u = (x - self.offset[0]) / self.scale;
        let v = (y - self.offset[1]) / self.scale;
        self.model
            .distort_point([u, v])
            .unwrap_or([f64::NAN, f64::NAN])
    }
}

/// Matched pair of transforms between the distorted input image and the
/// undistorted working frame.
#[derive(Clone)]
pub struct LensDistortion {
    to_undistorted: Arc<dyn PixelTransform>,
    to_distorted: Arc<dyn PixelTransform>,
}

impl LensDistortion {
    pub fn new(
        to_undistorted: Arc<dyn PixelTransform>,
        to_distorted: Arc<dyn PixelTransform>,
    ) -> Self {
        Self {
            to_undistorted,
            to_distorted,
        }
    }

    /// Raw division model without any adjustment of the output frame.
    pub fn division(model: DivisionModel) -> Self {
        Self::adjusted(model, 1.0, [0.0, 0.0])
    }

    /// Division model rescaled so the whole undistorted input fits, centered,
    /// inside the pixel range `[0, width - 1] × [0, height - 1]`.
    pub fn full_view(model: DivisionModel, width: usize, height: usize) -> Self {
        let raw = AdjustedUndistort {
            model,
            scale: 1.0,
            offset: [0.0, 0.0],
        };
        let b = bound_box(width, height, &raw);
        let right = width.saturating_sub(1) as f64;
        let bottom = height.saturating_sub(1) as f64;
        let scale = (right / b.width()).min(bottom / b.height());
        let offset = [
            (right - b.width() * scale) / 2.0 - b.x0 * scale,
            (bottom - b.height() * scale) / 2.0 - b.y0 * scale,
        ];
        log::debug!(
            "full view adjustment: lambda={:e} scale={scale:.6} offset=({:.3}, {:.3})",
            model.lambda,
            offset[0],
            offset[1]
        );
        Self::adjusted(model, scale, offset)
    }

    fn adjusted(model: DivisionModel, scale: f64, offset: [f64; 2]) -> Self {
        Self {
            to_undistorted: Arc::new(AdjustedUndistort {
                model,
                scale,
                offset,
            }),
            to_distorted: Arc::new(AdjustedDistort {
                model,
                scale,
                offset,
            }),
        }
    }

    /// Input image pixel → working frame.
    pub fn to_undistorted(&self) -> Arc<dyn PixelTransform> {
        Arc::clone(&self.to_undistorted)
    }

    /// Working frame → input image pixel.
    pub fn to_distorted(&self) -> Arc<dyn PixelTransform> {
        Arc::clone(&self.to_distorted)
    }
}

impl std::fmt::Debug for LensDistortion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LensDistortion").finish_non_exhaustive()
    }
}
