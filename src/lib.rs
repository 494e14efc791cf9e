#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod types;

// Building blocks used by the detector, usable on their own.
pub mod contour;
pub mod distort;
pub mod edge_score;
pub mod geometry;
pub mod polyline;
pub mod refine;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{PolygonDetector, PolygonDetectorParams};
pub use crate::error::Error;
pub use crate::types::{Point2i, Polygon, Winding};

// Per-call diagnostics.
pub use crate::diagnostics::{DetectionReport, RejectReason};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use polygon_detector::prelude::*;
///
/// # fn main() -> Result<(), Error> {
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![200u8; w * h];
/// let mask: Vec<u8> = gray.iter().map(|&v| u8::from(v < 100)).collect();
///
/// let mut det = PolygonDetector::new(PolygonDetectorParams {
///     number_of_sides: vec![3, 4],
///     ..Default::default()
/// })?;
/// det.process(&ImageU8::new(w, h, &gray), &ImageU8::new(w, h, &mask))?;
/// for poly in det.found() {
///     println!("{} corners, area {:.1}", poly.len(), poly.area());
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, ImageU8};
    pub use crate::{Error, Polygon, PolygonDetector, PolygonDetectorParams, Winding};
}
