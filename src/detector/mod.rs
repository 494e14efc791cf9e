//! Polygon detector orchestrating contour fitting and sub-pixel refinement.
//!
//! Overview
//! - Traces blob contours in the binary mask (any [`ContourTracer`]).
//! - Drops contours that are short or touch the image border, then maps the
//!   rest into undistorted coordinates when a lens model is set.
//! - Fits corners with loop split-and-merge, keeps the allowed side counts
//!   and nudges each corner with the corner improver.
//! - Checks convexity and area of the crude polygon.
//! - Scores the edge contrast and refines the corners against the gray
//!   image, optionally in parallel.
//! - Orders vertices to the configured winding.
//!
//! Every rejected candidate is recorded in the [`DetectionReport`] with its
//! [`RejectReason`](crate::diagnostics::RejectReason).
//!
//! Modules
//! - [`params`] – configuration consumed by the detector and the demo.
//! - `pipeline` – the [`PolygonDetector`] implementation.
//! - `refinement` – edge checks and the (parallel) refinement batch.
//!
//! [`ContourTracer`]: crate::contour::ContourTracer
//! [`DetectionReport`]: crate::diagnostics::DetectionReport

pub mod params;
mod pipeline;
mod refinement;

pub use params::PolygonDetectorParams;
pub use pipeline::PolygonDetector;
pub use refinement::ParallelRefineOptions;
