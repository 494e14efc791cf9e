//! Blob boundary extraction from binary masks.
//!
//! The detector only needs ordered boundary pixels per blob; any
//! [`ContourTracer`] can supply them. [`LinearContourLabeler`] is the default
//! single-pass tracer.

mod label;

pub use label::LinearContourLabeler;

use crate::image::{ImageI32, ImageU8};
use crate::types::Point2i;
use serde::{Deserialize, Serialize};

/// Pixel adjacency used when following a boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectRule {
    Four,
    #[default]
    Eight,
}

/// Boundaries of one labeled blob, in image pixel coordinates.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Contour {
    /// Label of the blob in the labeled image (starts at 1).
    pub id: usize,
    /// Outer boundary, clockwise on screen, starting at the blob's top-left
    /// pixel.
    pub external: Vec<Point2i>,
    /// Boundaries of holes inside the blob.
    pub internal: Vec<Vec<Point2i>>,
}

/// Extracts blob contours from a binary mask.
pub trait ContourTracer: Send {
    /// Trace every blob of non-zero pixels in `binary`. `labeled` is resized
    /// to the mask and receives the blob id of every foreground pixel.
    fn process(&mut self, binary: &ImageU8<'_>, labeled: &mut ImageI32) -> Vec<Contour>;
}
