use std::fmt;

/// Setup and input errors. Rejected candidates are not errors; they are
/// reported through [`crate::diagnostics::RejectReason`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Parameter set failed validation.
    InvalidParams(String),
    /// Gray and binary inputs differ in size.
    ShapeMismatch {
        gray: (usize, usize),
        binary: (usize, usize),
    },
    /// The undistorted image does not fit inside the input image bounds.
    DistortionBounds {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        width: usize,
        height: usize,
    },
    /// Output polygon size does not match the number of corners.
    SplitCountMismatch { splits: usize, vertices: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParams(msg) => write!(f, "invalid parameters: {msg}"),
            Self::ShapeMismatch { gray, binary } => write!(
                f,
                "gray image is {}x{} but binary image is {}x{}",
                gray.0, gray.1, binary.0, binary.1
            ),
            Self::DistortionBounds {
                x0,
                y0,
                x1,
                y1,
                width,
                height,
            } => write!(
                f,
                "undistorted bounds [{x0:.3}, {x1:.3}] x [{y0:.3}, {y1:.3}] exceed the {width}x{height} input image"
            ),
            Self::SplitCountMismatch { splits, vertices } => write!(
                f,
                "polygon has {vertices} vertices but {splits} corners were supplied"
            ),
        }
    }
}

impl std::error::Error for Error {}
