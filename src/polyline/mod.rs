//! Polyline approximation of traced contours.
//!
//! [`SplitMergeLineFitLoop`] handles closed contours and
//! [`SplitMergeLineFitSegment`] open ones; both produce corner indices into
//! the input contour that [`ImproveContourCorners`] can then nudge locally.

pub mod improve;
pub mod loop_fit;
pub mod segment_fit;
pub mod split_merge;

pub use improve::{ImproveContourCorners, ImproveCornerParams};
pub use loop_fit::SplitMergeLineFitLoop;
pub use segment_fit::SplitMergeLineFitSegment;
pub use split_merge::{
    add_offset, circular_distance, subtract, LineSplitter, SplitMergeLineFit, SplitMergeParams,
};
