//! Diagnostics data model exposed by the detector and the demo binary.
//!
//! `DetectionReport` is the entry point: it describes the input, every
//! candidate contour with its outcome, and per-stage timings. All types
//! serialize to camelCase JSON.

pub mod candidates;
pub mod report;
pub mod timing;

pub use candidates::{CandidateReport, RejectReason};
pub use report::{DetectionReport, InputDescriptor};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
