//! Refinement stage: edge checks and sub-pixel refinement of the candidates
//! that survived contour fitting.
//!
//! Candidates are independent, so with the `parallel` feature the batch is
//! fanned out over Rayon. Each worker owns a clone of the refiner and the
//! scorer; results are collected in candidate order.

use crate::diagnostics::RejectReason;
use crate::edge_score::PolygonEdgeScore;
use crate::error::Error;
use crate::image::{ImageSampler, ImageView};
use crate::refine::PolygonRefiner;
use crate::types::{Point2i, Polygon, Winding};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runtime switch for refining candidates in parallel.
#[derive(Clone, Copy, Debug)]
pub struct ParallelRefineOptions {
    enabled: bool,
    min_candidates_for_parallel: usize,
}

impl ParallelRefineOptions {
    pub fn new(enabled: bool, min_candidates_for_parallel: usize) -> Self {
        Self {
            enabled,
            min_candidates_for_parallel: min_candidates_for_parallel.max(1),
        }
    }

    /// Refine sequentially regardless of the candidate count.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_candidates_for_parallel: usize::MAX,
        }
    }

    /// Returns true when a batch of `count` candidates should go to Rayon.
    pub fn should_parallelize(&self, count: usize) -> bool {
        self.enabled && count >= self.min_candidates_for_parallel
    }

    pub fn with_min_candidates(mut self, min_candidates: usize) -> Self {
        self.min_candidates_for_parallel = min_candidates.max(1);
        self
    }
}

impl Default for ParallelRefineOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_candidates_for_parallel: 8,
        }
    }
}

/// Candidate that passed the geometric checks.
#[derive(Clone, Debug)]
pub(crate) struct FittedCandidate {
    /// Position in the report's candidate list.
    pub report_index: usize,
    /// Undistorted contour the splits index into.
    pub points: Vec<Point2i>,
    pub splits: Vec<usize>,
    pub crude: Polygon,
}

#[derive(Clone, Debug)]
pub(crate) struct RefinedCandidate {
    pub polygon: Polygon,
    pub edge_score: Option<f64>,
    pub refined_corners: Option<usize>,
    pub rejected: Option<RejectReason>,
}

/// Per-thread state for the refinement stage.
#[derive(Clone, Debug)]
pub(crate) struct RefineWorker {
    pub refiner: Option<PolygonRefiner>,
    pub scorer: Option<PolygonEdgeScore>,
    pub check_edge_before: bool,
    pub min_refined_corners: usize,
    pub output_winding: Winding,
}

impl RefineWorker {
    pub fn run<I>(
        &mut self,
        sampler: &ImageSampler<'_, I>,
        candidate: &FittedCandidate,
    ) -> Result<RefinedCandidate, Error>
    where
        I: ImageView,
        I::Pixel: Into<f32>,
    {
        let mut out = RefinedCandidate {
            polygon: candidate.crude.clone(),
            edge_score: None,
            refined_corners: None,
            rejected: None,
        };

        if self.check_edge_before {
            if let Some(scorer) = self.scorer.as_mut() {
                let ok = scorer.validate(sampler, &candidate.crude);
                let score = scorer.average_edge_intensity();
                out.edge_score = Some(score);
                if !ok {
                    out.rejected = Some(RejectReason::EdgeScoreBefore { score });
                    return Ok(out);
                }
            }
        }

        if let Some(refiner) = self.refiner.as_mut() {
            let outcome =
                refiner.refine(sampler, &candidate.points, &candidate.splits, &candidate.crude)?;
            out.refined_corners = Some(outcome.refined_corners);
            let required = self.min_refined_corners.min(outcome.polygon.len());
            if outcome.refined_corners < required {
                out.rejected = Some(RejectReason::Refinement {
                    refined_corners: outcome.refined_corners,
                });
                return Ok(out);
            }
            out.polygon = outcome.polygon;
        }

        if !self.check_edge_before {
            if let Some(scorer) = self.scorer.as_mut() {
                let ok = scorer.validate(sampler, &out.polygon);
                let score = scorer.average_edge_intensity();
                out.edge_score = Some(score);
                if !ok {
                    out.rejected = Some(RejectReason::EdgeScoreAfter { score });
                    return Ok(out);
                }
            }
        }

        if out.polygon.winding() != self.output_winding {
            out.polygon.flip();
        }
        Ok(out)
    }
}

/// Refine a batch of candidates, sequentially or via Rayon.
pub(crate) fn refine_candidates<I>(
    worker: &mut RefineWorker,
    sampler: &ImageSampler<'_, I>,
    candidates: &[FittedCandidate],
    parallel: ParallelRefineOptions,
) -> Result<Vec<RefinedCandidate>, Error>
where
    I: ImageView + Sync,
    I::Pixel: Into<f32>,
{
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    if parallel.should_parallelize(candidates.len()) {
        #[cfg(feature = "parallel")]
        {
            return refine_candidates_parallel(worker, sampler, candidates);
        }
    }

    candidates
        .iter()
        .map(|candidate| worker.run(sampler, candidate))
        .collect()
}

#[cfg(feature = "parallel")]
fn refine_candidates_parallel<I>(
    worker: &RefineWorker,
    sampler: &ImageSampler<'_, I>,
    candidates: &[FittedCandidate],
) -> Result<Vec<RefinedCandidate>, Error>
where
    I: ImageView + Sync,
    I::Pixel: Into<f32>,
{
    candidates
        .par_iter()
        .map_init(|| worker.clone(), |local, candidate| local.run(sampler, candidate))
        .collect()
}
