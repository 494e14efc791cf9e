use super::params::PolygonDetectorParams;
use super::refinement::{refine_candidates, FittedCandidate, RefineWorker};
use crate::contour::{Contour, ContourTracer, LinearContourLabeler};
use crate::diagnostics::{
    elapsed_ms, CandidateReport, DetectionReport, InputDescriptor, RejectReason, TimingBreakdown,
};
use crate::distort::{bound_box, PixelTransform};
use crate::edge_score::PolygonEdgeScore;
use crate::error::Error;
use crate::image::{ImageI32, ImageSampler, ImageU8, ImageView};
use crate::polyline::{ImproveContourCorners, SplitMergeLineFit, SplitMergeLineFitLoop};
use crate::refine::{PolygonRefiner, RefinePolygonCorners, RefinePolygonLines};
use crate::types::{Point2i, Polygon};
use std::sync::Arc;
use std::time::Instant;

/// Bounds slack, in pixels, tolerated when validating a lens model.
const DISTORTION_BOUNDS_TOL: f64 = 1e-4;

struct LensSetup {
    width: usize,
    height: usize,
    to_undistorted: Arc<dyn PixelTransform>,
    to_distorted: Arc<dyn PixelTransform>,
}

/// Detects convex polygons of known side counts in a gray image and its
/// binary mask.
///
/// Scratch buffers live in the detector and are reset by every
/// [`process`](Self::process) call, so one instance should be reused across
/// frames.
pub struct PolygonDetector {
    params: PolygonDetectorParams,
    tracer: Box<dyn ContourTracer>,
    fitter: SplitMergeLineFitLoop,
    improver: ImproveContourCorners,
    worker: RefineWorker,
    lens: Option<LensSetup>,
    labeled: ImageI32,
    contours: Vec<Contour>,
    found: Vec<Polygon>,
    found_contours: Vec<usize>,
    report: DetectionReport,
}

impl PolygonDetector {
    pub fn new(params: PolygonDetectorParams) -> Result<Self, Error> {
        params.validate()?;
        let refiner = match (&params.refine_corners, &params.refine_lines) {
            (Some(corners), _) => Some(PolygonRefiner::Corners(RefinePolygonCorners::new(*corners))),
            (None, Some(lines)) => Some(PolygonRefiner::Lines(RefinePolygonLines::new(*lines))),
            (None, None) => None,
        };
        let worker = RefineWorker {
            refiner,
            scorer: params.edge_score.map(PolygonEdgeScore::new),
            check_edge_before: params.check_edge_before,
            min_refined_corners: params.min_refined_corners,
            output_winding: params.output_winding,
        };
        log::debug!(
            "polygon detector: sides {:?}, refiner {}",
            params.number_of_sides,
            worker.refiner.as_ref().map_or("none", PolygonRefiner::name)
        );
        Ok(Self {
            tracer: Box::new(LinearContourLabeler::new(params.connect_rule)),
            fitter: SplitMergeLineFitLoop::new(params.split_merge),
            improver: ImproveContourCorners::new(true, params.improve_corners),
            worker,
            lens: None,
            labeled: ImageI32::new(0, 0),
            contours: Vec::new(),
            found: Vec::new(),
            found_contours: Vec::new(),
            report: DetectionReport::default(),
            params,
        })
    }

    /// Replace the default contour tracer.
    pub fn with_tracer(mut self, tracer: Box<dyn ContourTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn params(&self) -> &PolygonDetectorParams {
        &self.params
    }

    /// Work in undistorted coordinates for `width`×`height` inputs.
    ///
    /// `to_undistorted` maps contour pixels into the output frame,
    /// `to_distorted` maps sample positions back into the input image. The
    /// undistorted image must stay inside the input bounds.
    pub fn set_lens_distortion(
        &mut self,
        width: usize,
        height: usize,
        to_undistorted: Arc<dyn PixelTransform>,
        to_distorted: Arc<dyn PixelTransform>,
    ) -> Result<(), Error> {
        let bounds = bound_box(width, height, to_undistorted.as_ref());
        if !bounds.fits(width, height, DISTORTION_BOUNDS_TOL) {
            return Err(Error::DistortionBounds {
                x0: bounds.x0,
                y0: bounds.y0,
                x1: bounds.x1,
                y1: bounds.y1,
                width,
                height,
            });
        }
        log::debug!(
            "lens distortion set for {}x{}: undistorted bounds [{:.2}, {:.2}] x [{:.2}, {:.2}]",
            width,
            height,
            bounds.x0,
            bounds.x1,
            bounds.y0,
            bounds.y1
        );
        self.lens = Some(LensSetup {
            width,
            height,
            to_undistorted,
            to_distorted,
        });
        Ok(())
    }

    pub fn clear_lens_distortion(&mut self) {
        self.lens = None;
    }

    /// Polygons found by the last [`process`](Self::process) call.
    pub fn found(&self) -> &[Polygon] {
        &self.found
    }

    /// Raw (distorted) contours of the found polygons, index-aligned with
    /// [`found`](Self::found).
    pub fn found_contours(&self) -> impl ExactSizeIterator<Item = &Contour> + '_ {
        self.found_contours.iter().map(|&i| &self.contours[i])
    }

    /// Every contour traced by the last call.
    pub fn all_contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Blob ids per pixel from the last call.
    pub fn labeled(&self) -> &ImageI32 {
        &self.labeled
    }

    pub fn report(&self) -> &DetectionReport {
        &self.report
    }

    /// Detect polygons. `binary` marks candidate shape pixels with non-zero
    /// values; `gray` is sampled for edge scoring and refinement.
    pub fn process<I>(&mut self, gray: &I, binary: &ImageU8<'_>) -> Result<(), Error>
    where
        I: ImageView + Sync,
        I::Pixel: Into<f32>,
    {
        let (width, height) = (gray.width(), gray.height());
        if (binary.w, binary.h) != (width, height) {
            return Err(Error::ShapeMismatch {
                gray: (width, height),
                binary: (binary.w, binary.h),
            });
        }
        if let Some(lens) = &self.lens {
            if (lens.width, lens.height) != (width, height) {
                return Err(Error::InvalidParams(format!(
                    "lens distortion configured for {}x{} but input is {}x{}",
                    lens.width, lens.height, width, height
                )));
            }
        }

        let total_start = Instant::now();
        self.found.clear();
        self.found_contours.clear();

        let min_contour = width as f64 * self.params.min_contour_fraction;
        let min_contour_pixels = min_contour.floor() as usize;
        let min_area = (min_contour / 4.0).powi(2);
        let minimum_split_pixels = (self.params.minimum_split_fraction * width as f64).max(1.0);
        self.fitter.set_minimum_split_pixels(minimum_split_pixels);

        let mut report = DetectionReport {
            input: InputDescriptor {
                width,
                height,
                min_contour_pixels,
                min_area,
                minimum_split_pixels,
                lens_distortion: self.lens.is_some(),
            },
            ..DetectionReport::default()
        };
        let mut timings = TimingBreakdown::default();

        let stage = Instant::now();
        self.contours = self.tracer.process(binary, &mut self.labeled);
        report.contours_total = self.contours.len();
        timings.push_since("contours", stage);

        let stage = Instant::now();
        let mut fitted = Vec::new();
        let mut fitted_contours = Vec::new();
        for (index, contour) in self.contours.iter().enumerate() {
            if contour.external.len() < min_contour_pixels {
                report.contours_too_small += 1;
                continue;
            }
            let mut entry = CandidateReport::new(contour.id, contour.external.len());
            match fit_candidate(
                &self.params,
                &mut self.fitter,
                &mut self.improver,
                self.lens.as_ref().map(|l| l.to_undistorted.as_ref()),
                &contour.external,
                (width, height),
                min_area,
            ) {
                Ok((points, splits, crude)) => {
                    entry.splits = splits.clone();
                    fitted.push(FittedCandidate {
                        report_index: report.candidates.len(),
                        points,
                        splits,
                        crude,
                    });
                    fitted_contours.push(index);
                }
                Err((splits, reason)) => {
                    log::debug!("contour {} rejected: {}", contour.id, reason);
                    entry.splits = splits;
                    entry.rejected = Some(reason);
                }
            }
            report.candidates.push(entry);
        }
        timings.push_since("fit", stage);

        let stage = Instant::now();
        let to_distorted = self.lens.as_ref().map(|l| l.to_distorted.as_ref());
        let sampler = ImageSampler::with_transform(gray, to_distorted);
        let refined =
            refine_candidates(&mut self.worker, &sampler, &fitted, self.params.parallel)?;
        timings.push_since("refine", stage);

        for ((candidate, &contour_index), result) in
            fitted.iter().zip(&fitted_contours).zip(refined)
        {
            let entry = &mut report.candidates[candidate.report_index];
            entry.edge_score = result.edge_score;
            entry.refined_corners = result.refined_corners;
            if let Some(reason) = result.rejected {
                log::debug!("contour {} rejected: {}", entry.contour_id, reason);
                entry.rejected = Some(reason);
                continue;
            }
            entry.found_index = Some(self.found.len());
            entry.polygon = Some(result.polygon.clone());
            self.found.push(result.polygon);
            self.found_contours.push(contour_index);
        }

        report.found = self.found.len();
        timings.total_ms = elapsed_ms(total_start);
        report.timings = timings;
        log::debug!(
            "polygon detector: {} contours, {} candidates, {} found in {:.2} ms",
            report.contours_total,
            report.candidates.len(),
            report.found,
            report.timings.total_ms
        );
        self.report = report;
        Ok(())
    }
}

type FitResult = Result<(Vec<Point2i>, Vec<usize>, Polygon), (Vec<usize>, RejectReason)>;

/// Geometric checks for one contour, from border touch to area. On rejection
/// the splits found so far are returned with the reason.
fn fit_candidate(
    params: &PolygonDetectorParams,
    fitter: &mut SplitMergeLineFitLoop,
    improver: &mut ImproveContourCorners,
    to_undistorted: Option<&dyn PixelTransform>,
    external: &[Point2i],
    (width, height): (usize, usize),
    min_area: f64,
) -> FitResult {
    if touches_border(external, width, height) {
        return Err((Vec::new(), RejectReason::TouchesBorder));
    }

    let points = match to_undistorted {
        Some(t) => undistort_contour(external, t),
        None => external.to_vec(),
    };

    fitter.process(&points);
    let mut splits = fitter.splits().to_vec();
    if !params.accepts_sides(splits.len()) {
        let found = splits.len();
        return Err((splits, RejectReason::SideCount { found }));
    }

    if !improver.fit(&points, &mut splits) {
        return Err((splits, RejectReason::ImproveCorners));
    }

    let crude = Polygon::from_splits(&points, &splits);
    if !crude.is_convex() {
        return Err((splits, RejectReason::NotConvex));
    }
    let area = crude.area();
    if area < min_area {
        return Err((splits, RejectReason::AreaTooSmall { area }));
    }
    Ok((points, splits, crude))
}

fn touches_border(contour: &[Point2i], width: usize, height: usize) -> bool {
    let (xmax, ymax) = (width as i32 - 1, height as i32 - 1);
    contour
        .iter()
        .any(|p| p.x <= 0 || p.y <= 0 || p.x >= xmax || p.y >= ymax)
}

fn undistort_contour(contour: &[Point2i], to_undistorted: &dyn PixelTransform) -> Vec<Point2i> {
    contour
        .iter()
        .map(|p| {
            let [x, y] = to_undistorted.compute(p.x as f64, p.y as f64);
            Point2i::new(x.round() as i32, y.round() as i32)
        })
        .collect()
}
