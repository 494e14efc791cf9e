mod common;

use common::init_logger;
use common::synthetic_image::{render_polygons_u8, threshold_below};
use polygon_detector::distort::{DivisionModel, LensDistortion, PixelTransform};
use polygon_detector::image::ImageU8;
use polygon_detector::{Error, PolygonDetector, PolygonDetectorParams};
use std::sync::Arc;

const W: usize = 320;
const H: usize = 240;

/// Quad in the undistorted full-view frame.
const QUAD: [[f64; 2]; 4] = [
    [70.4, 40.6],
    [250.2, 55.3],
    [240.7, 200.1],
    [60.9, 185.8],
];

fn max_corner_error(found: &[nalgebra::Point2<f64>], truth: &[[f64; 2]]) -> f64 {
    truth
        .iter()
        .map(|t| {
            found
                .iter()
                .map(|v| (v.x - t[0]).hypot(v.y - t[1]))
                .fold(f64::INFINITY, f64::min)
        })
        .fold(0.0, f64::max)
}

#[test]
fn undistorted_corners_are_recovered() {
    init_logger();
    for lambda in [-2e-6, 2e-6] {
        let lens = LensDistortion::full_view(DivisionModel::centered(lambda, W, H), W, H);
        let to_undistorted = lens.to_undistorted();
        let gray = render_polygons_u8(W, H, &[QUAD.to_vec()], |x, y| {
            to_undistorted.compute(x, y)
        });
        let mask = threshold_below(&gray, 110);

        let mut detector =
            PolygonDetector::new(PolygonDetectorParams::default()).expect("params");
        detector
            .set_lens_distortion(W, H, lens.to_undistorted(), lens.to_distorted())
            .expect("full view fits");
        detector
            .process(&ImageU8::new(W, H, &gray), &ImageU8::new(W, H, &mask))
            .expect("process");

        assert_eq!(detector.found().len(), 1, "lambda {lambda}");
        assert!(detector.report().input.lens_distortion);
        let found = &detector.found()[0].vertices;
        let err = max_corner_error(found, &QUAD);
        assert!(err <= 1.5, "lambda {lambda}: max corner error {err:.3}");

        // the same corners seen in the distorted input image
        let to_distorted = lens.to_distorted();
        let found_distorted: Vec<_> = found
            .iter()
            .map(|v| {
                let [x, y] = to_distorted.compute(v.x, v.y);
                nalgebra::Point2::new(x, y)
            })
            .collect();
        let rendered: Vec<[f64; 2]> = QUAD.iter().map(|c| to_distorted.compute(c[0], c[1])).collect();
        let err = max_corner_error(&found_distorted, &rendered);
        assert!(err <= 1.5, "lambda {lambda}: max distorted corner error {err:.3}");
    }
}

#[test]
fn detector_without_lens_reports_the_blob() {
    init_logger();
    let lens = LensDistortion::full_view(DivisionModel::centered(-2e-6, W, H), W, H);
    let to_undistorted = lens.to_undistorted();
    let gray = render_polygons_u8(W, H, &[QUAD.to_vec()], |x, y| to_undistorted.compute(x, y));
    let mask = threshold_below(&gray, 110);

    // without the lens model the detector still sees a quadrilateral blob
    let mut plain = PolygonDetector::new(PolygonDetectorParams::default()).expect("params");
    plain
        .process(&ImageU8::new(W, H, &gray), &ImageU8::new(W, H, &mask))
        .expect("process");
    assert_eq!(plain.report().candidates.len(), 1);
    assert!(!plain.report().input.lens_distortion);
}

struct Shift(f64);

impl PixelTransform for Shift {
    fn compute(&self, x: f64, y: f64) -> [f64; 2] {
        [x + self.0, y]
    }
}

#[test]
fn transforms_leaving_the_image_are_refused() {
    let mut detector = PolygonDetector::new(PolygonDetectorParams::default()).expect("params");
    let err = detector
        .set_lens_distortion(W, H, Arc::new(Shift(10.0)), Arc::new(Shift(-10.0)))
        .unwrap_err();
    match err {
        Error::DistortionBounds { x1, width, .. } => {
            assert!(x1 > W as f64);
            assert_eq!(width, W);
        }
        other => panic!("unexpected error {other:?}"),
    }

    // one pixel to the right puts the last column at x = W
    assert!(matches!(
        detector.set_lens_distortion(W, H, Arc::new(Shift(1.0)), Arc::new(Shift(-1.0))),
        Err(Error::DistortionBounds { .. })
    ));

    detector
        .set_lens_distortion(W, H, Arc::new(Shift(0.0)), Arc::new(Shift(0.0)))
        .expect("identity fits");
}

#[test]
fn cleared_lens_accepts_other_image_sizes() {
    init_logger();
    let lens = LensDistortion::full_view(DivisionModel::centered(-2e-6, W, H), W, H);
    let mut detector = PolygonDetector::new(PolygonDetectorParams::default()).expect("params");
    detector
        .set_lens_distortion(W, H, lens.to_undistorted(), lens.to_distorted())
        .expect("full view fits");

    let (w, h) = (200, 150);
    let gray = vec![200u8; w * h];
    let mask = vec![0u8; w * h];
    assert!(matches!(
        detector.process(&ImageU8::new(w, h, &gray), &ImageU8::new(w, h, &mask)),
        Err(Error::InvalidParams(_))
    ));

    detector.clear_lens_distortion();
    detector
        .process(&ImageU8::new(w, h, &gray), &ImageU8::new(w, h, &mask))
        .expect("no lens after clearing");
    assert!(!detector.report().input.lens_distortion);
}
