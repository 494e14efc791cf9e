mod common;

use common::init_logger;
use common::synthetic_image::{invert, render_polygon_u8, render_polygons_u8, threshold_below};
use polygon_detector::contour::{ConnectRule, Contour, ContourTracer, LinearContourLabeler};
use polygon_detector::detector::ParallelRefineOptions;
use polygon_detector::image::{ImageI32, ImageU8};
use polygon_detector::refine::LineRefineParams;
use polygon_detector::{
    Polygon, PolygonDetector, PolygonDetectorParams, RejectReason, Winding,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const W: usize = 300;
const H: usize = 300;

const QUAD: [[f64; 2]; 4] = [
    [60.3, 50.7],
    [220.6, 70.2],
    [200.1, 230.4],
    [50.5, 210.8],
];

fn detect(params: PolygonDetectorParams, gray: &[u8], mask: &[u8]) -> PolygonDetector {
    init_logger();
    let mut detector = PolygonDetector::new(params).expect("valid params");
    detector
        .process(&ImageU8::new(W, H, gray), &ImageU8::new(W, H, mask))
        .expect("process");
    detector
}

/// Largest distance from a truth corner to its nearest polygon vertex.
/// Infinite when the side counts differ or a vertex would be used twice.
fn max_corner_error(poly: &Polygon, truth: &[[f64; 2]]) -> f64 {
    if poly.len() != truth.len() {
        return f64::INFINITY;
    }
    let mut used = vec![false; truth.len()];
    let mut worst = 0.0f64;
    for t in truth {
        let (best, dist) = poly
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (i, (v.x - t[0]).hypot(v.y - t[1])))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .expect("non-empty polygon");
        if used[best] {
            return f64::INFINITY;
        }
        used[best] = true;
        worst = worst.max(dist);
    }
    worst
}

fn quad_scene() -> (Vec<u8>, Vec<u8>) {
    let gray = render_polygon_u8(W, H, &QUAD);
    let mask = threshold_below(&gray, 110);
    (gray, mask)
}

#[test]
fn quad_corners_are_refined_to_subpixel() {
    let (gray, mask) = quad_scene();
    let detector = detect(PolygonDetectorParams::default(), &gray, &mask);

    assert_eq!(detector.found().len(), 1, "{:?}", detector.report());
    let poly = &detector.found()[0];
    let err = max_corner_error(poly, &QUAD);
    assert!(err <= 1.1, "max corner error {err:.3}");
    assert_eq!(poly.winding(), Winding::Clockwise);

    let report = detector.report();
    assert_eq!(report.found, 1);
    let accepted = &report.candidates[0];
    assert!(accepted.is_accepted());
    assert_eq!(accepted.refined_corners, Some(4));
    assert!(accepted.edge_score.unwrap_or(0.0) > 50.0);
    assert_eq!(detector.found_contours().len(), 1);
}

#[test]
fn output_winding_is_configurable() {
    let (gray, mask) = quad_scene();
    let params = PolygonDetectorParams {
        output_winding: Winding::CounterClockwise,
        ..Default::default()
    };
    let detector = detect(params, &gray, &mask);
    assert_eq!(detector.found().len(), 1);
    assert_eq!(detector.found()[0].winding(), Winding::CounterClockwise);
}

#[test]
fn line_refiner_recovers_the_quad() {
    let (gray, mask) = quad_scene();
    let params = PolygonDetectorParams {
        refine_corners: None,
        refine_lines: Some(LineRefineParams::default()),
        check_edge_before: false,
        ..Default::default()
    };
    let detector = detect(params, &gray, &mask);
    assert_eq!(detector.found().len(), 1);
    let err = max_corner_error(&detector.found()[0], &QUAD);
    assert!(err <= 1.1, "max corner error {err:.3}");
}

#[test]
fn without_refinement_the_crude_polygon_is_returned() {
    let (gray, mask) = quad_scene();
    let params = PolygonDetectorParams {
        refine_corners: None,
        refine_lines: None,
        ..Default::default()
    };
    let detector = detect(params, &gray, &mask);
    assert_eq!(detector.found().len(), 1);
    let poly = &detector.found()[0];
    for v in &poly.vertices {
        assert_eq!(v.x.fract(), 0.0);
        assert_eq!(v.y.fract(), 0.0);
    }
    let err = max_corner_error(poly, &QUAD);
    assert!(err <= 2.5, "max corner error {err:.3}");
    assert_eq!(detector.report().candidates[0].refined_corners, None);
}

#[test]
fn border_touching_quad_is_rejected() {
    let corners = [[-5.0, 40.0], [120.0, 40.0], [120.0, 160.0], [-5.0, 160.0]];
    let gray = render_polygon_u8(W, H, &corners);
    let mask = threshold_below(&gray, 110);
    let detector = detect(PolygonDetectorParams::default(), &gray, &mask);
    assert!(detector.found().is_empty());
    assert_eq!(
        detector.report().candidates[0].rejected,
        Some(RejectReason::TouchesBorder)
    );
    let rejections: Vec<_> = detector.report().rejections().collect();
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].0.contour_id, 1);
    assert_eq!(*rejections[0].1, RejectReason::TouchesBorder);
}

#[test]
fn side_count_allow_list() {
    let triangle = [[80.2, 60.5], [230.7, 120.1], [90.4, 240.3]];
    let gray = render_polygon_u8(W, H, &triangle);
    let mask = threshold_below(&gray, 110);

    let detector = detect(PolygonDetectorParams::default(), &gray, &mask);
    assert!(detector.found().is_empty());
    assert_eq!(
        detector.report().candidates[0].rejected,
        Some(RejectReason::SideCount { found: 3 })
    );

    let params = PolygonDetectorParams {
        number_of_sides: vec![3, 4],
        ..Default::default()
    };
    let detector = detect(params, &gray, &mask);
    assert_eq!(detector.found().len(), 1);
    let err = max_corner_error(&detector.found()[0], &triangle);
    assert!(err <= 1.1, "max corner error {err:.3}");
}

#[test]
fn bright_shape_fails_the_edge_score() {
    let (gray, mask) = quad_scene();
    let bright = invert(&gray);
    let detector = detect(PolygonDetectorParams::default(), &bright, &mask);
    assert!(detector.found().is_empty());
    assert!(matches!(
        detector.report().candidates[0].rejected,
        Some(RejectReason::EdgeScoreBefore { score }) if score < 0.0
    ));
}

#[test]
fn several_shapes_are_found_deterministically() {
    let shapes = vec![
        vec![[20.4, 20.2], [110.3, 25.6], [105.8, 120.5], [18.9, 112.1]],
        vec![[160.5, 30.3], [270.2, 40.8], [262.7, 130.1], [155.3, 125.6]],
        vec![[60.2, 170.9], [210.6, 165.4], [220.3, 270.2], [70.8, 275.5]],
    ];
    let gray = render_polygons_u8(W, H, &shapes, |x, y| [x, y]);
    let mask = threshold_below(&gray, 110);

    let sequential = PolygonDetectorParams {
        parallel: ParallelRefineOptions::disabled(),
        ..Default::default()
    };
    let fanned_out = PolygonDetectorParams {
        parallel: ParallelRefineOptions::new(true, 1),
        ..Default::default()
    };
    let a = detect(sequential, &gray, &mask);
    let b = detect(fanned_out, &gray, &mask);

    assert_eq!(a.found().len(), 3);
    assert_eq!(a.found(), b.found());
    assert_eq!(a.all_contours().len(), 3);
    assert_eq!(a.report().rejections().count(), 0);
    for shape in &shapes {
        let best = a
            .found()
            .iter()
            .map(|p| max_corner_error(p, shape))
            .fold(f64::INFINITY, f64::min);
        assert!(best <= 1.1, "max corner error {best:.3}");
    }
}

#[test]
fn detector_is_reusable_across_frames() {
    init_logger();
    let (gray, mask) = quad_scene();
    let empty = vec![0u8; W * H];
    let mut detector = PolygonDetector::new(PolygonDetectorParams::default()).expect("params");

    detector
        .process(&ImageU8::new(W, H, &gray), &ImageU8::new(W, H, &mask))
        .expect("first frame");
    assert_eq!(detector.found().len(), 1);

    detector
        .process(&ImageU8::new(W, H, &gray), &ImageU8::new(W, H, &empty))
        .expect("second frame");
    assert!(detector.found().is_empty());
    assert_eq!(detector.report().contours_total, 0);
    assert!(detector.report().candidates.is_empty());
}

/// Counts how often the detector asks for contours.
struct CountingTracer {
    inner: LinearContourLabeler,
    calls: Arc<AtomicUsize>,
}

impl ContourTracer for CountingTracer {
    fn process(&mut self, binary: &ImageU8<'_>, labeled: &mut ImageI32) -> Vec<Contour> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.process(binary, labeled)
    }
}

#[test]
fn custom_tracer_supplies_the_contours() {
    init_logger();
    let (gray, mask) = quad_scene();
    let calls = Arc::new(AtomicUsize::new(0));
    let tracer = CountingTracer {
        inner: LinearContourLabeler::new(ConnectRule::Eight),
        calls: Arc::clone(&calls),
    };
    let mut detector = PolygonDetector::new(PolygonDetectorParams::default())
        .expect("params")
        .with_tracer(Box::new(tracer));

    detector
        .process(&ImageU8::new(W, H, &gray), &ImageU8::new(W, H, &mask))
        .expect("process");
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    assert_eq!(detector.found().len(), 1);
    assert_eq!(detector.all_contours().len(), 1);
    assert_eq!(detector.found_contours().next(), detector.all_contours().first());
}

/// Reports no blobs at all.
struct BlindTracer;

impl ContourTracer for BlindTracer {
    fn process(&mut self, binary: &ImageU8<'_>, labeled: &mut ImageI32) -> Vec<Contour> {
        labeled.reshape(binary.w, binary.h);
        Vec::new()
    }
}

#[test]
fn tracer_without_contours_finds_nothing() {
    let (gray, mask) = quad_scene();
    let mut detector = PolygonDetector::new(PolygonDetectorParams::default())
        .expect("params")
        .with_tracer(Box::new(BlindTracer));
    detector
        .process(&ImageU8::new(W, H, &gray), &ImageU8::new(W, H, &mask))
        .expect("process");
    assert!(detector.found().is_empty());
    assert!(detector.all_contours().is_empty());
    assert_eq!(detector.report().contours_total, 0);
}
