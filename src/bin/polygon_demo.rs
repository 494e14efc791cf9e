//! Detect dark convex polygons in an image and write a JSON report.
//!
//! Steps:
//! 1. Load the input as 8-bit gray.
//! 2. Threshold it into a 0/1 mask (pixels darker than `threshold`).
//! 3. Optionally install a division-model lens correction.
//! 4. Run the polygon detector and dump the polygons plus the per-candidate
//!    report.

use polygon_detector::config::polygon_demo::{self as demo_cfg, PolygonDemoConfig};
use polygon_detector::diagnostics::{elapsed_ms, DetectionReport, TimingBreakdown};
use polygon_detector::distort::{DivisionModel, LensDistortion};
use polygon_detector::image::io::{
    load_grayscale_image, save_binary_mask, threshold_below, write_json_file,
};
use polygon_detector::{Polygon, PolygonDetector};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DemoOutput<'a> {
    input: PathBuf,
    threshold: u8,
    polygons: &'a [Polygon],
    report: &'a DetectionReport,
    timings: TimingBreakdown,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config = load_config_from_args()?;
    let total_start = Instant::now();

    let stage = Instant::now();
    let gray = load_grayscale_image(&config.input)?;
    let load_ms = elapsed_ms(stage);

    let stage = Instant::now();
    let mask = threshold_below(&gray.as_view(), config.threshold);
    let threshold_ms = elapsed_ms(stage);
    if let Some(path) = &config.output.binary_png {
        save_binary_mask(&mask, path)?;
    }

    let mut detector = build_detector(&config, gray.width(), gray.height())?;
    let stage = Instant::now();
    detector
        .process(&gray.as_view(), &mask.as_view())
        .map_err(|e| e.to_string())?;
    let detect_ms = elapsed_ms(stage);

    let mut timings = TimingBreakdown::with_total(elapsed_ms(total_start));
    timings.push("load", load_ms);
    timings.push("threshold", threshold_ms);
    timings.push("detect", detect_ms);

    let output = DemoOutput {
        input: config.input.clone(),
        threshold: config.threshold,
        polygons: detector.found(),
        report: detector.report(),
        timings,
    };
    write_json_file(&config.output.report_json, &output)?;

    println!(
        "Found {} polygon(s) from {} contour(s); report written to {}",
        detector.found().len(),
        detector.report().contours_total,
        config.output.report_json.display()
    );
    for (candidate, reason) in detector.report().rejections() {
        println!("  contour {} ({} px): {}", candidate.contour_id, candidate.contour_len, reason);
    }
    Ok(())
}

fn build_detector(
    config: &PolygonDemoConfig,
    width: usize,
    height: usize,
) -> Result<PolygonDetector, String> {
    let mut detector = PolygonDetector::new(config.detector.clone()).map_err(|e| e.to_string())?;
    if let Some(distortion) = &config.distortion {
        let model = DivisionModel::centered(distortion.lambda, width, height);
        let lens = if distortion.full_view {
            LensDistortion::full_view(model, width, height)
        } else {
            LensDistortion::division(model)
        };
        detector
            .set_lens_distortion(width, height, lens.to_undistorted(), lens.to_distorted())
            .map_err(|e| e.to_string())?;
    }
    Ok(detector)
}

fn usage() -> String {
    "Usage: polygon_demo <config.json>".to_string()
}

fn load_config_from_args() -> Result<PolygonDemoConfig, String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    demo_cfg::load_config(Path::new(&config_path))
}
