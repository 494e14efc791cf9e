use crate::detector::PolygonDetectorParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct PolygonDemoConfig {
    #[serde(rename = "input")]
    pub input: PathBuf,
    /// Pixels darker than this become shape candidates.
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default)]
    pub detector: PolygonDetectorParams,
    /// Optional radial lens model of the input image.
    #[serde(default)]
    pub distortion: Option<DistortionConfig>,
    pub output: PolygonOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct DistortionConfig {
    /// Division model coefficient; negative for barrel distortion.
    pub lambda: f64,
    /// Scale the undistorted frame so it stays inside the input bounds.
    #[serde(default = "default_full_view")]
    pub full_view: bool,
}

#[derive(Debug, Deserialize)]
pub struct PolygonOutputConfig {
    #[serde(rename = "report_json")]
    pub report_json: PathBuf,
    /// Where to save the thresholded mask, if anywhere.
    #[serde(default)]
    pub binary_png: Option<PathBuf>,
}

fn default_threshold() -> u8 {
    100
}

fn default_full_view() -> bool {
    true
}

pub fn load_config(path: &Path) -> Result<PolygonDemoConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
