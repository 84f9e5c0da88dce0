//! Quality thresholds applied by the raster analyzer.

use serde::{Deserialize, Serialize};

/// Fixed acceptance limits for document rasters.
///
/// Only the minimum (or, for noise, maximum) values reject a document. The
/// optimal values are carried for consumers that want to grade acceptable
/// documents further.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Minimum image width in pixels.
    pub min_resolution: u32,
    /// Ideal image width in pixels.
    pub optimal_resolution: u32,
    /// Minimum Laplacian sharpness score.
    pub min_sharpness: f64,
    /// Sharpness above which no blur is perceptible.
    pub optimal_sharpness: f64,
    /// Minimum dynamic range ratio (0.0-1.0).
    pub min_contrast: f64,
    /// Ideal dynamic range ratio (0.0-1.0).
    pub optimal_contrast: f64,
    /// Maximum tolerable noise ratio (0.0-1.0).
    pub max_noise: f64,
    /// Noise ratio of a clean capture (0.0-1.0).
    pub optimal_noise: f64,
    /// Minimum file size in kilobytes; smaller files are over-compressed.
    pub min_size_kb: f64,
    /// Ideal file size in kilobytes.
    pub optimal_size_kb: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_resolution: 1000,
            optimal_resolution: 1500,
            min_sharpness: 50.0,
            optimal_sharpness: 150.0,
            min_contrast: 0.45,
            optimal_contrast: 0.70,
            max_noise: 0.50,
            optimal_noise: 0.30,
            min_size_kb: 80.0,
            optimal_size_kb: 200.0,
        }
    }
}
