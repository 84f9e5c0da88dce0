//! Raster analyzer: metrics plus threshold checks.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use tracing::{debug, warn};

use super::metrics::{measure, RasterMetrics};
use crate::domain::{
    ImageMetrics, QualityThresholds, QualityVerdict, RasterImage, VerdictMetrics,
};

/// Problem reported when an image file cannot be decoded.
pub const IMAGE_LOAD_FAILED: &str = "Failed to load image";

/// Problem reported when a pixel buffer cannot be analyzed.
pub const IMAGE_ANALYSIS_FAILED: &str = "Failed to analyze image";

/// Bytes per kilobyte for the file-size check.
const BYTES_PER_KB: f64 = 1024.0;

/// Grades a single raster against fixed thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterAnalyzer {
    thresholds: QualityThresholds,
}

impl RasterAnalyzer {
    /// Creates an analyzer using the given thresholds.
    #[must_use]
    pub const fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds applied by this analyzer.
    #[must_use]
    pub const fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// Analyzes a decoded raster whose source file was `file_size` bytes.
    ///
    /// Checks run in the order resolution, sharpness, contrast, noise, size;
    /// each failing check appends one problem.
    #[must_use]
    pub fn analyze(&self, raster: &RasterImage, file_size: u64) -> QualityVerdict {
        let metrics = measure(raster);
        let size_kb = file_size as f64 / BYTES_PER_KB;
        let problems = self.check(raster.width(), &metrics, size_kb);

        debug!(
            width = raster.width(),
            sharpness = metrics.sharpness,
            contrast = metrics.contrast,
            noise = metrics.noise,
            size_kb,
            problems = problems.len(),
            "Analyzed raster"
        );

        QualityVerdict::from_problems(
            VerdictMetrics::Image(ImageMetrics {
                resolution: raster.width(),
                sharpness: metrics.sharpness.round() as u64,
                contrast: round_hundredths(metrics.contrast),
                noise: round_hundredths(metrics.noise),
                file_size_kb: size_kb.round() as u64,
            }),
            problems,
        )
    }

    /// Analyzes a raw RGBA buffer.
    ///
    /// Zero dimensions or a buffer of the wrong length yield a rejected
    /// verdict without metrics instead of an error.
    #[must_use]
    pub fn analyze_pixels(
        &self,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        file_size: u64,
    ) -> QualityVerdict {
        match RasterImage::new(width, height, pixels) {
            Ok(raster) => self.analyze(&raster, file_size),
            Err(e) => {
                warn!("Rejecting invalid pixel buffer: {e}");
                QualityVerdict::failure(IMAGE_ANALYSIS_FAILED)
            }
        }
    }

    fn check(&self, width: u32, metrics: &RasterMetrics, size_kb: f64) -> Vec<String> {
        let t = &self.thresholds;
        let mut problems = Vec::new();

        if width < t.min_resolution {
            problems.push(format!(
                "Resolution too low ({width}px). Minimum: {}px",
                t.min_resolution
            ));
        }

        if metrics.sharpness < t.min_sharpness {
            problems.push(format!(
                "Image is blurry (sharpness: {}). Hold the camera still",
                metrics.sharpness.round() as u64
            ));
        }

        if metrics.contrast < t.min_contrast {
            problems.push("Contrast too low. Use better lighting".to_string());
        }

        if metrics.noise > t.max_noise {
            problems.push("Image has too much noise or pixelation".to_string());
        }

        if size_kb < t.min_size_kb {
            problems.push(format!(
                "File is over-compressed ({}KB)",
                size_kb.round() as u64
            ));
        }

        problems
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
