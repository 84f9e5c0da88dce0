//! Pixel-level quality estimators.
//!
//! All estimators work on the luminance plane of a raster, where luminance is
//! the unweighted mean of the red, green and blue channels.

#![allow(clippy::cast_precision_loss)]

use tracing::debug;

use crate::domain::{RasterImage, BYTES_PER_PIXEL};

/// 3x3 Laplacian kernel, row-major.
pub const LAPLACIAN_KERNEL: [f64; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Unrounded quality metrics of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterMetrics {
    /// Mean squared Laplacian response over the full pixel count.
    pub sharpness: f64,
    /// Luminance dynamic range divided by 255.
    pub contrast: f64,
    /// Population standard deviation of luminance divided by 255.
    pub noise: f64,
}

/// Luminance of a single RGB triple.
#[must_use]
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    f64::from(u16::from(r) + u16::from(g) + u16::from(b)) / 3.0
}

/// Per-pixel luminance values of a raster, row-major.
#[derive(Debug, Clone)]
pub struct LuminancePlane {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl LuminancePlane {
    /// Computes the luminance plane of a raster. Alpha is ignored.
    #[must_use]
    pub fn from_raster(raster: &RasterImage) -> Self {
        let values = raster
            .pixels()
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| luminance(px[0], px[1], px[2]))
            .collect();

        Self {
            width: raster.width() as usize,
            height: raster.height() as usize,
            values,
        }
    }

    /// Laplacian energy: squared kernel responses summed over interior
    /// pixels, divided by the total pixel count (border included).
    ///
    /// Rasters narrower or shorter than 3 pixels have no interior and score 0.
    #[must_use]
    pub fn sharpness(&self) -> f64 {
        let (w, h) = (self.width, self.height);
        let mut energy = 0.0;

        for y in 1..h.saturating_sub(1) {
            for x in 1..w.saturating_sub(1) {
                let mut response = 0.0;
                for ky in 0..3 {
                    let row = (y + ky - 1) * w;
                    for kx in 0..3 {
                        response += self.values[row + x + kx - 1] * LAPLACIAN_KERNEL[ky * 3 + kx];
                    }
                }
                energy += response * response;
            }
        }

        energy / (w * h) as f64
    }

    /// Global dynamic range, `(max - min) / 255`.
    #[must_use]
    pub fn contrast(&self) -> f64 {
        let (min, max) = self
            .values
            .iter()
            .fold((255.0_f64, 0.0_f64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        (max - min) / 255.0
    }

    /// Population standard deviation of luminance, divided by 255.
    ///
    /// Legitimate texture raises this score as much as sensor noise does.
    #[must_use]
    pub fn noise(&self) -> f64 {
        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let variance = self
            .values
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>();
        (variance / n).sqrt() / 255.0
    }
}

/// Computes all pixel-derived metrics of a raster.
#[must_use]
pub fn measure(raster: &RasterImage) -> RasterMetrics {
    let plane = LuminancePlane::from_raster(raster);
    let metrics = RasterMetrics {
        sharpness: plane.sharpness(),
        contrast: plane.contrast(),
        noise: plane.noise(),
    };
    debug!(
        width = raster.width(),
        height = raster.height(),
        sharpness = metrics.sharpness,
        contrast = metrics.contrast,
        noise = metrics.noise,
        "Measured raster"
    );
    metrics
}
