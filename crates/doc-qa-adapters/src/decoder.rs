//! Raster decoding via the `image` crate.

use anyhow::{Context, Result};
use doc_qa_core::{RasterDecoder, RasterImage};

/// Decodes any format supported by `image` into an RGBA raster.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl RasterDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage> {
        let image = image::load_from_memory(bytes).context("Failed to decode image")?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(RasterImage::new(width, height, rgba.into_raw())?)
    }
}
