//! Raster decoding port.

use crate::domain::RasterImage;

/// Decodes encoded image bytes (JPEG, PNG, ...) into an RGBA raster.
pub trait RasterDecoder: Send + Sync {
    /// Decodes `bytes` into a raster.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a decodable image.
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<RasterImage>;
}
