//! Synthetic raster builders for testing.

#![allow(clippy::cast_possible_truncation)]

use std::io::Cursor;

use doc_qa_core::RasterImage;
use image::{DynamicImage, ImageFormat, RgbaImage};

/// Builder for creating synthetic test rasters.
///
/// Provides convenience methods for generating rasters with specific
/// characteristics (sharp, blurry, flat, grainy, ...).
pub struct SyntheticRasterBuilder;

impl SyntheticRasterBuilder {
    /// Builds a gray raster from a per-pixel luma function.
    #[must_use]
    pub fn from_luma(width: u32, height: u32, luma: impl Fn(u32, u32) -> u8) -> RasterImage {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            let v = luma(x, y);
            image::Rgba([v, v, v, 255])
        });
        raster(image)
    }

    // === Sharp/High-Contrast Rasters ===

    /// Creates a high-contrast checkerboard pattern (very sharp edges).
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> RasterImage {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Creates a checkerboard with custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> RasterImage {
        Self::from_luma(width, height, |x, y| {
            if (x / cell_size + y / cell_size) % 2 == 0 {
                255
            } else {
                0
            }
        })
    }

    /// Creates vertical bars pattern (sharp edges).
    #[must_use]
    pub fn vertical_bars(width: u32, height: u32, bar_width: u32) -> RasterImage {
        Self::from_luma(
            width,
            height,
            |x, _| if (x / bar_width) % 2 == 0 { 255 } else { 0 },
        )
    }

    /// Creates a white page with dark text-like strokes and faint paper
    /// grain.
    ///
    /// At 1100px or wider this clears every default threshold, including
    /// the encoded-size check: the grain keeps PNG output large.
    #[must_use]
    pub fn document_scan(width: u32, height: u32) -> RasterImage {
        let mut grain = Grain::new(0x5EED);
        let pixels: Vec<u8> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                let ink = (y % 24) < 3 && (x % 40) < 30;
                let base: u8 = if ink { 20 } else { 240 };
                let v = base.saturating_add(grain.next_byte() % 16);
                [v, v, v, 255]
            })
            .collect();
        RasterImage::new(width, height, pixels)
            .unwrap_or_else(|e| panic!("invalid synthetic raster: {e}"))
    }

    // === Blurry/Flat Rasters ===

    /// Creates a uniform gray raster (no edges, simulates severe blur).
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> RasterImage {
        Self::rgb_uniform(width, height, value, value, value)
    }

    /// Creates a smooth horizontal gradient (low Laplacian response).
    #[must_use]
    pub fn horizontal_gradient(width: u32, height: u32) -> RasterImage {
        Self::from_luma(width, height, |x, _| {
            ((u32::from(u8::MAX) * x) / width.max(1)) as u8
        })
    }

    /// Creates a uniform RGB raster.
    #[must_use]
    pub fn rgb_uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> RasterImage {
        RasterImage::filled(width, height, [r, g, b, 255])
            .unwrap_or_else(|e| panic!("invalid synthetic raster: {e}"))
    }

    // === Encoding ===

    /// Converts a raster into an `image` buffer.
    #[must_use]
    pub fn to_image(raster: &RasterImage) -> RgbaImage {
        RgbaImage::from_raw(raster.width(), raster.height(), raster.pixels().to_vec())
            .unwrap_or_else(|| panic!("raster buffer does not match its dimensions"))
    }

    /// Encodes a raster as PNG.
    #[must_use]
    pub fn png_bytes(raster: &RasterImage) -> Vec<u8> {
        encode(DynamicImage::ImageRgba8(Self::to_image(raster)), ImageFormat::Png)
    }

    /// Encodes a raster as JPEG (alpha dropped).
    #[must_use]
    pub fn jpeg_bytes(raster: &RasterImage) -> Vec<u8> {
        let rgb = DynamicImage::ImageRgba8(Self::to_image(raster)).to_rgb8();
        encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Jpeg)
    }
}

/// Convenience rasters for quick use in tests.
impl SyntheticRasterBuilder {
    /// Returns a standard sharp test raster (128x128 checkerboard).
    #[must_use]
    pub fn sharp_raster() -> RasterImage {
        Self::checkerboard(128, 128)
    }

    /// Returns a standard blurry test raster (128x128 uniform gray).
    #[must_use]
    pub fn blurry_raster() -> RasterImage {
        Self::uniform_gray(128, 128, 128)
    }

    /// Returns a raster that passes all default thresholds, sized like a
    /// US Letter page rendered at 2x.
    #[must_use]
    pub fn acceptable_scan() -> RasterImage {
        Self::document_scan(1224, 1584)
    }
}

fn raster(image: RgbaImage) -> RasterImage {
    let (width, height) = image.dimensions();
    RasterImage::new(width, height, image.into_raw())
        .unwrap_or_else(|e| panic!("invalid synthetic raster: {e}"))
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, format)
        .unwrap_or_else(|e| panic!("failed to encode synthetic image: {e}"));
    buf.into_inner()
}

/// Deterministic xorshift generator for paper grain.
struct Grain(u32);

impl Grain {
    const fn new(seed: u32) -> Self {
        Self(seed)
    }

    fn next_byte(&mut self) -> u8 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        (x >> 24) as u8
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn luma_at(raster: &RasterImage, x: u32, y: u32) -> u8 {
        raster.pixels()[(y * raster.width() + x) as usize * 4]
    }

    #[test]
    fn test_checkerboard_pattern() {
        let raster = SyntheticRasterBuilder::checkerboard_with_cell_size(16, 16, 8);
        assert_eq!(raster.width(), 16);
        assert_eq!(luma_at(&raster, 0, 0), 255);
        assert_eq!(luma_at(&raster, 8, 0), 0);
    }

    #[test]
    fn test_uniform_gray() {
        let raster = SyntheticRasterBuilder::uniform_gray(50, 50, 100);
        assert!(raster.pixels().chunks_exact(4).all(|p| p == [100, 100, 100, 255]));
    }

    #[test]
    fn test_gradient_range() {
        let raster = SyntheticRasterBuilder::horizontal_gradient(256, 10);
        assert!(luma_at(&raster, 0, 0) < 5);
        assert!(luma_at(&raster, 255, 0) > 250);
    }

    #[test]
    fn test_document_scan_is_deterministic() {
        let a = SyntheticRasterBuilder::document_scan(64, 64);
        let b = SyntheticRasterBuilder::document_scan(64, 64);
        assert_eq!(a, b);
        // Ink row, then paper.
        assert!(luma_at(&a, 0, 0) < 40);
        assert!(luma_at(&a, 0, 10) >= 240);
    }

    #[test]
    fn test_png_bytes_decode_back() {
        let raster = SyntheticRasterBuilder::vertical_bars(20, 10, 2);
        let decoded = image::load_from_memory(&SyntheticRasterBuilder::png_bytes(&raster)).unwrap();
        assert_eq!(decoded.to_rgba8().into_raw(), raster.pixels());
    }

    #[test]
    fn test_jpeg_bytes_have_jpeg_magic() {
        let bytes = SyntheticRasterBuilder::jpeg_bytes(&SyntheticRasterBuilder::sharp_raster());
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
