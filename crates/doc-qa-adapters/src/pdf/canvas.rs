//! Drawing surface and affine transforms for page rendering.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use image::{Rgba, RgbaImage};

/// PDF affine matrix `[a b c d e f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Returns `self × other`: apply `self` first, then `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    #[must_use]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Inverse transform, or `None` for a degenerate matrix.
    #[must_use]
    pub fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det.abs() < f32::EPSILON {
            return None;
        }
        Some(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

/// White RGBA page surface with device-space pixel operations.
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Fills the user-space rectangle `(x, y, w, h)` mapped through `ctm`.
    pub fn fill_rect(&mut self, ctm: &Matrix, rect: [f32; 4], color: Rgba<u8>) {
        let [x, y, w, h] = rect;
        let (x0, x1) = (x.min(x + w), x.max(x + w));
        let (y0, y1) = (y.min(y + h), y.max(y + h));
        let corners = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)];

        self.paint_region(ctm, corners, |ux, uy| {
            (ux >= x0 && ux < x1 && uy >= y0 && uy < y1).then_some(color)
        });
    }

    /// Draws `image` into the unit square mapped through `ctm`, sampling
    /// the nearest source pixel. Image row 0 lands at user-space `y = 1`.
    pub fn draw_image(&mut self, ctm: &Matrix, image: &RgbaImage) {
        let (iw, ih) = (image.width(), image.height());
        if iw == 0 || ih == 0 {
            return;
        }
        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];

        self.paint_region(ctm, corners, |u, v| {
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                return None;
            }
            let col = ((u * iw as f32) as u32).min(iw - 1);
            let row = (((1.0 - v) * ih as f32) as u32).min(ih - 1);
            Some(*image.get_pixel(col, row))
        });
    }

    /// Visits every device pixel in the bounding box of the transformed
    /// `corners` and writes `shade(user_x, user_y)` where it returns a color.
    fn paint_region(
        &mut self,
        ctm: &Matrix,
        corners: [(f32, f32); 4],
        shade: impl Fn(f32, f32) -> Option<Rgba<u8>>,
    ) {
        let Some(inverse) = ctm.invert() else {
            return;
        };

        let mapped = corners.map(|(x, y)| ctm.apply(x, y));
        let min_x = mapped.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let max_x = mapped.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = mapped.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = mapped.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

        let (width, height) = (self.width() as f32, self.height() as f32);
        let px0 = min_x.floor().clamp(0.0, width) as u32;
        let px1 = max_x.ceil().clamp(0.0, width) as u32;
        let py0 = min_y.floor().clamp(0.0, height) as u32;
        let py1 = max_y.ceil().clamp(0.0, height) as u32;

        for py in py0..py1 {
            for px in px0..px1 {
                let (ux, uy) = inverse.apply(px as f32 + 0.5, py as f32 + 0.5);
                if let Some(color) = shade(ux, uy) {
                    let dst = self.pixels.get_pixel_mut(px, py);
                    *dst = blend(color, *dst);
                }
            }
        }
    }
}

/// Composites `src` over an opaque `dst`.
fn blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let alpha = u16::from(src[3]);
    if alpha == 255 {
        return Rgba([src[0], src[1], src[2], 255]);
    }
    let mix = |s: u8, d: u8| {
        let value = (u16::from(s) * alpha + u16::from(d) * (255 - alpha) + 127) / 255;
        value as u8
    };
    Rgba([mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    /// Page space of a 100x50 pt page rendered at 2x.
    fn device(height: f32, scale: f32) -> Matrix {
        Matrix::new(scale, 0.0, 0.0, -scale, 0.0, height * scale)
    }

    #[test]
    fn test_then_applies_left_first() {
        let translate = Matrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 0.0);
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        assert_eq!(translate.then(&scale).apply(1.0, 1.0), (22.0, 2.0));
        assert_eq!(scale.then(&translate).apply(1.0, 1.0), (12.0, 2.0));
    }

    #[test]
    fn test_invert_round_trips_point() {
        let m = Matrix::new(2.0, 0.0, 0.0, -2.0, 5.0, 100.0);
        let inv = m.invert().unwrap_or(Matrix::IDENTITY);
        let (x, y) = m.apply(3.0, 4.0);
        assert_eq!(inv.apply(x, y), (3.0, 4.0));
    }

    #[test]
    fn test_degenerate_matrix_has_no_inverse() {
        assert!(Matrix::new(0.0, 0.0, 0.0, 0.0, 1.0, 1.0).invert().is_none());
    }

    #[test]
    fn test_fill_rect_flips_y_axis() {
        let mut canvas = Canvas::new(200, 100);
        // Bottom-left quarter of the page in PDF space.
        canvas.fill_rect(&device(50.0, 2.0), [0.0, 0.0, 50.0, 25.0], RED);
        let image = canvas.into_image();

        assert_eq!(*image.get_pixel(0, 99), RED);
        assert_eq!(*image.get_pixel(99, 50), RED);
        assert_eq!(*image.get_pixel(100, 99), WHITE);
        assert_eq!(*image.get_pixel(0, 49), WHITE);
    }

    #[test]
    fn test_draw_image_maps_top_row_to_top() {
        let source = RgbaImage::from_fn(1, 2, |_, y| if y == 0 { RED } else { Rgba([0, 0, 255, 255]) });
        let mut canvas = Canvas::new(200, 100);
        let place = Matrix::new(100.0, 0.0, 0.0, 50.0, 0.0, 0.0).then(&device(50.0, 2.0));
        canvas.draw_image(&place, &source);
        let image = canvas.into_image();

        assert_eq!(*image.get_pixel(10, 10), RED);
        assert_eq!(*image.get_pixel(10, 90), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_translucent_fill_blends_with_white() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(&Matrix::IDENTITY, [0.0, 0.0, 4.0, 4.0], Rgba([0, 0, 0, 128]));
        assert_eq!(*canvas.into_image().get_pixel(0, 0), Rgba([127, 127, 127, 255]));
    }
}
