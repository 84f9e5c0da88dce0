//! Decoding of image XObjects into RGBA pixels.

use anyhow::{anyhow, bail, Context, Result};
use image::{Rgba, RgbaImage};
use lopdf::{Dictionary, Document, Object, Stream};

use super::{resolve, MAX_DIMENSION_PX};

/// Decodes an image XObject stream.
///
/// Supports `DCTDecode` (JPEG) data and 8-bit or 1-bit raw samples in
/// `DeviceGray`, `DeviceRGB`, `DeviceCMYK` or `ICCBased` color spaces,
/// optionally Flate-compressed.
pub fn decode_image_xobject(doc: &Document, stream: &Stream) -> Result<RgbaImage> {
    let filters = filter_names(doc, &stream.dict);

    if filters.last().is_some_and(|f| f == b"DCTDecode") {
        // The DCT stream is a complete JPEG file.
        let data = if filters.len() > 1 {
            stream
                .decompressed_content()
                .context("Failed to decompress JPEG stream")?
        } else {
            stream.content.clone()
        };
        return Ok(image::load_from_memory(&data)
            .context("Failed to decode JPEG XObject")?
            .to_rgba8());
    }

    if let Some(unsupported) = filters
        .iter()
        .find(|f| !matches!(f.as_slice(), b"FlateDecode" | b"Fl"))
    {
        bail!(
            "unsupported image filter /{}",
            String::from_utf8_lossy(unsupported)
        );
    }

    let samples = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .context("Failed to decompress image stream")?
    };

    decode_samples(doc, &stream.dict, &samples)
}

fn decode_samples(doc: &Document, dict: &Dictionary, samples: &[u8]) -> Result<RgbaImage> {
    let width = dimension(dict, b"Width")?;
    let height = dimension(dict, b"Height")?;
    let bpc = dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(8);
    let channels = channel_count(doc, dict);

    let pixel = |offset: usize, data: &[u8]| -> Rgba<u8> {
        match channels {
            1 => Rgba([data[offset], data[offset], data[offset], 255]),
            3 => Rgba([data[offset], data[offset + 1], data[offset + 2], 255]),
            _ => cmyk_to_rgba(&data[offset..offset + 4]),
        }
    };

    match bpc {
        8 => {
            let row_len = width as usize * channels;
            let expected = sample_len(row_len, height)?;
            if samples.len() < expected {
                bail!(
                    "image data holds {} bytes, expected {expected}",
                    samples.len()
                );
            }
            Ok(RgbaImage::from_fn(width, height, |x, y| {
                pixel(y as usize * row_len + x as usize * channels, samples)
            }))
        }
        1 if channels == 1 => {
            // Rows are padded to whole bytes; a set bit is white.
            let row_len = (width as usize).div_ceil(8);
            if samples.len() < sample_len(row_len, height)? {
                bail!("bilevel image data is truncated");
            }
            Ok(RgbaImage::from_fn(width, height, |x, y| {
                let byte = samples[y as usize * row_len + x as usize / 8];
                let value = if byte & (0x80 >> (x % 8)) == 0 { 0 } else { 255 };
                Rgba([value, value, value, 255])
            }))
        }
        other => Err(anyhow!(
            "unsupported sample layout: {other} bits x {channels} channels"
        )),
    }
}

fn sample_len(row_len: usize, height: u32) -> Result<usize> {
    row_len
        .checked_mul(height as usize)
        .ok_or_else(|| anyhow!("image sample size overflows"))
}

fn cmyk_to_rgba(cmyk: &[u8]) -> Rgba<u8> {
    let k = 255 - u16::from(cmyk[3]);
    let channel = |v: u8| ((255 - u16::from(v)) * k / 255) as u8;
    Rgba([channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2]), 255])
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    let value = dict
        .get(key)
        .and_then(Object::as_i64)
        .map_err(|_| anyhow!("image is missing /{}", String::from_utf8_lossy(key)))?;
    u32::try_from(value)
        .ok()
        .filter(|v| (1..=MAX_DIMENSION_PX).contains(v))
        .ok_or_else(|| anyhow!("invalid image /{} {value}", String::from_utf8_lossy(key)))
}

/// Filter names in application order.
fn filter_names(doc: &Document, dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter").map(|f| resolve(doc, f)) {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(names)) => names
            .iter()
            .filter_map(|n| resolve(doc, n).as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Number of color components from the /ColorSpace entry.
fn channel_count(doc: &Document, dict: &Dictionary) -> usize {
    let Ok(space) = dict.get(b"ColorSpace").map(|cs| resolve(doc, cs)) else {
        return 1;
    };

    match space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceRGB" | b"CalRGB" => 3,
            b"DeviceCMYK" => 4,
            _ => 1,
        },
        Object::Array(parts) => match parts.first().and_then(|p| p.as_name().ok()) {
            Some(b"ICCBased") => parts
                .get(1)
                .map(|p| resolve(doc, p))
                .and_then(|p| p.as_stream().ok())
                .and_then(|s| s.dict.get(b"N").and_then(Object::as_i64).ok())
                .and_then(|n| usize::try_from(n).ok())
                .filter(|n| matches!(n, 1 | 3 | 4))
                .unwrap_or(3),
            Some(b"CalRGB") => 3,
            _ => 1,
        },
        _ => 1,
    }
}
