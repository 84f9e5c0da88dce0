//! Integration tests for PDF page rendering and document validation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use doc_qa_adapters::{ImageDecoder, LopdfRenderer};
use doc_qa_core::{
    DocumentMetrics, InputFile, PageRenderer, PageSource, QualityThresholds, RasterImage, Validator,
    VerdictMetrics,
};
use doc_qa_test_support::{SyntheticPdfBuilder, SyntheticRasterBuilder};
use lopdf::{dictionary, Document, Object, Stream};

fn pixel(raster: &RasterImage, x: u32, y: u32) -> [u8; 4] {
    let i = (y * raster.width() + x) as usize * 4;
    raster.pixels()[i..i + 4].try_into().unwrap()
}

fn two_tone() -> RasterImage {
    RasterImage::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap()
}

#[test]
fn test_page_rendered_at_scale() {
    let pdf = SyntheticPdfBuilder::new()
        .scanned_page(100.0, 50.0, two_tone())
        .build();

    let mut doc = LopdfRenderer.open(&pdf).unwrap();
    assert_eq!(doc.page_count(), 1);

    let page = doc.render_page(0, 2.0).unwrap();
    assert_eq!(page.raster.width(), 200);
    assert_eq!(page.raster.height(), 100);
}

#[test]
fn test_scanned_image_fills_page() {
    let pdf = SyntheticPdfBuilder::new()
        .scanned_page(100.0, 50.0, two_tone())
        .build();

    let page = LopdfRenderer.open(&pdf).unwrap().render_page(0, 2.0).unwrap();
    assert_eq!(pixel(&page.raster, 10, 50), [255, 0, 0, 255]);
    assert_eq!(pixel(&page.raster, 190, 50), [0, 0, 255, 255]);
    assert_eq!(pixel(&page.raster, 0, 0), [255, 0, 0, 255]);
    assert_eq!(pixel(&page.raster, 199, 99), [0, 0, 255, 255]);
}

#[test]
fn test_blank_page_is_white_and_sized_as_png() {
    let pdf = SyntheticPdfBuilder::new().blank_page(30.0, 20.0).build();

    let page = LopdfRenderer.open(&pdf).unwrap().render_page(0, 2.0).unwrap();
    assert!(page.raster.pixels().iter().all(|&b| b == 255));
    assert_eq!(
        page.encoded_size,
        SyntheticRasterBuilder::png_bytes(&page.raster).len() as u64
    );
}

#[test]
fn test_pages_keep_document_order() {
    let pdf = SyntheticPdfBuilder::new()
        .blank_page(10.0, 10.0)
        .blank_page(20.0, 10.0)
        .blank_page(30.0, 10.0)
        .build();

    let mut doc = LopdfRenderer.open(&pdf).unwrap();
    let widths: Vec<u32> = (0..doc.page_count())
        .map(|i| doc.render_page(i, 1.0).unwrap().raster.width())
        .collect();
    assert_eq!(widths, [10, 20, 30]);
}

#[test]
fn test_out_of_range_page_fails() {
    let pdf = SyntheticPdfBuilder::new().blank_page(10.0, 10.0).build();
    let mut doc = LopdfRenderer.open(&pdf).unwrap();
    assert!(doc.render_page(1, 2.0).is_err());
}

#[test]
fn test_corrupt_document_fails_to_open() {
    assert!(LopdfRenderer.open(b"%PDF-1.4 truncated").is_err());
    assert!(LopdfRenderer.open(b"").is_err());
}

fn validator() -> Validator {
    Validator::new(
        QualityThresholds::default(),
        Box::new(ImageDecoder),
        Box::new(LopdfRenderer),
    )
}

#[test]
fn test_document_with_one_blurry_page() {
    let pdf = SyntheticPdfBuilder::new()
        .scanned_page(612.0, 792.0, SyntheticRasterBuilder::acceptable_scan())
        .scanned_page(612.0, 792.0, SyntheticRasterBuilder::blurry_raster())
        .scanned_page(612.0, 792.0, SyntheticRasterBuilder::acceptable_scan())
        .build();

    let verdict = validator().validate(&InputFile::with_mime("claim.pdf", "application/pdf", pdf));

    assert!(!verdict.is_acceptable());
    assert_eq!(
        verdict.metrics(),
        Some(&VerdictMetrics::Document(DocumentMetrics {
            total_pages: 3,
            valid_pages: 2,
        }))
    );
    assert_eq!(
        verdict.problems(),
        ["Page 2: Image is blurry (sharpness: 0). Hold the camera still"]
    );
}

#[test]
fn test_small_pages_fail_resolution() {
    // 400pt wide renders to 800px at 2x.
    let pdf = SyntheticPdfBuilder::new().blank_page(400.0, 600.0).build();

    let verdict = validator().validate(&InputFile::with_mime("memo.pdf", "application/pdf", pdf));

    assert_eq!(
        verdict.problems(),
        ["Page 1: Resolution too low (800px). Minimum: 1000px"]
    );
}

#[test]
fn test_document_without_pages_rejected() {
    let pdf = SyntheticPdfBuilder::new().build();
    let verdict = validator().validate(&InputFile::with_mime("empty.pdf", "application/pdf", pdf));
    assert_eq!(verdict.problems(), ["Document has no pages"]);
    assert!(verdict.metrics().is_none());
}

#[test]
fn test_garbage_document_rejected() {
    let verdict = validator().validate(&InputFile::with_mime(
        "claim.pdf",
        "application/pdf",
        b"not a pdf at all".to_vec(),
    ));
    assert_eq!(verdict.problems(), ["Failed to analyze PDF"]);
    assert!(verdict.metrics().is_none());
}

#[test]
fn test_png_scan_accepted() {
    let png = SyntheticRasterBuilder::png_bytes(&SyntheticRasterBuilder::acceptable_scan());
    let verdict = validator().validate(&InputFile::with_mime("scan.png", "image/png", png));
    assert!(verdict.is_acceptable(), "problems: {:?}", verdict.problems());
}

/// One 100x100pt page drawing an image XObject that declares
/// 2^31 x 2^31 CMYK samples but carries 16 bytes.
fn pdf_with_oversized_image() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2_147_483_648_i64,
            "Height" => 2_147_483_648_i64,
            "ColorSpace" => "DeviceCMYK",
            "BitsPerComponent" => 8,
        },
        vec![0; 16],
    ));
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        b"q 100 0 0 100 0 0 cm /Im0 Do Q".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
        "Contents" => content_id,
        "Resources" => dictionary! { "XObject" => dictionary! { "Im0" => image_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_oversized_image_is_skipped_not_drawn() {
    let pdf = pdf_with_oversized_image();

    let page = LopdfRenderer.open(&pdf).unwrap().render_page(0, 2.0).unwrap();
    assert_eq!(page.raster.width(), 200);
    assert!(page.raster.pixels().iter().all(|&b| b == 255));
}

#[test]
fn test_oversized_image_still_yields_verdict() {
    let pdf = pdf_with_oversized_image();

    let verdict = validator().validate(&InputFile::with_mime("huge.pdf", "application/pdf", pdf));

    assert!(!verdict.is_acceptable());
    assert_eq!(
        verdict.metrics(),
        Some(&VerdictMetrics::Document(DocumentMetrics {
            total_pages: 1,
            valid_pages: 0,
        }))
    );
    assert_eq!(
        verdict.problems().first().map(String::as_str),
        Some("Page 1: Resolution too low (200px). Minimum: 1000px")
    );
}
