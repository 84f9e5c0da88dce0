//! Synthetic PDF builder for testing.

use doc_qa_core::RasterImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// One page of a synthetic PDF.
struct PageSpec {
    width: f32,
    height: f32,
    scan: Option<RasterImage>,
}

/// Builds PDFs whose pages are full-page scanned images, the way a
/// document scanner produces them.
///
/// # Example
///
/// ```
/// use doc_qa_test_support::{SyntheticPdfBuilder, SyntheticRasterBuilder};
///
/// let pdf = SyntheticPdfBuilder::new()
///     .scanned_page(612.0, 792.0, SyntheticRasterBuilder::blurry_raster())
///     .blank_page(612.0, 792.0)
///     .build();
/// assert!(pdf.starts_with(b"%PDF"));
/// ```
#[derive(Default)]
pub struct SyntheticPdfBuilder {
    pages: Vec<PageSpec>,
}

impl SyntheticPdfBuilder {
    /// Creates a builder with no pages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page of `width` x `height` points covered by `scan`.
    #[must_use]
    pub fn scanned_page(mut self, width: f32, height: f32, scan: RasterImage) -> Self {
        self.pages.push(PageSpec {
            width,
            height,
            scan: Some(scan),
        });
        self
    }

    /// Adds an empty white page.
    #[must_use]
    pub fn blank_page(mut self, width: f32, height: f32) -> Self {
        self.pages.push(PageSpec {
            width,
            height,
            scan: None,
        });
        self
    }

    /// Serializes the document.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = self
            .pages
            .into_iter()
            .map(|spec| Object::Reference(add_page(&mut doc, pages_id, spec)))
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .unwrap_or_else(|e| panic!("failed to serialize synthetic PDF: {e}"));
        bytes
    }
}

fn add_page(doc: &mut Document, parent: ObjectId, spec: PageSpec) -> ObjectId {
    let mut operations = Vec::new();
    let mut resources = dictionary! {};

    if let Some(scan) = spec.scan {
        let (width, height) = (i64::from(scan.width()), i64::from(scan.height()));
        let rgb: Vec<u8> = scan
            .pixels()
            .chunks_exact(4)
            .flat_map(|p| [p[0], p[1], p[2]])
            .collect();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            rgb,
        ));
        resources.set("XObject", dictionary! { "Im0" => image_id });

        operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    spec.width.into(),
                    0.into(),
                    0.into(),
                    spec.height.into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ];
    }

    let content = Content { operations }
        .encode()
        .unwrap_or_else(|e| panic!("failed to encode page content: {e}"));
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "MediaBox" => vec![0.into(), 0.into(), spec.width.into(), spec.height.into()],
        "Resources" => resources,
        "Contents" => content_id,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SyntheticRasterBuilder;

    #[test]
    fn test_page_count() {
        let pdf = SyntheticPdfBuilder::new()
            .blank_page(100.0, 100.0)
            .scanned_page(100.0, 100.0, SyntheticRasterBuilder::sharp_raster())
            .build();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_empty_document_has_no_pages() {
        let doc = Document::load_mem(&SyntheticPdfBuilder::new().build()).unwrap();
        assert!(doc.get_pages().is_empty());
    }
}
