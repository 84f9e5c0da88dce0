//! PDF page rendering using lopdf.
//!
//! Scanned documents carry their content as image XObjects, so the renderer
//! composites those images (plus filled rectangles) onto a white page sized
//! from the page's crop or media box. Text and general vector paths are not
//! rasterized.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

mod canvas;
mod images;

use std::io::Cursor;

use anyhow::{anyhow, bail, Context, Result};
use doc_qa_core::{PageRenderer, PageSource, RasterImage, RenderedPage};
use image::{ImageFormat, Rgba};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use canvas::{Canvas, Matrix};

/// Largest page surface, in pixels per side.
pub const MAX_DIMENSION_PX: u32 = 10_000;

/// US Letter, used when a page has no media box.
const DEFAULT_PAGE_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Form XObjects nested deeper than this are skipped.
const MAX_FORM_DEPTH: usize = 8;

/// Renders PDF pages with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfRenderer;

impl PageRenderer for LopdfRenderer {
    fn open<'a>(&self, bytes: &'a [u8]) -> Result<Box<dyn PageSource + 'a>> {
        let doc = Document::load_mem(bytes).context("Failed to parse PDF")?;
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        debug!(pages = pages.len(), "Opened PDF");
        Ok(Box::new(LopdfDocument { doc, pages }))
    }
}

/// A parsed PDF, rendered one page at a time.
pub struct LopdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PageSource for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&mut self, index: usize, scale: f32) -> Result<RenderedPage> {
        let &page_id = self.pages.get(index).ok_or_else(|| {
            anyhow!(
                "Page {} not found (PDF has {} pages)",
                index + 1,
                self.pages.len()
            )
        })?;

        let [x0, y0, x1, y1] = page_box(&self.doc, page_id);
        let width = ((x1 - x0) * scale) as u32;
        let height = ((y1 - y0) * scale) as u32;
        if width == 0 || height == 0 || width > MAX_DIMENSION_PX || height > MAX_DIMENSION_PX {
            bail!("Page {} renders to unusable size {width}x{height}", index + 1);
        }

        let mut canvas = Canvas::new(width, height);
        let device = Matrix::new(scale, 0.0, 0.0, -scale, -x0 * scale, y1 * scale);
        let resources = inherited(&self.doc, page_id, b"Resources")
            .and_then(|r| resolve(&self.doc, r).as_dict().ok());
        let content = self
            .doc
            .get_and_decode_page_content(page_id)
            .with_context(|| format!("Failed to decode content of page {}", index + 1))?;

        Painter {
            doc: &self.doc,
            canvas: &mut canvas,
        }
        .run(&content.operations, resources, device, 0);

        let image = canvas.into_image();
        let mut encoded = Cursor::new(Vec::new());
        image
            .write_to(&mut encoded, ImageFormat::Png)
            .context("Failed to encode rendered page")?;
        let encoded_size = encoded.get_ref().len() as u64;

        debug!(
            page = index + 1,
            width, height, encoded_size, "Rendered page"
        );

        Ok(RenderedPage {
            raster: RasterImage::new(width, height, image.into_raw())?,
            encoded_size,
        })
    }
}

/// Graphics state tracked while interpreting a content stream.
#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    fill: Rgba<u8>,
}

/// Interprets content-stream operators onto a canvas.
struct Painter<'a> {
    doc: &'a Document,
    canvas: &'a mut Canvas,
}

impl Painter<'_> {
    fn run(
        &mut self,
        operations: &[Operation],
        resources: Option<&Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) {
        let mut state = GraphicsState {
            ctm,
            fill: Rgba([0, 0, 0, 255]),
        };
        let mut stack = Vec::new();
        let mut path: Vec<(Matrix, [f32; 4])> = Vec::new();

        for op in operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "q" => stack.push(state),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some([a, b, c, d, e, f]) = numbers::<6>(operands) {
                        state.ctm = Matrix::new(a, b, c, d, e, f).then(&state.ctm);
                    }
                }
                "g" => {
                    if let Some([gray]) = numbers::<1>(operands) {
                        let v = unit_to_byte(gray);
                        state.fill = Rgba([v, v, v, 255]);
                    }
                }
                "rg" => {
                    if let Some([r, g, b]) = numbers::<3>(operands) {
                        state.fill =
                            Rgba([unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), 255]);
                    }
                }
                "k" => {
                    if let Some([c, m, y, k]) = numbers::<4>(operands) {
                        let channel = |v: f32| unit_to_byte((1.0 - v) * (1.0 - k));
                        state.fill = Rgba([channel(c), channel(m), channel(y), 255]);
                    }
                }
                "re" => {
                    if let Some(rect) = numbers::<4>(operands) {
                        path.push((state.ctm, rect));
                    }
                }
                "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    for (ctm, rect) in path.drain(..) {
                        self.canvas.fill_rect(&ctm, rect, state.fill);
                    }
                }
                "n" | "S" | "s" => path.clear(),
                "Do" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        self.draw_xobject(name, resources, state.ctm, depth);
                    }
                }
                _ => {}
            }
        }
    }

    fn draw_xobject(
        &mut self,
        name: &[u8],
        resources: Option<&Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) {
        let doc = self.doc;
        let Some(stream) = resources
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| resolve(doc, x).as_dict().ok())
            .and_then(|x| x.get(name).ok())
            .and_then(|o| resolve(doc, o).as_stream().ok())
        else {
            warn!("XObject /{} not found", String::from_utf8_lossy(name));
            return;
        };

        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();
        match subtype {
            Some(b"Image") => match images::decode_image_xobject(doc, stream) {
                Ok(image) => self.canvas.draw_image(&ctm, &image),
                Err(e) => warn!("Skipping image /{}: {e:#}", String::from_utf8_lossy(name)),
            },
            Some(b"Form") if depth < MAX_FORM_DEPTH => {
                let matrix = numbers::<6>(
                    stream
                        .dict
                        .get(b"Matrix")
                        .and_then(Object::as_array)
                        .map(Vec::as_slice)
                        .unwrap_or_default(),
                )
                .map_or(Matrix::IDENTITY, |[a, b, c, d, e, f]| {
                    Matrix::new(a, b, c, d, e, f)
                });
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .and_then(|r| resolve(doc, r).as_dict().ok())
                    .or(resources);
                let content = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                match Content::decode(&content) {
                    Ok(content) => self.run(
                        &content.operations,
                        form_resources,
                        matrix.then(&ctm),
                        depth + 1,
                    ),
                    Err(e) => warn!("Skipping form /{}: {e}", String::from_utf8_lossy(name)),
                }
            }
            _ => debug!("Ignoring XObject /{}", String::from_utf8_lossy(name)),
        }
    }
}

/// Follows a reference to its target, or returns the object as-is.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Looks up a page attribute, walking up the page tree for inherited keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok();
    // Bounded walk guards against cyclic /Parent links.
    for _ in 0..32 {
        let dict = node?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        node = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    None
}

/// Visible page area `[x0, y0, x1, y1]`: the crop box, else the media box.
fn page_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let read = |key: &[u8]| {
        inherited(doc, page_id, key)
            .and_then(|b| resolve(doc, b).as_array().ok())
            .and_then(|b| numbers::<4>(b))
            .map(|[ax, ay, bx, by]| [ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)])
            .filter(|[x0, y0, x1, y1]| x1 > x0 && y1 > y0)
    };
    read(b"CropBox")
        .or_else(|| read(b"MediaBox"))
        .unwrap_or(DEFAULT_PAGE_BOX)
}

/// Reads exactly `N` numeric operands.
fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = operand.as_float().ok()?;
    }
    Some(out)
}

fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
