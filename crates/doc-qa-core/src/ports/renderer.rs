//! Page rendering port for paginated documents.

use crate::domain::RasterImage;

/// A page rasterized for analysis.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// The page raster.
    pub raster: RasterImage,
    /// Byte size the raster would occupy as an encoded image file.
    pub encoded_size: u64,
}

/// Opens paginated documents for page-by-page rendering.
pub trait PageRenderer: Send + Sync {
    /// Parses `bytes` as a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed.
    fn open<'a>(&self, bytes: &'a [u8]) -> anyhow::Result<Box<dyn PageSource + 'a>>;
}

/// An opened document.
///
/// Each call to [`PageSource::render_page`] allocates a fresh surface that
/// is owned by the returned [`RenderedPage`].
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Renders the page at `index` (0-based) scaled by `scale` relative to
    /// its native dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is missing or cannot be rasterized.
    fn render_page(&mut self, index: usize, scale: f32) -> anyhow::Result<RenderedPage>;
}
