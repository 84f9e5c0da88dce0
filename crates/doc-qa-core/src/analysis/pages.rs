//! Multi-page aggregation for paginated documents.

use tracing::{debug, info, warn};

use super::RasterAnalyzer;
use crate::domain::{DocumentMetrics, PageVerdict, QualityVerdict, VerdictMetrics};
use crate::ports::PageRenderer;

/// Scale applied to native page dimensions before analysis.
pub const PAGE_RENDER_SCALE: f32 = 2.0;

/// Problem reported when a document cannot be opened or rendered.
pub const DOCUMENT_FAILED: &str = "Failed to analyze PDF";

/// Problem reported for a document without pages.
pub const DOCUMENT_EMPTY: &str = "Document has no pages";

/// Renders each page of a document and folds the page verdicts into one.
#[derive(Debug, Clone, Copy)]
pub struct PageAggregator {
    analyzer: RasterAnalyzer,
    scale: f32,
    page_limit: Option<usize>,
}

impl PageAggregator {
    /// Creates an aggregator that grades pages with `analyzer`.
    #[must_use]
    pub const fn new(analyzer: RasterAnalyzer) -> Self {
        Self {
            analyzer,
            scale: PAGE_RENDER_SCALE,
            page_limit: None,
        }
    }

    /// Rejects documents with more than `limit` pages before rendering.
    #[must_use]
    pub const fn with_page_limit(mut self, limit: Option<usize>) -> Self {
        self.page_limit = limit;
        self
    }

    /// Analyzes every page of `bytes`, in order, one page at a time.
    ///
    /// Each page raster is dropped before the next page is rendered. A
    /// document that cannot be opened, or a page that cannot be rendered,
    /// produces a single rejected verdict without metrics.
    #[must_use]
    pub fn analyze(&self, renderer: &dyn PageRenderer, bytes: &[u8]) -> QualityVerdict {
        let mut document = match renderer.open(bytes) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to open document: {e:#}");
                return QualityVerdict::failure(DOCUMENT_FAILED);
            }
        };

        let total = document.page_count();
        if total == 0 {
            return QualityVerdict::failure(DOCUMENT_EMPTY);
        }
        if let Some(limit) = self.page_limit {
            if total > limit {
                info!("Document has {total} pages, over the limit of {limit}");
                return QualityVerdict::failure(format!(
                    "Document has {total} pages, limit is {limit}"
                ));
            }
        }

        let mut pages = Vec::with_capacity(total);
        for index in 0..total {
            let rendered = match document.render_page(index, self.scale) {
                Ok(rendered) => rendered,
                Err(e) => {
                    warn!(page = index + 1, "Failed to render page: {e:#}");
                    return QualityVerdict::failure(DOCUMENT_FAILED);
                }
            };

            let verdict = self.analyzer.analyze(&rendered.raster, rendered.encoded_size);
            debug!(
                page = index + 1,
                acceptable = verdict.is_acceptable(),
                "Analyzed page"
            );
            drop(rendered);

            pages.push(PageVerdict {
                page: index + 1,
                verdict,
            });
        }

        aggregate(&pages)
    }
}

/// Folds page verdicts into a document verdict.
///
/// The document is acceptable only if every page is. Each page with
/// problems contributes its first problem, prefixed with the page number.
#[must_use]
pub fn aggregate(pages: &[PageVerdict]) -> QualityVerdict {
    let valid_pages = pages.iter().filter(|p| p.verdict.is_acceptable()).count();

    let problems = pages
        .iter()
        .filter_map(|p| {
            p.verdict
                .problems()
                .first()
                .map(|problem| format!("Page {}: {problem}", p.page))
        })
        .collect();

    QualityVerdict::from_problems(
        VerdictMetrics::Document(DocumentMetrics {
            total_pages: pages.len(),
            valid_pages,
        }),
        problems,
    )
}
