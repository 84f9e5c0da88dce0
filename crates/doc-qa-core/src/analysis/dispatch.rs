//! Dispatcher: routes input files to the raster or document analyzer.

use tracing::{debug, warn};

use super::analyzer::IMAGE_LOAD_FAILED;
use super::{PageAggregator, RasterAnalyzer};
use crate::domain::{InputFile, InputKind, QualityThresholds, QualityVerdict, RasterImage};
use crate::ports::{PageRenderer, RasterDecoder};

/// Problem reported for inputs that are neither images nor documents.
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";

/// Single entry point for validating input files.
pub struct Validator {
    analyzer: RasterAnalyzer,
    pages: PageAggregator,
    decoder: Box<dyn RasterDecoder>,
    renderer: Box<dyn PageRenderer>,
}

impl Validator {
    /// Creates a validator with the given thresholds and decoding adapters.
    #[must_use]
    pub fn new(
        thresholds: QualityThresholds,
        decoder: Box<dyn RasterDecoder>,
        renderer: Box<dyn PageRenderer>,
    ) -> Self {
        let analyzer = RasterAnalyzer::new(thresholds);
        Self {
            analyzer,
            pages: PageAggregator::new(analyzer),
            decoder,
            renderer,
        }
    }

    /// Rejects documents with more than `limit` pages.
    #[must_use]
    pub fn with_page_limit(mut self, limit: Option<usize>) -> Self {
        self.pages = self.pages.with_page_limit(limit);
        self
    }

    /// Thresholds applied to every raster.
    #[must_use]
    pub const fn thresholds(&self) -> &QualityThresholds {
        self.analyzer.thresholds()
    }

    /// Validates one input file. Never fails: every input yields a verdict.
    #[must_use]
    pub fn validate(&self, input: &InputFile) -> QualityVerdict {
        debug!(name = %input.name, kind = ?input.kind, size = input.size(), "Dispatching");

        match input.kind {
            InputKind::PaginatedDocument => self.pages.analyze(self.renderer.as_ref(), &input.bytes),
            InputKind::RasterImage => match self.decoder.decode(&input.bytes) {
                Ok(raster) => self.analyzer.analyze(&raster, input.size()),
                Err(e) => {
                    warn!("Failed to decode {}: {e:#}", input.name);
                    QualityVerdict::failure(IMAGE_LOAD_FAILED)
                }
            },
            InputKind::Unsupported => QualityVerdict::failure(UNSUPPORTED_FILE_TYPE),
        }
    }

    /// Validates an already-decoded bitmap whose source was `file_size` bytes.
    #[must_use]
    pub fn analyze_raster(&self, raster: &RasterImage, file_size: u64) -> QualityVerdict {
        self.analyzer.analyze(raster, file_size)
    }
}
