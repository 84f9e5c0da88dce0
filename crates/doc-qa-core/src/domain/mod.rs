//! Core domain types for document quality analysis.

mod input;
mod raster;
mod result;
mod thresholds;
mod verdict;

pub use input::{InputFile, InputKind};
pub use raster::{RasterError, RasterImage, BYTES_PER_PIXEL};
pub use result::AnalysisRecord;
pub use thresholds::QualityThresholds;
pub use verdict::{
    DocumentMetrics, ImageMetrics, Legibility, PageVerdict, QualityLevel, QualityVerdict,
    VerdictMetrics, ACCEPTABLE_MESSAGE,
};
