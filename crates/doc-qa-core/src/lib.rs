//! Doc QA Core - Domain logic for document quality gating
//!
//! This crate contains the domain types, the raster analyzer with its
//! sharpness, contrast and noise estimators, multi-page aggregation for
//! paginated documents, and the dispatcher that routes input files.

pub mod analysis;
pub mod domain;
pub mod ports;

pub use analysis::{PageAggregator, RasterAnalyzer, Validator};
pub use domain::{
    AnalysisRecord, DocumentMetrics, ImageMetrics, InputFile, InputKind, Legibility, PageVerdict,
    QualityLevel, QualityThresholds, QualityVerdict, RasterError, RasterImage, VerdictMetrics,
};
pub use ports::{
    InputError, InputSource, PageRenderer, PageSource, ProgressEvent, ProgressSink, RasterDecoder,
    RenderedPage, ResultOutput,
};
