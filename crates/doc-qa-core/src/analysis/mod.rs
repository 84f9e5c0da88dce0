//! Document quality analysis.
//!
//! - [`metrics`]: sharpness, contrast and noise estimators on the luminance plane
//! - [`RasterAnalyzer`]: threshold checks for a single raster
//! - [`PageAggregator`]: page-by-page analysis of paginated documents
//! - [`Validator`]: routes input files to the right analyzer

mod analyzer;
mod dispatch;
pub mod metrics;
mod pages;

pub use analyzer::{RasterAnalyzer, IMAGE_ANALYSIS_FAILED, IMAGE_LOAD_FAILED};
pub use dispatch::{Validator, UNSUPPORTED_FILE_TYPE};
pub use metrics::{measure, LuminancePlane, RasterMetrics};
pub use pages::{aggregate, PageAggregator, DOCUMENT_EMPTY, DOCUMENT_FAILED, PAGE_RENDER_SCALE};
