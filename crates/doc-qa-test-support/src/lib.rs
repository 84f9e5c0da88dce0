//! Test support utilities for doc-qa.
//!
//! Provides mocks, synthetic raster and PDF builders, and utilities for
//! testing the validation pipeline.
//!
//! # Example
//!
//! ```
//! use doc_qa_test_support::{MockPageRenderer, SyntheticRasterBuilder};
//!
//! // Create synthetic test rasters
//! let sharp = SyntheticRasterBuilder::checkerboard(128, 128);
//! let blurry = SyntheticRasterBuilder::uniform_gray(128, 128, 128);
//!
//! // Serve them as the pages of a mock document
//! let renderer = MockPageRenderer::new(vec![(sharp, 100 * 1024), (blurry, 100 * 1024)]);
//! ```

mod builders;
mod mocks;
mod pdf;

pub use builders::SyntheticRasterBuilder;
pub use mocks::{MockInputSource, MockPageRenderer, MockProgressSink, MockResultOutput};
pub use pdf::SyntheticPdfBuilder;
