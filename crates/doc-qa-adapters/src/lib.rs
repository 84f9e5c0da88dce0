//! Doc QA Adapters - External adapters for doc-qa.
//!
//! This crate provides adapters for:
//! - Filesystem input source
//! - Raster image decoding
//! - PDF page rendering

pub mod decoder;
pub mod fs;
pub mod pdf;

pub use decoder::ImageDecoder;
pub use fs::{kind_for_path, FsInputSource};
pub use pdf::LopdfRenderer;
