//! Input source port for loading files from various sources.

use thiserror::Error;

use crate::domain::InputFile;

/// A file named by the source that could not be read.
///
/// Sources yield this (wrapped in `anyhow::Error`) so callers can report
/// the offending path without parsing the message.
#[derive(Debug, Error)]
#[error("Failed to read file: {path}")]
pub struct InputError {
    /// Path or display name of the unreadable file.
    pub path: String,
    /// Underlying I/O failure.
    #[source]
    pub source: std::io::Error,
}

/// Port for loading input files from a source.
pub trait InputSource: Send + Sync {
    /// Returns an iterator over files from this source.
    ///
    /// # Errors
    ///
    /// Individual items may be errors if a file fails to load.
    fn files(&self) -> Box<dyn Iterator<Item = anyhow::Result<InputFile>> + Send + '_>;

    /// Returns the total number of files, if known.
    fn count_hint(&self) -> Option<usize>;
}
