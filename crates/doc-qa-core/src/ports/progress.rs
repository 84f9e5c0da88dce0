//! Progress reporting port for UI integration.

use crate::domain::AnalysisRecord;

/// Events emitted during validation for progress tracking.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Validation started for a file.
    Started {
        /// Path to the file.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total files in batch, if known.
        total: Option<usize>,
    },
    /// Validation completed for a file.
    Completed {
        /// The analysis record.
        record: AnalysisRecord,
    },
    /// A file was skipped because it could not be read.
    Skipped {
        /// Path to the file.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// All files have been processed.
    Finished {
        /// Files validated.
        processed: usize,
        /// Files skipped.
        skipped: usize,
        /// Files whose verdict was rejected.
        rejected: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
