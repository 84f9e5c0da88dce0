//! Analysis record types.

use serde::{Deserialize, Serialize};

use super::{InputKind, QualityVerdict};

/// Complete analysis record for a single input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Path to the analyzed file.
    pub path: String,
    /// Timestamp of analysis (ISO 8601).
    pub timestamp: String,
    /// Content kind the file was dispatched as.
    pub kind: InputKind,
    /// Quality verdict, flattened into the record.
    #[serde(flatten)]
    pub verdict: QualityVerdict,
}

impl AnalysisRecord {
    /// Whether the record's verdict rejected the file.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        !self.verdict.is_acceptable()
    }
}
