//! Verdict types produced by quality analysis.

use serde::{Deserialize, Serialize};

/// Message used when a verdict carries no problems.
pub const ACCEPTABLE_MESSAGE: &str = "Acceptable quality";

/// Overall grade of an analyzed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    /// Every check passed.
    Optimal,
    /// At least one check failed, or the file could not be analyzed.
    Rejected,
}

/// Metrics reported for a single raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageMetrics {
    /// Image width in pixels.
    pub resolution: u32,
    /// Rounded Laplacian energy.
    pub sharpness: u64,
    /// Dynamic range ratio, two decimals.
    pub contrast: f64,
    /// Luminance deviation ratio, two decimals.
    pub noise: f64,
    /// Rounded file size in kilobytes.
    #[serde(rename = "fileSizeKB")]
    pub file_size_kb: u64,
}

/// Metrics reported for a paginated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetrics {
    /// Number of pages analyzed.
    pub total_pages: usize,
    /// Number of pages whose verdict was acceptable.
    pub valid_pages: usize,
}

/// Metrics attached to a successful analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerdictMetrics {
    /// Single raster metrics.
    Image(ImageMetrics),
    /// Document-level page counts.
    Document(DocumentMetrics),
}

/// Accept/reject result for one file or page.
///
/// `is_acceptable` holds exactly when `problems` is empty, and `level` is
/// `Optimal` exactly when `is_acceptable` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityVerdict {
    is_acceptable: bool,
    level: QualityLevel,
    metrics: Option<VerdictMetrics>,
    problems: Vec<String>,
}

impl QualityVerdict {
    /// Builds a verdict from computed metrics and the problems found.
    #[must_use]
    pub fn from_problems(metrics: VerdictMetrics, problems: Vec<String>) -> Self {
        let is_acceptable = problems.is_empty();
        Self {
            is_acceptable,
            level: if is_acceptable {
                QualityLevel::Optimal
            } else {
                QualityLevel::Rejected
            },
            metrics: Some(metrics),
            problems,
        }
    }

    /// Builds a rejected verdict without metrics, for inputs that could not
    /// be analyzed at all.
    #[must_use]
    pub fn failure(problem: impl Into<String>) -> Self {
        Self {
            is_acceptable: false,
            level: QualityLevel::Rejected,
            metrics: None,
            problems: vec![problem.into()],
        }
    }

    /// Whether the file is fit for downstream extraction.
    #[must_use]
    pub const fn is_acceptable(&self) -> bool {
        self.is_acceptable
    }

    /// Overall grade.
    #[must_use]
    pub const fn level(&self) -> QualityLevel {
        self.level
    }

    /// Metrics, absent when analysis could not run.
    #[must_use]
    pub const fn metrics(&self) -> Option<&VerdictMetrics> {
        self.metrics.as_ref()
    }

    /// Diagnostic messages in check order.
    #[must_use]
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// Summarizes the verdict for display next to an uploaded file.
    #[must_use]
    pub fn legibility(&self) -> Legibility {
        Legibility {
            is_legible: self.is_acceptable,
            quality: if self.is_acceptable { 100 } else { 30 },
            message: self
                .problems
                .first()
                .cloned()
                .unwrap_or_else(|| ACCEPTABLE_MESSAGE.to_string()),
        }
    }
}

/// A verdict tagged with its 1-based page number.
#[derive(Debug, Clone, PartialEq)]
pub struct PageVerdict {
    /// 1-based page number.
    pub page: usize,
    /// Verdict for the page raster.
    pub verdict: QualityVerdict,
}

/// Condensed verdict for user-facing display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legibility {
    /// Whether the document can be read downstream.
    pub is_legible: bool,
    /// Coarse quality score: 100 when legible, 30 otherwise.
    pub quality: u8,
    /// First problem, or a fixed acceptance message.
    pub message: String,
}
