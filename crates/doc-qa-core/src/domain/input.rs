//! Input files and their content kinds.

use serde::{Deserialize, Serialize};

/// Content kind of an input file, resolved once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Multi-page document (PDF).
    PaginatedDocument,
    /// Single raster image (JPEG, PNG, ...).
    RasterImage,
    /// Anything else; never analyzed.
    Unsupported,
}

impl InputKind {
    /// Resolves a kind from a declared MIME type.
    ///
    /// ```
    /// use doc_qa_core::InputKind;
    ///
    /// assert_eq!(InputKind::from_mime("application/pdf"), InputKind::PaginatedDocument);
    /// assert_eq!(InputKind::from_mime("image/png"), InputKind::RasterImage);
    /// assert_eq!(InputKind::from_mime("text/plain"), InputKind::Unsupported);
    /// ```
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/pdf" {
            Self::PaginatedDocument
        } else if essence.starts_with("image/") {
            Self::RasterImage
        } else {
            Self::Unsupported
        }
    }
}

/// A file submitted for quality validation.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Display name or path.
    pub name: String,
    /// Declared content kind.
    pub kind: InputKind,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Creates an input file with an already-resolved kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: InputKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes,
        }
    }

    /// Creates an input file, resolving its kind from a MIME type.
    #[must_use]
    pub fn with_mime(name: impl Into<String>, mime: &str, bytes: Vec<u8>) -> Self {
        Self::new(name, InputKind::from_mime(mime), bytes)
    }

    /// Declared size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
