//! Filesystem adapter for loading input files.

use anyhow::Result;
use doc_qa_core::{InputError, InputFile, InputKind, InputSource};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions picked up when scanning directories.
const SCANNED_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "tiff", "tif", "webp", "bmp", "gif",
];

/// Filesystem input source adapter.
pub struct FsInputSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsInputSource {
    /// Creates a new filesystem input source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all input files from the configured paths.
    ///
    /// Explicitly named files are kept whatever their type.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_scanned(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl InputSource for FsInputSource {
    fn files(&self) -> Box<dyn Iterator<Item = Result<InputFile>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} input files", files.len());

        Box::new(files.into_iter().map(|path| load_file(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Checks if a path has an extension picked up by directory scans.
fn is_scanned(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| SCANNED_EXTENSIONS.contains(&e.as_str()))
}

/// Resolves the content kind of a path from its extension.
#[must_use]
pub fn kind_for_path(path: &Path) -> InputKind {
    mime_guess::from_path(path)
        .first_raw()
        .map_or(InputKind::Unsupported, InputKind::from_mime)
}

/// Reads a file from the filesystem.
fn load_file(path: &Path) -> Result<InputFile> {
    let bytes = std::fs::read(path).map_err(|source| InputError {
        path: path.to_string_lossy().into_owned(),
        source,
    })?;

    Ok(InputFile::new(
        path.to_string_lossy().into_owned(),
        kind_for_path(path),
        bytes,
    ))
}
