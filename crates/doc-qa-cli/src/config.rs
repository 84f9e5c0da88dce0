//! Configuration file support for doc-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/doc-qa/config.toml` (lowest priority)
//! - Project-local: `.doc-qa.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Quality threshold overrides.
    pub thresholds: ThresholdsConfig,
    /// Paginated document limits.
    pub document: DocumentConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Quality threshold overrides.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Minimum raster width in pixels.
    pub min_resolution: Option<u32>,
    /// Minimum Laplacian sharpness score.
    pub min_sharpness: Option<f64>,
    /// Minimum contrast ratio (0.0-1.0).
    pub min_contrast: Option<f64>,
    /// Maximum noise ratio (0.0-1.0).
    pub max_noise: Option<f64>,
    /// Minimum file size in KB.
    pub min_size_kb: Option<f64>,
}

/// Paginated document configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Reject documents with more pages than this.
    pub max_pages: Option<usize>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

/// File name searched for in the working directory and its ancestors.
const PROJECT_CONFIG_NAME: &str = ".doc-qa.toml";

impl AppConfig {
    /// Loads and merges the XDG config, then the nearest project config.
    ///
    /// Missing or unparseable files are skipped. Out-of-range values are
    /// reported on stderr and kept; range-checked CLI flags still win.
    pub fn load() -> Self {
        let layers = [
            ("XDG", xdg_config_path().filter(|p| p.is_file())),
            ("project", find_project_config()),
        ];

        let mut config = Self::default();
        for (layer, path) in layers {
            let Some(path) = path else {
                debug!("No {layer} config found");
                continue;
            };
            info!("Loading {layer} config: {}", path.display());
            if let Some(loaded) = load_file(&path) {
                config.merge(loaded);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Checks every configured value, reporting all problems at once.
    pub fn validate(&self) -> Result<(), String> {
        let t = &self.thresholds;
        let mut problems = Vec::new();

        let ratios = [
            ("thresholds.min_contrast", t.min_contrast),
            ("thresholds.max_noise", t.max_noise),
        ];
        for (name, value) in ratios {
            match value {
                Some(v) if !(0.0..=1.0).contains(&v) => {
                    problems.push(format!("{name} must be 0.0-1.0, got {v}"));
                }
                _ => {}
            }
        }

        let floors = [
            ("thresholds.min_sharpness", t.min_sharpness),
            ("thresholds.min_size_kb", t.min_size_kb),
        ];
        for (name, value) in floors {
            match value {
                Some(v) if !v.is_finite() || v < 0.0 => {
                    problems.push(format!("{name} must be a non-negative number, got {v}"));
                }
                _ => {}
            }
        }

        if self.document.max_pages == Some(0) {
            problems.push("document.max_pages must be at least 1".to_string());
        }

        match self.output.format.as_deref() {
            None | Some("json" | "jsonl") => {}
            Some(other) => problems.push(format!(
                "output.format must be 'json' or 'jsonl', got '{other}'"
            )),
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }

    /// Overlays `other` onto `self`; set values in `other` win.
    fn merge(&mut self, other: Self) {
        let Self {
            general,
            thresholds,
            document,
            output,
        } = other;

        self.general.recursive = general.recursive.or(self.general.recursive);

        let t = &mut self.thresholds;
        t.min_resolution = thresholds.min_resolution.or(t.min_resolution);
        t.min_sharpness = thresholds.min_sharpness.or(t.min_sharpness);
        t.min_contrast = thresholds.min_contrast.or(t.min_contrast);
        t.max_noise = thresholds.max_noise.or(t.max_noise);
        t.min_size_kb = thresholds.min_size_kb.or(t.min_size_kb);

        self.document.max_pages = document.max_pages.or(self.document.max_pages);

        let o = &mut self.output;
        if output.format.is_some() {
            o.format = output.format;
        }
        o.pretty = output.pretty.or(o.pretty);
        o.progress = output.progress.or(o.progress);
    }
}

/// `$XDG_CONFIG_HOME/doc-qa/config.toml` or the platform equivalent.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("doc-qa").join("config.toml"))
}

fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Nearest `.doc-qa.toml` in `start` or one of its ancestors.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_NAME))
        .find(|candidate| candidate.is_file())
}

fn load_file(path: &Path) -> Option<AppConfig> {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))
        .and_then(|content| {
            toml::from_str(&content)
                .map_err(|e| format!("Failed to parse config file {}: {e}", path.display()))
        });

    match parsed {
        Ok(config) => Some(config),
        Err(message) => {
            warn!("{message}");
            None
        }
    }
}
