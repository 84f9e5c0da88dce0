//! Check command - validate documents and images for legibility.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use doc_qa_adapters::{FsInputSource, ImageDecoder, LopdfRenderer};
use doc_qa_core::{
    AnalysisRecord, InputError, InputSource, ProgressEvent, ProgressSink, QualityThresholds,
    ResultOutput, Validator,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Parse and validate a ratio value (0.0-1.0).
fn parse_ratio(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse a finite, non-negative number.
fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be a non-negative number"))
    }
}

/// Parse a page limit of at least one page.
fn parse_page_limit(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("page limit must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{s}' is not a valid page count")),
    }
}

/// Shared arguments for validation.
#[derive(Args, Clone, Default)]
pub struct CheckArgs {
    /// Files or directories to validate
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Minimum raster width in pixels
    #[arg(long, value_name = "PX")]
    pub min_resolution: Option<u32>,

    /// Minimum Laplacian sharpness score
    #[arg(long, value_parser = parse_non_negative)]
    pub min_sharpness: Option<f64>,

    /// Minimum contrast ratio (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub min_contrast: Option<f64>,

    /// Maximum noise ratio (0.0-1.0)
    #[arg(long, value_parser = parse_ratio)]
    pub max_noise: Option<f64>,

    /// Minimum file size in KB
    #[arg(long, value_name = "KB", value_parser = parse_non_negative)]
    pub min_size_kb: Option<f64>,

    /// Reject PDFs with more pages than this
    #[arg(long, value_name = "N", value_parser = parse_page_limit)]
    pub max_pages: Option<usize>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (`QualityThresholds::default()`)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        let t = &config.thresholds;
        args.min_resolution = args.min_resolution.or(t.min_resolution);
        args.min_sharpness = args.min_sharpness.or(t.min_sharpness);
        args.min_contrast = args.min_contrast.or(t.min_contrast);
        args.max_noise = args.max_noise.or(t.max_noise);
        args.min_size_kb = args.min_size_kb.or(t.min_size_kb);

        // A zero limit in config is reported by validation and ignored here.
        args.max_pages = args
            .max_pages
            .or(config.document.max_pages.filter(|&n| n > 0));

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Thresholds with CLI/config overrides applied over the defaults.
    #[must_use]
    pub fn thresholds(&self) -> QualityThresholds {
        let defaults = QualityThresholds::default();
        QualityThresholds {
            min_resolution: self.min_resolution.unwrap_or(defaults.min_resolution),
            min_sharpness: self.min_sharpness.unwrap_or(defaults.min_sharpness),
            min_contrast: self.min_contrast.unwrap_or(defaults.min_contrast),
            max_noise: self.max_noise.unwrap_or(defaults.max_noise),
            min_size_kb: self.min_size_kb.unwrap_or(defaults.min_size_kb),
            ..defaults
        }
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }
}

/// Result of running the check command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct CheckResult {
    /// Number of files validated.
    pub processed: usize,
    /// Number of files that could not be read.
    pub skipped: usize,
    /// Number of files whose verdict was rejected.
    pub rejected: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let source = FsInputSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let stdout = Box::new(std::io::stdout());
    let output = match args.format() {
        OutputFormat::Jsonl => JsonOutput::lines(stdout),
        OutputFormat::Json => JsonOutput::array(stdout, args.pretty),
    };

    let thresholds = args.thresholds();
    debug!(?thresholds, max_pages = ?args.max_pages, "Effective settings");
    let validator = Validator::new(thresholds, Box::new(ImageDecoder), Box::new(LopdfRenderer))
        .with_page_limit(args.max_pages);

    process_files(&source, &validator, &output, &progress_bar)
}

/// Validate every file from `source`, writing one record per file.
fn process_files(
    source: &dyn InputSource,
    validator: &Validator,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
) -> Result<CheckResult> {
    let total = source.count_hint();
    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut rejected = 0usize;

    for (index, file_result) in source.files().enumerate() {
        let file = match file_result {
            Ok(file) => file,
            Err(e) => {
                let (path, reason) = match e.downcast_ref::<InputError>() {
                    Some(input) => (input.path.clone(), input.source.to_string()),
                    None => (format!("file {index}"), format!("{e:#}")),
                };
                progress.on_event(ProgressEvent::Skipped { path, reason });
                skipped += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: file.name.clone(),
            index,
            total,
        });

        let verdict = validator.validate(&file);
        let record = AnalysisRecord {
            path: file.name,
            timestamp: iso_timestamp(),
            kind: file.kind,
            verdict,
        };

        if record.is_rejected() {
            rejected += 1;
        }

        progress.on_event(ProgressEvent::Completed {
            record: record.clone(),
        });

        output.write(&record)?;
        processed += 1;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        processed,
        skipped,
        rejected,
    });

    let exit_code = if rejected > 0 {
        ExitCode::IssuesFound
    } else {
        ExitCode::Success
    };

    Ok(CheckResult {
        processed,
        skipped,
        rejected,
        exit_code,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
