//! Progress reporting on stderr using indicatif.

use doc_qa_core::{AnalysisRecord, ProgressEvent, ProgressSink};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";

enum Mode {
    Silent,
    /// One stderr line per rejected file.
    Lines,
    Bar(IndicatifBar),
}

/// Stderr progress reporter: a bar on terminals, rejection lines otherwise.
pub struct ProgressBar {
    mode: Mode,
}

impl ProgressBar {
    /// Creates a reporter for `total` files.
    ///
    /// `quiet` wins over `show_bar`. Without a bar, every rejected file is
    /// summarized as `{path}: quality {q} - {message}`.
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        let mode = if quiet {
            Mode::Silent
        } else if show_bar {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);
            if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            Mode::Bar(bar)
        } else {
            Mode::Lines
        };

        Self { mode }
    }

    fn report_rejection(record: &AnalysisRecord) {
        let legibility = record.verdict.legibility();
        eprintln!(
            "{}: quality {} - {}",
            record.path, legibility.quality, legibility.message
        );
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        let bar = match &self.mode {
            Mode::Silent => return,
            Mode::Lines => None,
            Mode::Bar(bar) => Some(bar),
        };

        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = bar {
                    if let Some(total) = total {
                        bar.set_length(total as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { record } => match bar {
                Some(bar) => bar.inc(1),
                None if record.is_rejected() => Self::report_rejection(&record),
                None => {}
            },
            ProgressEvent::Skipped { path, reason } => {
                let line = format!("WARN: Skipping {path}: {reason}");
                match bar {
                    Some(bar) => {
                        bar.inc(1);
                        bar.println(line);
                    }
                    None => eprintln!("{line}"),
                }
            }
            ProgressEvent::Finished {
                processed,
                skipped,
                rejected,
            } => {
                if let Some(bar) = bar {
                    bar.finish_with_message(format!(
                        "{processed} checked, {rejected} rejected, {skipped} skipped"
                    ));
                }
            }
        }
    }
}
