//! Recording test doubles for the core ports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use doc_qa_core::{
    AnalysisRecord, InputError, InputFile, InputSource, PageRenderer, PageSource, ProgressEvent,
    ProgressSink, RasterImage, RenderedPage, ResultOutput,
};

/// Append-only log shared between a double and its clones.
struct Log<T>(Arc<Mutex<Vec<T>>>);

impl<T: Clone> Log<T> {
    fn push(&self, item: T) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(item);
    }

    fn snapshot(&self) -> Vec<T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<T> Clone for Log<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Log<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

/// In-memory `InputSource` that counts how often it is iterated.
pub struct MockInputSource {
    files: Vec<InputFile>,
    unreadable: Vec<String>,
    iterations: AtomicUsize,
}

impl MockInputSource {
    /// Creates a source yielding `files` in order.
    #[must_use]
    pub const fn new(files: Vec<InputFile>) -> Self {
        Self {
            files,
            unreadable: Vec::new(),
            iterations: AtomicUsize::new(0),
        }
    }

    /// Adds paths that fail to load with an `InputError`, yielded after
    /// the readable files.
    #[must_use]
    pub fn with_unreadable(mut self, paths: &[&str]) -> Self {
        self.unreadable = paths.iter().map(ToString::to_string).collect();
        self
    }

    /// A source with no files.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of `files()` calls so far.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        self.iterations.load(Ordering::SeqCst)
    }
}

impl InputSource for MockInputSource {
    fn files(&self) -> Box<dyn Iterator<Item = anyhow::Result<InputFile>> + Send + '_> {
        self.iterations.fetch_add(1, Ordering::SeqCst);
        let failures = self.unreadable.iter().map(|path| -> anyhow::Result<InputFile> {
            Err(InputError {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
            }
            .into())
        });
        Box::new(self.files.iter().cloned().map(Ok).chain(failures))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.files.len() + self.unreadable.len())
    }
}

/// `PageRenderer` serving pre-rendered page rasters with fixed encoded
/// sizes. Records which pages were rendered.
#[derive(Clone, Default)]
pub struct MockPageRenderer {
    pages: Vec<RenderedPage>,
    fail_open: bool,
    fail_page: Option<usize>,
    rendered: Log<usize>,
}

impl MockPageRenderer {
    /// Creates a renderer serving `pages` as `(raster, encoded_size)`.
    #[must_use]
    pub fn new(pages: Vec<(RasterImage, u64)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(raster, encoded_size)| RenderedPage {
                    raster,
                    encoded_size,
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Creates a renderer that rejects every document as unparseable.
    #[must_use]
    pub fn unparseable() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Makes rendering of the page at `index` fail.
    #[must_use]
    pub const fn failing_page(mut self, index: usize) -> Self {
        self.fail_page = Some(index);
        self
    }

    /// Page indices rendered so far, in order.
    #[must_use]
    pub fn rendered_pages(&self) -> Vec<usize> {
        self.rendered.snapshot()
    }
}

impl PageRenderer for MockPageRenderer {
    fn open<'a>(&self, _bytes: &'a [u8]) -> anyhow::Result<Box<dyn PageSource + 'a>> {
        anyhow::ensure!(!self.fail_open, "not a PDF");
        Ok(Box::new(self.clone()))
    }
}

impl PageSource for MockPageRenderer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn render_page(&mut self, index: usize, _scale: f32) -> anyhow::Result<RenderedPage> {
        anyhow::ensure!(self.fail_page != Some(index), "page {index} is damaged");
        self.rendered.push(index);
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("page {index} out of range"))
    }
}

/// `ResultOutput` that keeps every written record.
#[derive(Default)]
pub struct MockResultOutput {
    records: Log<AnalysisRecord>,
    flushes: AtomicUsize,
}

impl MockResultOutput {
    /// Creates an output with no records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records written so far.
    #[must_use]
    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.records.snapshot()
    }

    /// Number of `flush()` calls so far.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, record: &AnalysisRecord) -> anyhow::Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `ProgressSink` that keeps every event.
#[derive(Default)]
pub struct MockProgressSink {
    events: Log<ProgressEvent>,
}

impl MockProgressSink {
    /// Creates a sink with no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.snapshot()
    }

    fn count(&self, matches: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| matches(e)).count()
    }

    /// Number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Skipped { .. }))
    }

    /// `(processed, skipped, rejected)` from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize, usize)> {
        self.events().into_iter().find_map(|e| match e {
            ProgressEvent::Finished {
                processed,
                skipped,
                rejected,
            } => Some((processed, skipped, rejected)),
            _ => None,
        })
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use doc_qa_core::{InputKind, QualityVerdict};

    #[test]
    fn test_mock_input_source_empty() {
        let source = MockInputSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.files().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_input_source_with_files() {
        let file = InputFile::with_mime("scan.png", "image/png", vec![1, 2, 3]);
        let source = MockInputSource::new(vec![file]);

        assert_eq!(source.count_hint(), Some(1));
        let loaded: Vec<_> = source.files().map(Result::unwrap).collect();
        assert_eq!(loaded[0].kind, InputKind::RasterImage);
    }

    #[test]
    fn test_mock_input_source_unreadable_paths() {
        let source = MockInputSource::empty().with_unreadable(&["locked.pdf"]);

        assert_eq!(source.count_hint(), Some(1));
        let err = source.files().next().unwrap().unwrap_err();
        assert_eq!(err.downcast_ref::<InputError>().unwrap().path, "locked.pdf");
    }

    #[test]
    fn test_mock_page_renderer_records_pages() {
        let raster = RasterImage::filled(2, 2, [0, 0, 0, 255]).unwrap();
        let renderer = MockPageRenderer::new(vec![(raster.clone(), 10), (raster, 20)]);

        let mut doc = renderer.open(b"%PDF").unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.render_page(1, 2.0).unwrap().encoded_size, 20);
        assert_eq!(renderer.rendered_pages(), [1]);
    }

    #[test]
    fn test_mock_page_renderer_failures() {
        assert!(MockPageRenderer::unparseable().open(b"").is_err());

        let raster = RasterImage::filled(2, 2, [0, 0, 0, 255]).unwrap();
        let renderer = MockPageRenderer::new(vec![(raster, 10)]).failing_page(0);
        assert!(renderer.open(b"").unwrap().render_page(0, 2.0).is_err());
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();

        let record = AnalysisRecord {
            path: "scan.jpg".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            kind: InputKind::RasterImage,
            verdict: QualityVerdict::failure("Failed to load image"),
        };

        output.write(&record).unwrap();
        output.flush().unwrap();

        assert_eq!(output.records().len(), 1);
        assert_eq!(output.records()[0].path, "scan.jpg");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "scan.jpg".into(),
            index: 0,
            total: Some(1),
        });

        sink.on_event(ProgressEvent::Finished {
            processed: 1,
            skipped: 0,
            rejected: 1,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.finished_counts(), Some((1, 0, 1)));
    }
}
