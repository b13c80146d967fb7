//! Sequential batch processing over heterogeneous input files.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::compressors::ReducerDispatch;
use super::types::{BatchReport, BatchStatus, InputFile, ReduceOutcome, ResultPair};

#[derive(Default)]
struct StateInner {
    status: BatchStatus,
    results: Vec<ResultPair>,
    report: Option<BatchReport>,
    generation: u64,
}

/// The single owned container for batch state. Only the batch processor
/// writes to it; everything else gets read-only views.
///
/// Each batch run is stamped with a generation number when it starts.
/// A completion whose generation is no longer current is discarded, so
/// overlapping triggers can never publish a stale result set over a
/// newer one.
pub struct BatchState {
    inner: Mutex<StateInner>,
}

impl Default for BatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StateInner::default()),
        }
    }

    pub fn status(&self) -> BatchStatus {
        self.lock().status
    }

    /// The result sequence published by the most recently completed batch
    pub fn results(&self) -> Vec<ResultPair> {
        self.lock().results.clone()
    }

    pub fn report(&self) -> Option<BatchReport> {
        self.lock().report.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StateInner> {
        // Lock poisoning only happens if a writer panicked mid-update;
        // the state is plain data, so continue with what is there.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin_batch(&self) -> u64 {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.status = BatchStatus::Processing;
        inner.generation
    }

    /// Publish a completed batch. Returns false when the completion is
    /// stale (a newer batch started after this one).
    fn publish(&self, generation: u64, results: Vec<ResultPair>, report: BatchReport) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        inner.results = results;
        inner.report = Some(report);
        inner.status = BatchStatus::Idle;
        true
    }
}

/// Processes one batch of input files, dispatching each to the matching
/// reducer and accumulating the successful pairs.
pub struct BatchProcessor {
    dispatch: ReducerDispatch,
    state: Arc<BatchState>,
}

impl BatchProcessor {
    pub fn new(state: Arc<BatchState>) -> Self {
        Self::with_dispatch(ReducerDispatch::new(), state)
    }

    pub fn with_dispatch(dispatch: ReducerDispatch, state: Arc<BatchState>) -> Self {
        Self { dispatch, state }
    }

    pub fn state(&self) -> Arc<BatchState> {
        self.state.clone()
    }

    /// Visit each file in input order, strictly sequentially, and collect
    /// a result pair for every successful reduction. Skipped and failed
    /// files are excluded without aborting the batch.
    ///
    /// On completion the result sequence replaces the previously published
    /// one in full, unless a newer batch has started in the meantime.
    pub async fn process_batch(&self, files: Vec<InputFile>) -> Vec<ResultPair> {
        let generation = self.state.begin_batch();
        let started = Instant::now();

        let mut results = Vec::with_capacity(files.len());
        let mut report = BatchReport {
            total_files: files.len(),
            ..Default::default()
        };

        for file in files {
            match self.dispatch.reduce(&file).await {
                ReduceOutcome::Reduced(reduced) => {
                    report.reduced_count += 1;
                    report.original_bytes += file.size() as u64;
                    report.reduced_bytes += reduced.size() as u64;
                    results.push(ResultPair {
                        original: file,
                        reduced,
                    });
                }
                ReduceOutcome::Skipped { .. } => report.skipped_count += 1,
                ReduceOutcome::Failed(_) => report.failed_count += 1,
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "Batch complete: {} reduced, {} skipped, {} failed of {} ({} -> {} bytes, {} ms)",
            report.reduced_count,
            report.skipped_count,
            report.failed_count,
            report.total_files,
            report.original_bytes,
            report.reduced_bytes,
            report.duration_ms
        );

        if !self.state.publish(generation, results.clone(), report) {
            log::debug!("Discarding stale completion for batch generation {}", generation);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::fixtures::{pdf_bytes, png_bytes};
    use crate::compression::{package, trigger};

    fn batch_setup() -> (Arc<BatchState>, BatchProcessor) {
        let state = Arc::new(BatchState::new());
        let processor = BatchProcessor::new(state.clone());
        (state, processor)
    }

    #[tokio::test]
    async fn test_mixed_batch_preserves_order_and_excludes_failures() {
        let (state, processor) = batch_setup();
        let files = vec![
            InputFile::new("a.png", "image/png", png_bytes(32, 32)),
            InputFile::new("broken.png", "image/png", vec![0u8; 8]),
            InputFile::new("notes.txt", "text/plain", b"plain text".to_vec()),
            InputFile::new("b.pdf", "application/pdf", pdf_bytes()),
        ];

        let results = processor.process_batch(files).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original.name, "a.png");
        assert_eq!(results[1].original.name, "b.pdf");
        assert_eq!(state.status(), BatchStatus::Idle);

        let report = state.report().unwrap();
        assert_eq!(report.total_files, 4);
        assert_eq!(report.reduced_count, 2);
        assert_eq!(report.skipped_count, 1);
        assert_eq!(report.failed_count, 1);
    }

    #[tokio::test]
    async fn test_unsupported_only_batch_yields_empty_results() {
        let (state, processor) = batch_setup();
        let files = vec![InputFile::new(
            "notes.txt",
            "text/plain",
            b"hello".to_vec(),
        )];

        let results = processor.process_batch(files).await;

        assert!(results.is_empty());
        assert!(state.results().is_empty());
        assert_eq!(state.status(), BatchStatus::Idle);
    }

    #[tokio::test]
    async fn test_retrigger_replaces_previous_results() {
        let (state, processor) = batch_setup();

        let first = vec![
            InputFile::new("a.png", "image/png", png_bytes(16, 16)),
            InputFile::new("b.png", "image/png", png_bytes(16, 16)),
        ];
        processor.process_batch(first).await;
        assert_eq!(state.results().len(), 2);

        let second = vec![InputFile::new("c.pdf", "application/pdf", pdf_bytes())];
        processor.process_batch(second).await;

        let published = state.results();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].original.name, "c.pdf");
    }

    #[test]
    fn test_status_transitions_and_stale_publication() {
        let state = BatchState::new();
        assert_eq!(state.status(), BatchStatus::Idle);

        let first = state.begin_batch();
        assert_eq!(state.status(), BatchStatus::Processing);

        // A second trigger supersedes the first
        let second = state.begin_batch();
        assert!(!state.publish(first, vec![], BatchReport::default()));
        // Stale completion leaves the newer batch's status untouched
        assert_eq!(state.status(), BatchStatus::Processing);
        assert!(state.report().is_none());

        assert!(state.publish(second, vec![], BatchReport::default()));
        assert_eq!(state.status(), BatchStatus::Idle);
        assert!(state.report().is_some());
    }

    #[tokio::test]
    async fn test_status_is_processing_for_the_whole_batch_span() {
        use crate::compression::compressors::Compressor;
        use crate::compression::types::ReducedPayload;
        use crate::errors::DomainResult;
        use async_trait::async_trait;

        // Records the shared status every time a reduction runs, so the
        // status can be observed from inside a real process_batch span.
        struct StatusRecorder {
            state: Arc<BatchState>,
            seen: Arc<Mutex<Vec<BatchStatus>>>,
            fail_on: &'static str,
        }

        #[async_trait]
        impl Compressor for StatusRecorder {
            fn can_handle(&self, mime_type: &str) -> bool {
                mime_type.starts_with("image/")
            }

            async fn compress(&self, data: Vec<u8>) -> DomainResult<ReducedPayload> {
                self.seen.lock().unwrap().push(self.state.status());
                if data == self.fail_on.as_bytes() {
                    return Err(crate::errors::DomainError::Image("bad pixels".to_string()));
                }
                Ok(ReducedPayload {
                    data,
                    mime_type: "image/jpeg".to_string(),
                })
            }

            fn name(&self) -> &'static str {
                "StatusRecorder"
            }
        }

        let state = Arc::new(BatchState::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let dispatch = ReducerDispatch::with_compressors(vec![Box::new(StatusRecorder {
            state: state.clone(),
            seen: seen.clone(),
            fail_on: "corrupt",
        })]);
        let processor = BatchProcessor::with_dispatch(dispatch, state.clone());

        let files = vec![
            InputFile::new("a.jpg", "image/jpeg", b"fine".to_vec()),
            InputFile::new("b.jpg", "image/jpeg", b"corrupt".to_vec()),
            InputFile::new("c.jpg", "image/jpeg", b"fine".to_vec()),
        ];
        let results = processor.process_batch(files).await;

        // Every reduction attempt, including the failing one, saw the
        // shared status as Processing; it is Idle again only afterwards.
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                BatchStatus::Processing,
                BatchStatus::Processing,
                BatchStatus::Processing
            ]
        );
        assert_eq!(results.len(), 2);
        assert_eq!(state.status(), BatchStatus::Idle);
    }

    #[tokio::test]
    async fn test_full_pipeline_saves_archive() {
        let (_, processor) = batch_setup();
        let files = vec![
            InputFile::new("photo.png", "image/png", png_bytes(2000, 1500)),
            InputFile::new("doc.pdf", "application/pdf", pdf_bytes()),
        ];

        let results = processor.process_batch(files).await;
        let unit = package(&results).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let saved = trigger(unit, dir.path()).unwrap().unwrap();
        assert_eq!(saved.file_name().unwrap(), "compressed-files.zip");

        let archive_bytes = std::fs::read(&saved).unwrap();
        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(archive_bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("compressed-photo.png").is_ok());
        assert!(archive.by_name("compressed-doc.pdf").is_ok());
    }
}
