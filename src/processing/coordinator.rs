//! Directory-level orchestration: discovery, bounded dispatch, and progress reporting.

use crate::config::Config;
use crate::metrics::RunMetrics;
use crate::opensearch::DocumentIndex;
use crate::processing::progress::{ProgressTracker, format_duration};
use crate::processing::types::{FileError, FileOutcome, RunError, RunSummary};
use crate::processing::worker::FileWorker;
use futures_util::{StreamExt, stream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;
use walkdir::WalkDir;

/// File name suffix of eligible archives.
pub const ARCHIVE_SUFFIX: &str = ".xml.gz";

/// Runs [`FileWorker`]s over every archive in a directory with a bounded pool.
///
/// The coordinator owns the index client and hands it to the worker; progress and metrics are
/// only updated from the completion loop in [`IndexCoordinator::run`].
pub struct IndexCoordinator {
    client: Arc<dyn DocumentIndex>,
    worker: Arc<FileWorker>,
    index_name: String,
    source_dir: PathBuf,
    processed_dir: PathBuf,
    worker_count: usize,
}

impl IndexCoordinator {
    /// Build a coordinator from the run settings in `config`.
    pub fn new(client: Arc<dyn DocumentIndex>, config: &Config) -> Self {
        let worker = FileWorker::new(
            Arc::clone(&client),
            config.index_name.clone(),
            config.processed_dir.clone(),
            config.batch_size,
        );
        Self {
            client,
            worker: Arc::new(worker),
            index_name: config.index_name.clone(),
            source_dir: config.source_dir.clone(),
            processed_dir: config.processed_dir.clone(),
            worker_count: config.worker_count.max(1),
        }
    }

    /// Best-effort index creation. Failures are logged and the run may proceed.
    pub async fn prepare_index(&self) -> bool {
        match self.client.ensure_index(&self.index_name).await {
            Ok(true) => {
                tracing::info!(index = %self.index_name, "Created index");
                true
            }
            Ok(false) => {
                tracing::info!(index = %self.index_name, "Index already present");
                true
            }
            Err(error) => {
                tracing::warn!(
                    index = %self.index_name,
                    error = %error,
                    details = ?error,
                    "Error creating index; continuing"
                );
                false
            }
        }
    }

    /// Process every eligible archive, returning once all of them have been attempted.
    pub async fn run(&self) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        let archives = discover_archives(&self.source_dir)?;
        tokio::fs::create_dir_all(&self.processed_dir)
            .await
            .map_err(|source| RunError::ProcessedDir {
                path: self.processed_dir.clone(),
                source,
            })?;

        let total = archives.len();
        let mut progress = ProgressTracker::starting_at(total, started);
        let metrics = RunMetrics::new();
        tracing::info!(
            source = %self.source_dir.display(),
            processed = %self.processed_dir.display(),
            index = %self.index_name,
            files = total,
            workers = self.worker_count,
            started_at = %current_timestamp_rfc3339(),
            "Starting indexing run"
        );

        if total == 0 {
            tracing::info!(source = %self.source_dir.display(), "No archives to index");
        }

        let mut completions = stream::iter(archives)
            .map(|path| {
                let worker = Arc::clone(&self.worker);
                async move {
                    let task_path = path.clone();
                    let result = tokio::spawn(async move { worker.process(&task_path).await })
                        .await
                        .unwrap_or_else(|err| Err(FileError::Task(err.to_string())));
                    (path, result)
                }
            })
            .buffer_unordered(self.worker_count);

        while let Some((path, result)) = completions.next().await {
            record_completion(&mut progress, &metrics, &path, result);
        }

        let elapsed = progress.elapsed();
        let metrics = metrics.snapshot();
        tracing::info!(
            files = total,
            succeeded = metrics.files_succeeded,
            failed = metrics.files_failed,
            records = metrics.records_indexed,
            batches = metrics.batches_submitted,
            "Indexing complete. Total time: {}",
            format_duration(elapsed)
        );

        Ok(RunSummary {
            total_files: total,
            completed_files: progress.completed(),
            metrics,
            elapsed,
        })
    }
}

/// List eligible archives directly inside `dir`, sorted by file name.
pub fn discover_archives(dir: &Path) -> Result<Vec<PathBuf>, RunError> {
    let mut archives = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| RunError::Discover {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(ARCHIVE_SUFFIX) {
            archives.push(entry.into_path());
        }
    }
    archives.sort();
    Ok(archives)
}

fn record_completion(
    progress: &mut ProgressTracker,
    metrics: &RunMetrics,
    path: &Path,
    result: Result<FileOutcome, FileError>,
) {
    let name = display_name(path);
    match &result {
        Ok(outcome) => {
            metrics.record_success(
                outcome.submitted.indexed() as u64,
                outcome.submitted.batches as u64,
            );
        }
        Err(error) => {
            metrics.record_failure();
            tracing::error!(
                file = %path.display(),
                error = %error,
                details = ?error,
                "Error processing file {name}"
            );
        }
    }

    let update = progress.record_completion();
    tracing::info!(
        file = %name,
        succeeded = result.is_ok(),
        completed = update.completed,
        total = update.total,
        "Completed indexing {name}. Progress: {:.2}%. Estimated time left: {}",
        update.percent,
        format_duration(update.remaining)
    );
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opensearch::{IndexSummary, OpenSearchError};
    use crate::processing::test_support::{MemoryIndex, article_set_xml, write_archive};
    use crate::pubmed::PubmedRecord;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(dir: &TempDir, workers: usize) -> Config {
        Config {
            source_dir: dir.path().to_path_buf(),
            processed_dir: dir.path().join("processed"),
            worker_count: workers,
            batch_size: 50,
            ..Config::default()
        }
    }

    #[test]
    fn discovers_only_top_level_gzipped_xml() {
        let dir = TempDir::new().expect("tempdir");
        write_archive(dir.path(), "b.xml.gz", "<PubmedArticleSet/>");
        write_archive(dir.path(), "a.xml.gz", "<PubmedArticleSet/>");
        std::fs::write(dir.path().join("notes.txt"), "ignore").expect("write");
        std::fs::write(dir.path().join("a.xml.gz.md5"), "ignore").expect("write");
        let nested = dir.path().join("processed");
        std::fs::create_dir(&nested).expect("nested");
        write_archive(&nested, "old.xml.gz", "<PubmedArticleSet/>");

        let found: Vec<String> = discover_archives(dir.path())
            .expect("discover")
            .iter()
            .map(|path| display_name(path))
            .collect();
        assert_eq!(found, vec!["a.xml.gz", "b.xml.gz"]);
    }

    #[test]
    fn missing_source_directory_is_a_run_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = discover_archives(&dir.path().join("absent")).expect_err("missing dir");
        assert!(matches!(err, RunError::Discover { .. }));
    }

    #[tokio::test]
    async fn failed_archives_do_not_stop_the_run() {
        let dir = TempDir::new().expect("tempdir");
        for n in 0..5u32 {
            let first = n * 10 + 1;
            write_archive(
                dir.path(),
                &format!("pubmed{n:02}.xml.gz"),
                &article_set_xml(first..=first + 9),
            );
        }
        std::fs::write(dir.path().join("pubmed99.xml.gz"), b"truncated").expect("write");

        let index = Arc::new(MemoryIndex::default());
        let coordinator = IndexCoordinator::new(index.clone(), &config(&dir, 3));
        let summary = coordinator.run().await.expect("run");

        assert_eq!(summary.total_files, 6);
        assert_eq!(summary.completed_files, 6);
        assert_eq!(summary.metrics.files_succeeded, 5);
        assert_eq!(summary.metrics.files_failed, 1);
        assert_eq!(summary.metrics.records_indexed, 50);
        assert_eq!(index.document_count(), 50);
        assert!(dir.path().join("pubmed99.xml.gz").exists());
        assert!(dir.path().join("processed/pubmed00.xml.gz").exists());
        assert!(!dir.path().join("pubmed00.xml.gz").exists());
    }

    #[tokio::test]
    async fn empty_directory_completes_immediately() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = IndexCoordinator::new(Arc::new(MemoryIndex::default()), &config(&dir, 3));
        let summary = coordinator.run().await.expect("run");
        assert_eq!(summary.total_files, 0);
        assert_eq!(summary.completed_files, 0);
        assert!(dir.path().join("processed").is_dir());
    }

    #[derive(Default)]
    struct ConcurrencyProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl DocumentIndex for ConcurrencyProbe {
        async fn ensure_index(&self, _index: &str) -> Result<bool, OpenSearchError> {
            Ok(false)
        }

        async fn bulk_index(
            &self,
            _index: &str,
            records: &[PubmedRecord],
        ) -> Result<IndexSummary, OpenSearchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(25)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(IndexSummary {
                created: records.len(),
                updated: 0,
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pool_size_bounds_concurrent_archives() {
        let dir = TempDir::new().expect("tempdir");
        for n in 0..9u32 {
            write_archive(
                dir.path(),
                &format!("batch{n}.xml.gz"),
                &article_set_xml(n * 2 + 1..=n * 2 + 2),
            );
        }

        let probe = Arc::new(ConcurrencyProbe::default());
        let coordinator = IndexCoordinator::new(probe.clone(), &config(&dir, 3));
        let summary = coordinator.run().await.expect("run");

        assert_eq!(summary.completed_files, 9);
        assert_eq!(summary.metrics.files_succeeded, 9);
        let peak = probe.peak.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak concurrency was {peak}");
    }

    struct UnreachableIndex;

    #[async_trait]
    impl DocumentIndex for UnreachableIndex {
        async fn ensure_index(&self, _index: &str) -> Result<bool, OpenSearchError> {
            Err(OpenSearchError::InvalidUrl("unreachable".into()))
        }

        async fn bulk_index(
            &self,
            _index: &str,
            _records: &[PubmedRecord],
        ) -> Result<IndexSummary, OpenSearchError> {
            Err(OpenSearchError::InvalidUrl("unreachable".into()))
        }
    }

    #[tokio::test]
    async fn index_setup_failure_is_not_fatal() {
        let dir = TempDir::new().expect("tempdir");
        write_archive(dir.path(), "one.xml.gz", &article_set_xml(1..=3));

        let coordinator = IndexCoordinator::new(Arc::new(UnreachableIndex), &config(&dir, 3));
        assert!(!coordinator.prepare_index().await);

        let summary = coordinator.run().await.expect("run still completes");
        assert_eq!(summary.completed_files, 1);
        assert_eq!(summary.metrics.files_failed, 1);
        assert!(dir.path().join("one.xml.gz").exists());
    }
}
