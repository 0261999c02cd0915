//! Ingestion pipeline: batching, per-archive workers, and directory coordination.

pub mod batch;
pub mod coordinator;
pub mod progress;
#[cfg(test)]
pub(crate) mod test_support;
pub mod types;
pub mod worker;

pub use batch::submit_in_batches;
pub use coordinator::{ARCHIVE_SUFFIX, IndexCoordinator, discover_archives};
pub use progress::{ProgressTracker, ProgressUpdate, format_duration};
pub use types::{FileError, FileOutcome, RunError, RunSummary, SubmitError, SubmitOutcome};
pub use worker::{FileWorker, decompress_archive, relocate};
