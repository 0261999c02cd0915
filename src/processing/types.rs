//! Core data types and error definitions for the ingestion pipeline.

use crate::{metrics::MetricsSnapshot, opensearch::OpenSearchError, pubmed::ExtractError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure while submitting a record set in batches.
#[derive(Debug, Error)]
#[error("Bulk request {batch} of {batches} failed after {indexed} records were written: {source}")]
pub struct SubmitError {
    /// One-based number of the failing batch.
    pub batch: usize,
    /// Total number of batches for the record set.
    pub batches: usize,
    /// Records already written by earlier batches.
    pub indexed: usize,
    /// Underlying index error.
    #[source]
    pub source: OpenSearchError,
}

/// Errors that fail a single archive.
#[derive(Debug, Error)]
pub enum FileError {
    /// The archive could not be read or decompressed.
    #[error("Failed to decompress {path}: {source}")]
    Decompress {
        /// Archive being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The decompressed document did not yield a valid record set.
    #[error("Failed to extract records: {0}")]
    Extract(#[from] ExtractError),
    /// The index rejected a batch.
    #[error("Failed to index records: {0}")]
    Indexing(#[from] SubmitError),
    /// The archive was indexed but could not be moved to the processed directory.
    #[error("Failed to move {from} to {to}: {source}")]
    Relocate {
        /// Original archive path.
        from: PathBuf,
        /// Intended destination.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The worker task panicked or was cancelled.
    #[error("Worker task aborted: {0}")]
    Task(String),
}

/// Result of submitting one record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Number of bulk requests issued.
    pub batches: usize,
    /// Documents created by the index.
    pub created: usize,
    /// Documents overwritten in place.
    pub updated: usize,
}

impl SubmitOutcome {
    /// Total documents written.
    pub fn indexed(&self) -> usize {
        self.created + self.updated
    }
}

/// Result of fully processing one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Records extracted from the archive.
    pub records: usize,
    /// Bulk submission counters.
    pub submitted: SubmitOutcome,
    /// Where the archive now lives.
    pub processed_path: PathBuf,
}

/// Totals reported when a run finishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Eligible archives discovered.
    pub total_files: usize,
    /// Archives whose processing finished, successfully or not.
    pub completed_files: usize,
    /// Success/failure split and record counters.
    pub metrics: MetricsSnapshot,
    /// Wall-clock time for the run.
    pub elapsed: Duration,
}

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum RunError {
    /// The source directory could not be listed.
    #[error("Failed to list archives in {path}: {source}")]
    Discover {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying traversal error.
        #[source]
        source: walkdir::Error,
    },
    /// The processed directory could not be created.
    #[error("Failed to create processed directory {path}: {source}")]
    ProcessedDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
