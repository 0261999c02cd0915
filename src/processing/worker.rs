//! Single-archive pipeline: decompress, extract, submit, relocate.

use crate::opensearch::DocumentIndex;
use crate::processing::batch::submit_in_batches;
use crate::processing::types::{FileError, FileOutcome};
use crate::pubmed::{PubmedRecord, parse_article_set};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Processes one archive at a time against a shared index client.
///
/// Steps run strictly in sequence. The archive is only moved once every batch was accepted,
/// so any failure leaves it in place for the next run.
pub struct FileWorker {
    client: Arc<dyn DocumentIndex>,
    index_name: String,
    processed_dir: PathBuf,
    batch_size: usize,
}

impl FileWorker {
    /// Create a worker writing to `index_name` and relocating into `processed_dir`.
    pub fn new(
        client: Arc<dyn DocumentIndex>,
        index_name: impl Into<String>,
        processed_dir: impl Into<PathBuf>,
        batch_size: usize,
    ) -> Self {
        Self {
            client,
            index_name: index_name.into(),
            processed_dir: processed_dir.into(),
            batch_size,
        }
    }

    /// Fully process the archive at `path`.
    pub async fn process(&self, path: &Path) -> Result<FileOutcome, FileError> {
        tracing::debug!(file = %path.display(), "Processing archive");
        let records = load_records(path).await?;
        let record_count = records.len();

        let submitted = submit_in_batches(
            self.client.as_ref(),
            &self.index_name,
            &records,
            self.batch_size,
        )
        .await?;

        let processed_path = relocate(path, &self.processed_dir).await?;
        tracing::info!(
            file = %path.display(),
            records = record_count,
            batches = submitted.batches,
            "Moved processed file to {}",
            processed_path.display()
        );

        Ok(FileOutcome {
            records: record_count,
            submitted,
            processed_path,
        })
    }
}

/// Read and gunzip an archive into memory.
pub fn decompress_archive(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut xml = Vec::new();
    decoder.read_to_end(&mut xml)?;
    tracing::trace!(file = %path.display(), bytes = xml.len(), "Archive decompressed");
    Ok(xml)
}

async fn load_records(path: &Path) -> Result<Vec<PubmedRecord>, FileError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<Vec<PubmedRecord>, FileError> {
        let xml = decompress_archive(&path).map_err(|source| FileError::Decompress {
            path: path.clone(),
            source,
        })?;
        Ok(parse_article_set(&xml)?)
    })
    .await
    .map_err(|err| FileError::Task(err.to_string()))?
}

/// Move `path` into `processed_dir`, keeping its file name.
///
/// Falls back to copy and delete when the directories live on different filesystems.
pub async fn relocate(path: &Path, processed_dir: &Path) -> Result<PathBuf, FileError> {
    let relocate_error = |to: PathBuf, source: io::Error| FileError::Relocate {
        from: path.to_path_buf(),
        to,
        source,
    };

    let Some(file_name) = path.file_name() else {
        return Err(relocate_error(
            processed_dir.to_path_buf(),
            io::Error::new(io::ErrorKind::InvalidInput, "archive path has no file name"),
        ));
    };
    let target = processed_dir.join(file_name);

    match tokio::fs::rename(path, &target).await {
        Ok(()) => Ok(target),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            tokio::fs::copy(path, &target)
                .await
                .map_err(|source| relocate_error(target.clone(), source))?;
            if let Err(source) = tokio::fs::remove_file(path).await {
                let _ = tokio::fs::remove_file(&target).await;
                return Err(relocate_error(target, source));
            }
            Ok(target)
        }
        Err(source) => Err(relocate_error(target, source)),
    }
}
