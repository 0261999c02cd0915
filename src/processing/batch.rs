//! Fixed-size bulk submission of record sets.

use crate::opensearch::DocumentIndex;
use crate::processing::types::{SubmitError, SubmitOutcome};
use crate::pubmed::PubmedRecord;

/// Submit `records` to `index` in contiguous groups of `batch_size`, one bulk call per group.
///
/// Batches go out strictly in order and the first failure stops submission; earlier batches
/// stay written. A `batch_size` of zero is treated as one.
pub async fn submit_in_batches(
    client: &dyn DocumentIndex,
    index: &str,
    records: &[PubmedRecord],
    batch_size: usize,
) -> Result<SubmitOutcome, SubmitError> {
    let batch_size = batch_size.max(1);
    let batches = records.len().div_ceil(batch_size);
    let mut outcome = SubmitOutcome::default();

    for (position, batch) in records.chunks(batch_size).enumerate() {
        let summary = client
            .bulk_index(index, batch)
            .await
            .map_err(|source| SubmitError {
                batch: position + 1,
                batches,
                indexed: outcome.indexed(),
                source,
            })?;
        outcome.batches += 1;
        outcome.created += summary.created;
        outcome.updated += summary.updated;
        tracing::trace!(
            index,
            batch = position + 1,
            batches,
            size = batch.len(),
            "Batch submitted"
        );
    }

    Ok(outcome)
}
