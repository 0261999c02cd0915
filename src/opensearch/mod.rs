//! OpenSearch integration: index setup and bulk writes.

pub mod client;
mod payload;
pub mod types;

pub use client::{DocumentIndex, OpenSearchService};
pub use types::{IndexSummary, OpenSearchError};
