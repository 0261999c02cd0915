#![deny(missing_docs)]

//! Core library for the PubMed OpenSearch indexer.

/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Per-run ingestion counters.
pub mod metrics;
/// OpenSearch index integration.
pub mod opensearch;
/// Archive ingestion pipeline.
pub mod processing;
/// PubMed XML record extraction.
pub mod pubmed;
