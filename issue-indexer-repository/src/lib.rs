//! # Issue Indexer Repository
//!
//! This crate provides the `Indexer` contract for issue search backends,
//! the availability monitor that tracks whether the remote engine is
//! reachable, and `SearchIndexer`, a backend built on any
//! `SearchEngineClient`. A concrete client for OpenSearch is included.

pub mod availability;
pub mod config;
pub mod errors;
pub mod indexer;
pub mod interfaces;
pub mod opensearch;
pub mod types;

#[cfg(test)]
mod testing;

pub use availability::{AvailabilityCallback, AvailabilityMonitor};
pub use config::IndexerConfig;
pub use errors::{SearchError, SearchIndexError};
pub use indexer::SearchIndexer;
pub use interfaces::{Indexer, SearchEngineClient};
pub use opensearch::OpenSearchClient;
