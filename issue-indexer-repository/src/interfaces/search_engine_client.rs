//! Search engine client trait definition.
//!
//! This module defines what the indexer needs from a remote search engine,
//! allowing for different transports (OpenSearch, Elasticsearch, test doubles).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{BulkOperation, SearchHits};
use issue_indexer_shared::{IndexerData, SearchQuery};

/// Abstract interface for search engine operations.
///
/// An implementation is bound to one index. Documents are addressed by
/// their document key, which the caller derives from the record ID.
///
/// # Error Handling
///
/// Implementations must report an unreachable engine as
/// [`SearchError::ConnectionError`] and everything else (rejected requests,
/// missing index, malformed responses) as one of the other variants. Only
/// the former affects availability.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Check whether the index exists.
    async fn index_exists(&self) -> Result<bool, SearchError>;

    /// Create the index with the given settings and mappings.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the engine acknowledged the creation
    /// * `Err(SearchError::IndexAlreadyExists)` - If another creator got there first
    /// * `Err(SearchError::IndexCreationError)` - If creation was rejected or not acknowledged
    async fn create_index(&self, mapping: &Value) -> Result<(), SearchError>;

    /// Insert or replace a single document.
    async fn index_document(&self, key: &str, data: &IndexerData) -> Result<(), SearchError>;

    /// Delete a single document. A missing document is not an error.
    async fn delete_document(&self, key: &str) -> Result<(), SearchError>;

    /// Submit several index/delete sub-operations in one round trip.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every item was applied (deleting a missing document counts as applied)
    /// * `Err(SearchError::BulkIndexError)` - If any item was rejected, naming the failed keys
    async fn bulk(&self, operations: &[BulkOperation<'_>]) -> Result<(), SearchError>;

    /// Run a keyword query with repository filter, ascending ID order and
    /// the query's offset/limit window.
    async fn search(&self, query: &SearchQuery) -> Result<SearchHits, SearchError>;

    /// Lightweight liveness probe.
    ///
    /// A reachable cluster in `red` health still counts as down; only
    /// `green` and `yellow` report recovery.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the cluster health is `green` or `yellow`
    /// * `Ok(false)` - If the engine answered but reports `red` (or no status)
    /// * `Err(SearchError)` - If the probe could not be executed
    async fn health_check(&self) -> Result<bool, SearchError>;
}
