//! Indexer trait definition.
//!
//! This module defines the capability set every issue search backend must
//! provide, so callers stay agnostic to which engine backs search.

use async_trait::async_trait;

use crate::availability::AvailabilityCallback;
use crate::errors::SearchIndexError;
use issue_indexer_shared::{IndexerData, SearchResult};

/// Abstracts the underlying issue search backend.
///
/// Backends are selected at startup and handed to callers as
/// `Arc<dyn Indexer>`. All fallible methods return
/// `Result<T, SearchIndexError>`; connectivity failures are always returned
/// to the caller, who decides whether to buffer or surface them.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Ensure the index exists, creating it with the issue mapping if absent.
    ///
    /// Idempotent: a second call when the index already exists does nothing.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index already existed
    /// * `Ok(false)` - If it was created by this call
    /// * `Err(SearchIndexError)` - If the check or creation failed
    async fn init(&self) -> Result<bool, SearchIndexError>;

    /// Insert or replace the given issues. An empty slice is a no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every issue was indexed
    /// * `Err(SearchIndexError)` - If any issue failed; the error names what failed
    async fn index(&self, issues: &[IndexerData]) -> Result<(), SearchIndexError>;

    /// Remove issues by ID. IDs that are not indexed are ignored.
    async fn delete(&self, ids: &[i64]) -> Result<(), SearchIndexError>;

    /// Search issue titles, bodies and comments for `keyword`.
    ///
    /// # Arguments
    ///
    /// * `keyword` - Free text, matched as terms rather than query syntax
    /// * `repo_ids` - Restrict hits to these repositories; empty means all
    /// * `limit` - Page size
    /// * `offset` - Number of hits to skip
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - Hits ascending by ID and the total before pagination
    /// * `Err(SearchIndexError)` - If the query was invalid or failed
    async fn search(
        &self,
        keyword: &str,
        repo_ids: &[i64],
        limit: usize,
        offset: usize,
    ) -> Result<SearchResult, SearchIndexError>;

    /// Current availability. Never performs I/O.
    fn ping(&self) -> bool;

    /// Register the observer notified once per availability transition.
    /// Replaces any previously registered observer.
    fn set_availability_change_callback(&self, callback: AvailabilityCallback);

    /// Stop background work. Callers must not issue new requests afterwards.
    fn close(&self);
}
