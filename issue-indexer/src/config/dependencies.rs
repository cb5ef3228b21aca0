//! Dependency initialization and wiring for the issue indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::{IndexerType, Settings};
use crate::IndexingError;
use issue_indexer_repository::{Indexer, SearchIndexer};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured indexer backend, shared by every caller.
    pub indexer: Arc<dyn Indexer>,
}

impl Dependencies {
    /// Build the backend selected by `settings`.
    ///
    /// No request is made here; the index is created by `Indexer::init`.
    /// Must be called from within a tokio runtime, since the backend starts
    /// its recovery prober on construction.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If the backend cannot be constructed
    pub fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            indexer_type = ?settings.indexer_type,
            url = %settings.url,
            index = %settings.indexer.index_name,
            "Initializing dependencies"
        );

        let indexer: Arc<dyn Indexer> = match settings.indexer_type {
            IndexerType::OpenSearch => {
                Arc::new(SearchIndexer::connect(&settings.url, settings.indexer.clone())?)
            }
        };

        Ok(Self { indexer })
    }
}
