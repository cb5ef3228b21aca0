//! Search indexer implementation.
//!
//! `SearchIndexer` implements the `Indexer` contract on top of any
//! `SearchEngineClient`. It validates input, picks single or bulk requests,
//! bounds every request with a deadline, decodes hits, and feeds
//! connectivity failures into the availability monitor.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::availability::{spawn_prober, AvailabilityCallback, AvailabilityMonitor};
use crate::config::IndexerConfig;
use crate::errors::{SearchError, SearchIndexError};
use crate::interfaces::{Indexer, SearchEngineClient};
use crate::opensearch::{get_index_settings, OpenSearchClient};
use crate::types::{BulkOperation, SearchHits};
use issue_indexer_shared::{IndexerData, Match, SearchQuery, SearchResult};

/// Document key under which an issue is stored.
///
/// The decimal form of the ID is part of the persisted index layout.
pub fn document_key(id: i64) -> String {
    id.to_string()
}

/// Recover an issue ID from a document key.
pub fn parse_document_key(key: &str) -> Result<i64, SearchIndexError> {
    key.parse::<i64>()
        .map_err(|e| SearchIndexError::decode(format!("Invalid document key {:?}: {}", key, e)))
}

/// Issue indexer backed by a remote search engine.
///
/// Must be created inside a tokio runtime: construction spawns the
/// availability prober, which runs until [`Indexer::close`] is called or the
/// indexer is dropped.
///
/// # Example
///
/// ```ignore
/// let config = IndexerConfig::new("issues");
/// let indexer = SearchIndexer::connect("http://localhost:9200", config)?;
/// indexer.init().await?;
/// indexer.index(&[IndexerData::new(1, 10).with_title("fix bug")]).await?;
/// let result = indexer.search("bug", &[], 10, 0).await?;
/// ```
pub struct SearchIndexer {
    client: Arc<dyn SearchEngineClient>,
    config: IndexerConfig,
    monitor: Arc<AvailabilityMonitor>,
    shutdown_tx: Mutex<Option<broadcast::Sender<()>>>,
}

impl SearchIndexer {
    /// Create an indexer over an existing engine client.
    pub fn new(client: Arc<dyn SearchEngineClient>, config: IndexerConfig) -> Self {
        let monitor = Arc::new(AvailabilityMonitor::new());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        spawn_prober(
            client.clone(),
            monitor.clone(),
            config.poll_interval,
            config.request_timeout,
            shutdown_rx,
        );

        Self {
            client,
            config,
            monitor,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
        }
    }

    /// Create an indexer talking to the OpenSearch node at `url`.
    pub fn connect(url: &str, config: IndexerConfig) -> Result<Self, SearchIndexError> {
        let client = OpenSearchClient::new(url, &config.index_name, config.request_timeout)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Await a client call under the request deadline. Elapsing counts as
    /// a connectivity failure.
    async fn with_deadline<T, F>(&self, request: F) -> Result<T, SearchError>
    where
        F: Future<Output = Result<T, SearchError>>,
    {
        match timeout(self.config.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::connection(format!(
                "request timed out after {:?}",
                self.config.request_timeout
            ))),
        }
    }

    /// Like `with_deadline`, reporting connectivity failures to the monitor.
    async fn call<T, F>(&self, request: F) -> Result<T, SearchIndexError>
    where
        F: Future<Output = Result<T, SearchError>>,
    {
        self.with_deadline(request)
            .await
            .map_err(|e| self.check_error(e))
    }

    fn check_error(&self, err: SearchError) -> SearchIndexError {
        if err.is_connectivity() && self.monitor.mark_unavailable() {
            warn!(error = %err, "Search engine became unavailable");
        }
        err.into()
    }

    fn validate_issues(issues: &[IndexerData]) -> Result<(), SearchIndexError> {
        for issue in issues {
            if issue.id <= 0 {
                return Err(SearchIndexError::validation(format!(
                    "issue id must be positive, got {}",
                    issue.id
                )));
            }
            if issue.repo_id <= 0 {
                return Err(SearchIndexError::validation(format!(
                    "repo_id must be positive, got {} for issue {}",
                    issue.repo_id, issue.id
                )));
            }
        }
        Ok(())
    }

    fn validate_ids(ids: &[i64]) -> Result<(), SearchIndexError> {
        match ids.iter().find(|id| **id <= 0) {
            Some(id) => Err(SearchIndexError::validation(format!(
                "issue id must be positive, got {}",
                id
            ))),
            None => Ok(()),
        }
    }

    fn validate_query(query: &SearchQuery) -> Result<(), SearchIndexError> {
        if query.keyword.trim().is_empty() {
            return Err(SearchIndexError::validation("keyword is required"));
        }
        if query.limit == 0 {
            return Err(SearchIndexError::validation("limit must be positive"));
        }
        if let Some(id) = query.repo_ids.iter().find(|id| **id <= 0) {
            return Err(SearchIndexError::validation(format!(
                "repo id must be positive, got {}",
                id
            )));
        }
        Ok(())
    }

    /// Submit bulk operations in chunks of at most `max_batch_size`.
    async fn submit_bulk(&self, operations: Vec<BulkOperation<'_>>) -> Result<(), SearchIndexError> {
        let chunk_size = self.config.chunk_size(operations.len());
        for chunk in operations.chunks(chunk_size) {
            self.call(self.client.bulk(chunk)).await?;
            debug!(count = chunk.len(), "Bulk request applied");
        }
        Ok(())
    }

    /// Turn raw hits into matches, skipping keys that are not issue IDs.
    fn decode_hits(hits: SearchHits) -> SearchResult {
        let matches = hits
            .keys
            .iter()
            .filter_map(|key| {
                let decoded = match key {
                    Some(key) => parse_document_key(key),
                    None => Err(SearchIndexError::decode("Search hit has no document key")),
                };
                match decoded {
                    Ok(id) => Some(Match { id }),
                    Err(e) => {
                        warn!(error = %e, "Skipping search hit");
                        None
                    }
                }
            })
            .collect();

        SearchResult {
            total: hits.total,
            hits: matches,
        }
    }
}

impl Drop for SearchIndexer {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl Indexer for SearchIndexer {
    #[instrument(skip(self), fields(index = %self.config.index_name))]
    async fn init(&self) -> Result<bool, SearchIndexError> {
        if self.call(self.client.index_exists()).await? {
            debug!("Index already exists");
            return Ok(true);
        }

        let mapping = get_index_settings();
        match self.with_deadline(self.client.create_index(&mapping)).await {
            Ok(()) => {
                info!("Created issue index");
                Ok(false)
            }
            Err(SearchError::IndexAlreadyExists(_)) => {
                debug!("Index created concurrently");
                Ok(true)
            }
            Err(e) => Err(self.check_error(e)),
        }
    }

    #[instrument(skip(self, issues), fields(count = issues.len()))]
    async fn index(&self, issues: &[IndexerData]) -> Result<(), SearchIndexError> {
        Self::validate_issues(issues)?;

        match issues {
            [] => Ok(()),
            [issue] => {
                let key = document_key(issue.id);
                self.call(self.client.index_document(&key, issue)).await?;
                debug!(key = %key, "Issue indexed");
                Ok(())
            }
            _ => {
                let operations = issues
                    .iter()
                    .map(|issue| BulkOperation::Index {
                        key: document_key(issue.id),
                        data: issue,
                    })
                    .collect();
                self.submit_bulk(operations).await
            }
        }
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete(&self, ids: &[i64]) -> Result<(), SearchIndexError> {
        Self::validate_ids(ids)?;

        match ids {
            [] => Ok(()),
            [id] => {
                let key = document_key(*id);
                self.call(self.client.delete_document(&key)).await?;
                debug!(key = %key, "Issue deleted");
                Ok(())
            }
            _ => {
                let operations = ids
                    .iter()
                    .map(|id| BulkOperation::Delete {
                        key: document_key(*id),
                    })
                    .collect();
                self.submit_bulk(operations).await
            }
        }
    }

    #[instrument(skip(self, repo_ids), fields(repos = repo_ids.len()))]
    async fn search(
        &self,
        keyword: &str,
        repo_ids: &[i64],
        limit: usize,
        offset: usize,
    ) -> Result<SearchResult, SearchIndexError> {
        let query = SearchQuery::new(keyword, limit, offset).in_repos(repo_ids);
        Self::validate_query(&query)?;

        let hits = self.call(self.client.search(&query)).await?;
        let result = Self::decode_hits(hits);
        debug!(total = result.total, returned = result.hits.len(), "Search completed");
        Ok(result)
    }

    fn ping(&self) -> bool {
        self.monitor.is_available()
    }

    fn set_availability_change_callback(&self, callback: AvailabilityCallback) {
        self.monitor.set_callback(callback);
    }

    fn close(&self) {
        let sender = self
            .shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            // No receiver means the prober already exited.
            let _ = sender.send(());
            debug!("Search indexer closed");
        }
    }
}
