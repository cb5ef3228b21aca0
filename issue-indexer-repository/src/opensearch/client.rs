//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    cluster::ClusterHealthParts,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, DeleteParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::{SearchError, SearchIndexError};
use crate::interfaces::SearchEngineClient;
use crate::opensearch::queries::{
    build_bulk_body, build_search_query, parse_bulk_failures, parse_search_hits,
};
use crate::types::{describe_failures, BulkOperation, SearchHits};
use issue_indexer_shared::{IndexerData, SearchQuery};

/// OpenSearch client implementation.
///
/// Bound to a single index. Works against OpenSearch and Elasticsearch 7
/// compatible clusters.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200", "issues", Duration::from_secs(30))?;
/// if !client.index_exists().await? {
///     client.create_index(&get_index_settings()).await?;
/// }
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_name: String,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_name` - The index holding issue documents
    /// * `request_timeout` - Transport-level deadline for every request
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or transport setup fails
    pub fn new(
        url: &str,
        index_name: &str,
        request_timeout: Duration,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::validation(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_name,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_name: index_name.to_string(),
        })
    }

    /// Classify an error returned by `send()`.
    ///
    /// Anything that failed before an HTTP status arrived means the engine
    /// could not be reached.
    fn transport_error(err: opensearch::Error) -> SearchError {
        match err.status_code() {
            Some(status) => SearchError::query(format!("status {}: {}", status, err)),
            None => SearchError::connection(err.to_string()),
        }
    }

    /// Classify a rejected create-index response. The body may not be JSON,
    /// e.g. a proxy error page.
    fn create_failure(&self, status: u16, body: &str) -> SearchError {
        let error_type = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|body| body["error"]["type"].as_str().map(str::to_string));
        if error_type.as_deref() == Some("resource_already_exists_exception") {
            return SearchError::IndexAlreadyExists(self.index_name.clone());
        }

        error!(status = status, body = %body, "Create index request failed");
        SearchError::index_creation(format!(
            "Create index failed with status {}: {}",
            status, body
        ))
    }

    /// Turn a non-success response into an error built by `make_error`.
    async fn check_status(
        response: Response,
        operation: &str,
        make_error: fn(String) -> SearchError,
    ) -> Result<Response, SearchError> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, "{} request failed", operation);
        Err(make_error(format!(
            "{} failed with status {}: {}",
            operation, status, error_body
        )))
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    async fn index_exists(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[self.index_name.as_str()]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchError::query(format!(
                "Index exists check returned status {}",
                status
            ))),
        }
    }

    async fn create_index(&self, mapping: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_name))
            .body(mapping.clone())
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.create_failure(status.as_u16(), &text));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        if !body["acknowledged"].as_bool().unwrap_or(false) {
            return Err(SearchError::index_creation(format!(
                "Creation of index {} was not acknowledged",
                self.index_name
            )));
        }

        info!(index = %self.index_name, "Index created");
        Ok(())
    }

    async fn index_document(&self, key: &str, data: &IndexerData) -> Result<(), SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_name, key))
            .body(data)
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check_status(response, "Index", SearchError::IndexError).await?;

        debug!(key = %key, "Document indexed");
        Ok(())
    }

    async fn delete_document(&self, key: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_name, key))
            .send()
            .await
            .map_err(Self::transport_error)?;

        // 404 is acceptable - document may not exist
        if response.status_code().as_u16() == 404 {
            debug!(key = %key, "Document already absent");
            return Ok(());
        }
        Self::check_status(response, "Delete", SearchError::DeleteError).await?;

        debug!(key = %key, "Document deleted");
        Ok(())
    }

    async fn bulk(&self, operations: &[BulkOperation<'_>]) -> Result<(), SearchError> {
        if operations.is_empty() {
            return Ok(());
        }

        let body = build_bulk_body(operations)?;
        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_name))
            .body(body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let response = Self::check_status(response, "Bulk", SearchError::BulkIndexError).await?;
        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        let failures = parse_bulk_failures(&response_body);
        if !failures.is_empty() {
            error!(
                failed = failures.len(),
                total = operations.len(),
                "Bulk request had failures"
            );
            return Err(SearchError::bulk_index(describe_failures(&failures)));
        }

        debug!(count = operations.len(), "Bulk request completed");
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchHits, SearchError> {
        let body = build_search_query(query);

        let response = self
            .client
            .search(SearchParts::Index(&[self.index_name.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let response = Self::check_status(response, "Search", SearchError::QueryError).await?;
        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        parse_search_hits(&response_body)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let health: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;
        let status = health["status"].as_str().unwrap_or("unknown");

        debug!(status = %status, "Cluster health");
        Ok(status == "green" || status == "yellow")
    }
}
