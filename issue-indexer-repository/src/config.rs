//! Configuration types for the search indexer.

use std::time::Duration;

/// Default name of the issue index.
pub const DEFAULT_INDEX_NAME: &str = "issues";

/// Default interval between recovery probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default deadline for a single request to the search engine.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the search indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Name of the index holding issue documents.
    pub index_name: String,
    /// How often the prober checks an unavailable engine.
    pub poll_interval: Duration,
    /// Deadline applied to every request to the engine.
    pub request_timeout: Duration,
    /// Maximum number of sub-operations in a single bulk request.
    /// Larger writes are split. `None` sends everything in one request.
    pub max_batch_size: Option<usize>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_batch_size: Some(1000),
        }
    }
}

impl IndexerConfig {
    /// Create a config for the given index name.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            ..Self::default()
        }
    }

    /// Set the recovery probe interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set the per-request deadline.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Set a custom bulk size limit.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = Some(max_batch_size);
        self
    }

    /// Send every multi-record write as a single bulk request.
    pub fn unlimited(mut self) -> Self {
        self.max_batch_size = None;
        self
    }

    /// Chunk size to use for a write of `len` records.
    pub(crate) fn chunk_size(&self, len: usize) -> usize {
        match self.max_batch_size {
            Some(max) if max > 0 => max,
            _ => len.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexerConfig::default();

        assert_eq!(config.index_name, "issues");
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.max_batch_size, Some(1000));
    }

    #[test]
    fn test_chunk_size() {
        let config = IndexerConfig::new("issues").with_max_batch_size(25);
        assert_eq!(config.chunk_size(100), 25);

        let config = config.unlimited();
        assert_eq!(config.chunk_size(100), 100);
        assert_eq!(config.chunk_size(0), 1);
    }
}
