//! Service settings read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use issue_indexer_repository::IndexerConfig;

use crate::IndexingError;

/// Default search engine URL.
const DEFAULT_URL: &str = "http://localhost:9200";

/// Which indexer backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexerType {
    /// OpenSearch or Elasticsearch 7 compatible cluster.
    #[default]
    OpenSearch,
}

impl FromStr for IndexerType {
    type Err = IndexingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "opensearch" => Ok(Self::OpenSearch),
            other => Err(IndexingError::config(format!(
                "Unknown indexer type: {}",
                other
            ))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = IndexingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(IndexingError::config(format!(
                "Unknown log format: {}",
                other
            ))),
        }
    }
}

/// Settings for the issue indexer service.
#[derive(Debug, Clone)]
pub struct Settings {
    pub indexer_type: IndexerType,
    pub url: String,
    pub indexer: IndexerConfig,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `ISSUE_INDEXER_TYPE`: backend type (default: opensearch)
    /// - `ISSUE_INDEXER_URL`: engine URL (default: http://localhost:9200)
    /// - `ISSUE_INDEXER_NAME`: index name (default: issues)
    /// - `ISSUE_INDEXER_POLL_INTERVAL_SECS`: recovery probe period (default: 10)
    /// - `ISSUE_INDEXER_REQUEST_TIMEOUT_SECS`: per-request deadline (default: 30)
    /// - `ISSUE_INDEXER_MAX_BATCH_SIZE`: bulk chunk size, 0 for unlimited (default: 1000)
    /// - `ISSUE_INDEXER_LOG_FORMAT`: `plain` or `json` (default: plain)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable
    /// if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let indexer_type = match get("ISSUE_INDEXER_TYPE") {
            Some(value) => value.parse()?,
            None => IndexerType::default(),
        };
        let log_format = match get("ISSUE_INDEXER_LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::default(),
        };
        let url = get("ISSUE_INDEXER_URL").unwrap_or_else(|| DEFAULT_URL.to_string());

        let mut indexer = match get("ISSUE_INDEXER_NAME") {
            Some(name) => IndexerConfig::new(name.trim()),
            None => IndexerConfig::default(),
        };
        if let Some(secs) = get("ISSUE_INDEXER_POLL_INTERVAL_SECS") {
            indexer = indexer
                .with_poll_interval(parse_secs("ISSUE_INDEXER_POLL_INTERVAL_SECS", &secs)?);
        }
        if let Some(secs) = get("ISSUE_INDEXER_REQUEST_TIMEOUT_SECS") {
            indexer = indexer
                .with_request_timeout(parse_secs("ISSUE_INDEXER_REQUEST_TIMEOUT_SECS", &secs)?);
        }
        if let Some(size) = get("ISSUE_INDEXER_MAX_BATCH_SIZE") {
            indexer = match parse_number("ISSUE_INDEXER_MAX_BATCH_SIZE", &size)? {
                0 => indexer.unlimited(),
                size => indexer.with_max_batch_size(size),
            };
        }

        Ok(Self {
            indexer_type,
            url,
            indexer,
            log_format,
        })
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, IndexingError> {
    value
        .trim()
        .parse()
        .map_err(|e| IndexingError::config(format!("Invalid {} {:?}: {}", key, value, e)))
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, IndexingError> {
    match parse_number(key, value)? {
        0 => Err(IndexingError::config(format!("{} must be positive", key))),
        secs => Ok(Duration::from_secs(secs as u64)),
    }
}
