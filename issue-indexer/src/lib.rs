//! # Issue Indexer
//!
//! Service entry point for the issue search indexer.
//!
//! This crate reads configuration from the environment, builds the
//! configured `Indexer` backend and hands it out as a single shared
//! instance.

pub mod config;

pub use config::{Dependencies, Settings};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search index error.
    #[error("Search index error: {0}")]
    SearchError(#[from] issue_indexer_repository::SearchIndexError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
