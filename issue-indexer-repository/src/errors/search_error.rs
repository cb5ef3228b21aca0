//! Search error types.
//!
//! This module defines the errors reported by a search engine client.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The search engine could not be reached or did not answer in time.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Search query execution failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to index a single document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Bulk operation had failures.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// The index was created by someone else first.
    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether this error means the engine is unreachable, as opposed to an
    /// application-level rejection.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}
