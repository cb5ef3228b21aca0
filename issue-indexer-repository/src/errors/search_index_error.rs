//! Search index error types.
//!
//! This module defines the errors returned by the `Indexer` contract.

use thiserror::Error;

use crate::errors::SearchError;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., non-positive IDs, blank keyword).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The search engine is unreachable.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Index creation was rejected or not acknowledged.
    #[error("Init error: {0}")]
    InitError(String),

    /// Failed to index a document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// The search request was rejected.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A response could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Bulk operation had failures.
    #[error("Bulk operation error: {0}")]
    BulkOperationError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an init error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::InitError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Whether the failure was caused by the engine being unreachable.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}

impl From<SearchError> for SearchIndexError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::ConnectionError(msg) => Self::ConnectionError(msg),
            SearchError::IndexCreationError(msg) | SearchError::IndexAlreadyExists(msg) => {
                Self::InitError(msg)
            }
            SearchError::IndexError(msg) | SearchError::SerializationError(msg) => {
                Self::IndexError(msg)
            }
            SearchError::BulkIndexError(msg) => Self::BulkOperationError(msg),
            SearchError::DeleteError(msg) => Self::DeleteError(msg),
            SearchError::QueryError(msg) => Self::QueryError(msg),
            SearchError::ParseError(msg) => Self::DecodeError(msg),
        }
    }
}
