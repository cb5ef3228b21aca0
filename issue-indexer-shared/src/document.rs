//! The record submitted to an indexer.

use serde::{Deserialize, Serialize};

/// One issue as it is submitted for indexing.
///
/// Serializes to the document body stored in the search engine, so the
/// field names here are part of the persisted index layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerData {
    /// The issue's numeric ID. Must be positive.
    pub id: i64,
    /// The owning repository's ID. Must be positive.
    pub repo_id: i64,
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub content: String,
    /// All comment text on the issue, concatenated.
    pub comments: String,
}

impl IndexerData {
    /// Create a record with empty text fields.
    pub fn new(id: i64, repo_id: i64) -> Self {
        Self {
            id,
            repo_id,
            title: String::new(),
            content: String::new(),
            comments: String::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the body text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the concatenated comment text.
    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }
}
