//! Search request and result types.

use serde::{Deserialize, Serialize};

/// A keyword search scoped to a set of repositories, with a skip/take window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text matched against title, content and comments.
    pub keyword: String,
    /// Repositories to restrict to. Empty means no restriction.
    pub repo_ids: Vec<i64>,
    /// Maximum number of hits to return.
    pub limit: usize,
    /// Number of hits to skip.
    pub offset: usize,
}

impl SearchQuery {
    /// Create a query over all repositories.
    pub fn new(keyword: impl Into<String>, limit: usize, offset: usize) -> Self {
        Self {
            keyword: keyword.into(),
            repo_ids: Vec::new(),
            limit,
            offset,
        }
    }

    /// Restrict the query to the given repositories.
    pub fn in_repos(mut self, repo_ids: impl Into<Vec<i64>>) -> Self {
        self.repo_ids = repo_ids.into();
        self
    }

    /// Whether a repository filter applies.
    pub fn is_scoped(&self) -> bool {
        !self.repo_ids.is_empty()
    }
}

/// A single search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    /// ID of the matching issue.
    pub id: i64,
}

/// One page of search hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matches before pagination.
    pub total: u64,
    /// Hits on this page, ascending by ID.
    pub hits: Vec<Match>,
}

impl SearchResult {
    /// IDs of the hits on this page, in order.
    pub fn ids(&self) -> Vec<i64> {
        self.hits.iter().map(|hit| hit.id).collect()
    }
}
