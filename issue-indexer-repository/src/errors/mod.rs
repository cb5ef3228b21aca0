//! Error types for the issue indexer repository.

mod search_error;
mod search_index_error;

pub use search_error::SearchError;
pub use search_index_error::SearchIndexError;
