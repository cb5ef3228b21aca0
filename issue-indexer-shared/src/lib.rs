//! # Issue Indexer Shared
//!
//! Types shared between the issue indexer backends and their callers.

mod document;
mod query;

pub use document::IndexerData;
pub use query::{Match, SearchQuery, SearchResult};
