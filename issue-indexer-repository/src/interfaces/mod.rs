//! Interface definitions for the issue indexer.
//!
//! `Indexer` is the contract callers program against; `SearchEngineClient`
//! is what a backend needs from the remote engine. Both are traits so
//! implementations can be swapped without touching callers.

mod indexer;
mod search_engine_client;

pub use indexer::Indexer;
pub use search_engine_client::SearchEngineClient;
