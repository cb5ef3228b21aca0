//! Configuration and dependency wiring for the issue indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{IndexerType, LogFormat, Settings};
