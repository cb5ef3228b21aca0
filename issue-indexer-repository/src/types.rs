//! Request and response types exchanged with the search engine client.

use issue_indexer_shared::IndexerData;

/// One sub-operation of a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation<'a> {
    /// Insert or replace the document stored under `key`.
    Index {
        /// Document key.
        key: String,
        /// Document body.
        data: &'a IndexerData,
    },
    /// Remove the document stored under `key`.
    Delete {
        /// Document key.
        key: String,
    },
}

/// A bulk sub-operation the engine rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemFailure {
    /// Document key of the rejected item.
    pub key: String,
    /// HTTP status the engine reported for the item.
    pub status: u16,
    /// Engine-supplied reason, if any.
    pub reason: Option<String>,
}

/// Raw search hits before document keys are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Total number of matches before pagination.
    pub total: u64,
    /// Document keys of the hits on the requested page, in engine order.
    /// `None` for a hit that carried no usable key.
    pub keys: Vec<Option<String>>,
}

/// Summarize failed bulk items for an error message.
pub(crate) fn describe_failures(failures: &[BulkItemFailure]) -> String {
    let keys: Vec<&str> = failures.iter().map(|f| f.key.as_str()).collect();
    let first_reason = failures
        .iter()
        .find_map(|f| f.reason.as_deref())
        .unwrap_or("unknown reason");
    format!(
        "{} item(s) failed [{}]: {}",
        failures.len(),
        keys.join(", "),
        first_reason
    )
}
