//! OpenSearch index configuration and mappings.
//!
//! This module defines the mappings for the issue search index. The field
//! names and types are a persisted contract: changing a type requires a
//! reindex, not an in-place update.

use serde_json::{json, Value};

/// Get the index settings and mappings for the issue search index.
///
/// Every field is indexed:
/// - **id**, **repo_id**: integers, used for sorting and repository filtering
/// - **title**, **content**, **comments**: full-text fields matched by keyword
pub fn get_index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": {
                    "type": "integer",
                    "index": true
                },
                "repo_id": {
                    "type": "integer",
                    "index": true
                },
                "title": {
                    "type": "text",
                    "index": true
                },
                "content": {
                    "type": "text",
                    "index": true
                },
                "comments": {
                    "type": "text",
                    "index": true
                }
            }
        }
    })
}
