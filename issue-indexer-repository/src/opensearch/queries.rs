//! OpenSearch query builders.
//!
//! This module builds the request bodies for issue searches and bulk writes,
//! and decodes the engine's responses.

use opensearch::http::request::JsonBody;
use serde_json::{json, Value};

use crate::errors::SearchError;
use crate::types::{BulkItemFailure, BulkOperation, SearchHits};
use issue_indexer_shared::SearchQuery;

/// Fields the keyword is matched against.
const TEXT_FIELDS: [&str; 3] = ["title", "content", "comments"];

/// Build an OpenSearch search body from a SearchQuery.
///
/// The body:
/// - requires the keyword to match in any of the text fields
/// - filters on `repo_id` when the query is scoped to repositories
/// - sorts ascending by `id`
/// - applies the offset/limit window and asks for an exact total
pub fn build_search_query(query: &SearchQuery) -> Value {
    let mut bool_query = json!({
        "must": [build_keyword_query(&query.keyword)]
    });

    if query.is_scoped() {
        bool_query["filter"] = json!([build_repo_filter(&query.repo_ids)]);
    }

    json!({
        "query": { "bool": bool_query },
        "sort": [{ "id": { "order": "asc" } }],
        "from": query.offset,
        "size": query.limit,
        "track_total_hits": true
    })
}

/// Match the keyword as plain terms across the text fields.
///
/// `multi_match` does not interpret query-string syntax, so operators in
/// the keyword are searched for literally.
fn build_keyword_query(keyword: &str) -> Value {
    json!({
        "multi_match": {
            "query": keyword,
            "fields": TEXT_FIELDS
        }
    })
}

/// Restrict to documents whose `repo_id` is any of the given values.
fn build_repo_filter(repo_ids: &[i64]) -> Value {
    json!({ "terms": { "repo_id": repo_ids } })
}

/// Build the newline-delimited body of a bulk request.
pub fn build_bulk_body(
    operations: &[BulkOperation<'_>],
) -> Result<Vec<JsonBody<Value>>, SearchError> {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(operations.len() * 2);

    for operation in operations {
        match operation {
            BulkOperation::Index { key, data } => {
                let source = serde_json::to_value(data)
                    .map_err(|e| SearchError::SerializationError(e.to_string()))?;
                body.push(json!({ "index": { "_id": key } }).into());
                body.push(source.into());
            }
            BulkOperation::Delete { key } => {
                body.push(json!({ "delete": { "_id": key } }).into());
            }
        }
    }

    Ok(body)
}

/// Collect the items a bulk response reports as failed.
///
/// A delete answered with 404 means the document was already gone, which
/// is not a failure.
pub fn parse_bulk_failures(response: &Value) -> Vec<BulkItemFailure> {
    if !response["errors"].as_bool().unwrap_or(false) {
        return Vec::new();
    }

    let Some(items) = response["items"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let (action, result) = item.as_object()?.iter().next()?;
            let status = result["status"].as_u64().unwrap_or(0) as u16;
            if action == "delete" && status == 404 {
                return None;
            }
            let error = result.get("error")?;
            Some(BulkItemFailure {
                key: result["_id"].as_str().unwrap_or_default().to_string(),
                status,
                reason: error["reason"]
                    .as_str()
                    .or_else(|| error["type"].as_str())
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Extract the total and the document keys from a search response.
pub fn parse_search_hits(response: &Value) -> Result<SearchHits, SearchError> {
    let hits = response
        .get("hits")
        .ok_or_else(|| SearchError::parse("Missing hits in search response"))?;

    // `total` is an object on current engines and a bare number on old ones.
    let total = hits["total"]["value"]
        .as_u64()
        .or_else(|| hits["total"].as_u64())
        .ok_or_else(|| SearchError::parse("Missing total in search response"))?;

    let keys = hits["hits"]
        .as_array()
        .map(|hits| {
            hits.iter()
                .map(|hit| hit["_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Ok(SearchHits { total, keys })
}
