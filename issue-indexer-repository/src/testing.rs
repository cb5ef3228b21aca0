//! In-memory search engine used by the unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::{describe_failures, BulkItemFailure, BulkOperation, SearchHits};
use issue_indexer_shared::{IndexerData, SearchQuery};

/// Behaves like a single-index engine with term matching, plus switches
/// for simulating outages, hangs and rejected documents.
pub(crate) struct InMemoryEngine {
    docs: Mutex<BTreeMap<String, IndexerData>>,
    exists: AtomicBool,
    reachable: AtomicBool,
    healthy: AtomicBool,
    hang: AtomicBool,
    rejected_keys: Mutex<HashSet<String>>,
    created_mappings: Mutex<Vec<Value>>,
    single_writes: AtomicUsize,
    bulk_sizes: Mutex<Vec<usize>>,
    searches: AtomicUsize,
    health_checks: AtomicUsize,
}

impl InMemoryEngine {
    pub(crate) fn new() -> Self {
        Self {
            docs: Mutex::new(BTreeMap::new()),
            exists: AtomicBool::new(false),
            reachable: AtomicBool::new(true),
            healthy: AtomicBool::new(true),
            hang: AtomicBool::new(false),
            rejected_keys: Mutex::new(HashSet::new()),
            created_mappings: Mutex::new(Vec::new()),
            single_writes: AtomicUsize::new(0),
            bulk_sizes: Mutex::new(Vec::new()),
            searches: AtomicUsize::new(0),
            health_checks: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub(crate) fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub(crate) fn set_index_exists(&self, exists: bool) {
        self.exists.store(exists, Ordering::SeqCst);
    }

    pub(crate) fn reject_key(&self, key: &str) {
        self.rejected_keys.lock().unwrap().insert(key.to_string());
    }

    pub(crate) fn insert_raw(&self, key: &str, data: IndexerData) {
        self.docs.lock().unwrap().insert(key.to_string(), data);
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.docs.lock().unwrap().keys().cloned().collect()
    }

    pub(crate) fn get(&self, key: &str) -> Option<IndexerData> {
        self.docs.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn created_mappings(&self) -> Vec<Value> {
        self.created_mappings.lock().unwrap().clone()
    }

    pub(crate) fn single_writes(&self) -> usize {
        self.single_writes.load(Ordering::SeqCst)
    }

    pub(crate) fn bulk_sizes(&self) -> Vec<usize> {
        self.bulk_sizes.lock().unwrap().clone()
    }

    pub(crate) fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub(crate) fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<(), SearchError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(SearchError::connection("no available connection"));
        }
        Ok(())
    }

    fn is_rejected(&self, key: &str) -> bool {
        self.rejected_keys.lock().unwrap().contains(key)
    }

    fn matches(data: &IndexerData, terms: &[String], query: &SearchQuery) -> bool {
        if query.is_scoped() && !query.repo_ids.contains(&data.repo_id) {
            return false;
        }
        let fields = [&data.title, &data.content, &data.comments];
        fields
            .iter()
            .flat_map(|field| tokenize(field))
            .any(|token| terms.contains(&token))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl SearchEngineClient for InMemoryEngine {
    async fn index_exists(&self) -> Result<bool, SearchError> {
        self.connect().await?;
        Ok(self.exists.load(Ordering::SeqCst))
    }

    async fn create_index(&self, mapping: &Value) -> Result<(), SearchError> {
        self.connect().await?;
        if self.exists.swap(true, Ordering::SeqCst) {
            return Err(SearchError::IndexAlreadyExists("issues".to_string()));
        }
        self.created_mappings.lock().unwrap().push(mapping.clone());
        Ok(())
    }

    async fn index_document(&self, key: &str, data: &IndexerData) -> Result<(), SearchError> {
        self.connect().await?;
        self.single_writes.fetch_add(1, Ordering::SeqCst);
        if self.is_rejected(key) {
            return Err(SearchError::IndexError(format!(
                "document {} rejected",
                key
            )));
        }
        self.docs
            .lock()
            .unwrap()
            .insert(key.to_string(), data.clone());
        Ok(())
    }

    async fn delete_document(&self, key: &str) -> Result<(), SearchError> {
        self.connect().await?;
        self.single_writes.fetch_add(1, Ordering::SeqCst);
        self.docs.lock().unwrap().remove(key);
        Ok(())
    }

    async fn bulk(&self, operations: &[BulkOperation<'_>]) -> Result<(), SearchError> {
        self.connect().await?;
        self.bulk_sizes.lock().unwrap().push(operations.len());

        let mut failures = Vec::new();
        let mut docs = self.docs.lock().unwrap();
        for operation in operations {
            match operation {
                BulkOperation::Index { key, data } => {
                    if self.is_rejected(key) {
                        failures.push(BulkItemFailure {
                            key: key.clone(),
                            status: 400,
                            reason: Some("mapper_parsing_exception".to_string()),
                        });
                    } else {
                        docs.insert(key.clone(), (*data).clone());
                    }
                }
                BulkOperation::Delete { key } => {
                    docs.remove(key);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SearchError::bulk_index(describe_failures(&failures)))
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchHits, SearchError> {
        self.connect().await?;
        self.searches.fetch_add(1, Ordering::SeqCst);

        let terms = tokenize(&query.keyword);
        let docs = self.docs.lock().unwrap();
        let mut matched: Vec<(&String, &IndexerData)> = docs
            .iter()
            .filter(|(_, data)| Self::matches(data, &terms, query))
            .collect();
        matched.sort_by_key(|(_, data)| data.id);

        Ok(SearchHits {
            total: matched.len() as u64,
            keys: matched
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .map(|(key, _)| Some(key.clone()))
                .collect(),
        })
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        self.connect().await?;
        Ok(self.healthy.load(Ordering::SeqCst))
    }
}
