use crate::types::{InsightReport, ProcessGraph};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

pub trait InsightCache: Send + Sync {
    fn get(&self, key: &str) -> Option<InsightReport>;
    fn put(&self, key: String, report: InsightReport);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime cache. Entries are never evicted.
#[derive(Debug, Default)]
pub struct MemoryInsightCache {
    entries: RwLock<HashMap<String, InsightReport>>,
}

impl MemoryInsightCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InsightCache for MemoryInsightCache {
    fn get(&self, key: &str) -> Option<InsightReport> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: String, report: InsightReport) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, report);
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// SHA-256 over the canonical JSON of the graph and summary. Node and link
/// enumeration order does not affect the key.
pub fn cache_key(graph: &ProcessGraph, summary: Option<&str>) -> String {
    let source = json!({
        "graph": graph.canonical(),
        "summary_text": summary.unwrap_or_default(),
    });
    let serialized = serde_json::to_string(&normalize_json(&source)).unwrap_or_default();
    hash_str(&serialized)
}

fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut ordered = BTreeMap::new();
            for (key, value) in map {
                ordered.insert(key.clone(), normalize_json(value));
            }
            Value::Object(ordered.into_iter().collect())
        }
        Value::Array(values) => Value::Array(values.iter().map(normalize_json).collect()),
        other => other.clone(),
    }
}

fn hash_str(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
