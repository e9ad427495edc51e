//! In-memory response cache keyed by request URL.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared cache of successful response bodies
///
/// Clones share the same storage. Reads take a shared lock, so concurrent
/// requests for the same URL never block each other on a hit. Entries never
/// expire; two concurrent misses for one URL both go to the network and the
/// later insert wins.
#[derive(Clone, Debug, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl ResponseCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached body for `url`, if any
    pub async fn get(&self, url: &str) -> Option<Value> {
        self.entries.read().await.get(url).cloned()
    }

    /// Store the body for `url`
    pub async fn insert(&self, url: String, body: Value) {
        self.entries.write().await.insert(url, body);
    }

    /// Number of cached responses
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no responses
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every cached response
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
