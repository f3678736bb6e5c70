use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheValue {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory collection, lost when the process exits.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<String, CacheValue>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Option<String> {
        let mut cache = self.inner.lock().await;
        if let Some(entry) = cache.get(key) {
            if entry.expires_at.is_some_and(|expiry| expiry < Instant::now()) {
                debug!("Cache entry expired for key: {}", key);
                cache.remove(key);
                return None;
            }
            debug!("Cache HIT for key: {}", key);
            return Some(entry.value.clone());
        }
        debug!("Cache MISS for key: {}", key);
        None
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(
            key.to_string(),
            CacheValue {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    async fn remove(&self, key: &str) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {}", key);
    }
}
