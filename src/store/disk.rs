use crate::core::cache::KeyValueCollection;
use anyhow::Result;
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    value: String,
    expires_at: Option<SystemTime>,
}

/// Collection persisted in a fjall partition.
pub struct DiskCollection {
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let Some(bytes) = self.partition.get(key)? else {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        };
        let entry: CacheEntry = serde_json::from_slice(&bytes)?;
        if entry
            .expires_at
            .is_some_and(|expires_at| SystemTime::now() > expires_at)
        {
            debug!("Cache entry expired for key: {}", key);
            self.partition.remove(key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value: value.to_string(),
            expires_at: ttl.map(|d| SystemTime::now() + d),
        };
        self.partition.insert(key, serde_json::to_vec(&entry)?)?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Option<String> {
        self.read(key).unwrap_or_else(|e| {
            debug!("DiskCollection get error: {}", e);
            None
        })
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if let Err(e) = self.write(key, value, ttl) {
            debug!("DiskCollection put error: {}", e);
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskCollection remove error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::{Config, PartitionCreateOptions};
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn open_collection(path: &std::path::Path) -> DiskCollection {
        let keyspace = Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("reports", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(partition)
    }

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());

        assert!(cache.get("key1").await.is_none());
        cache.put("key1", "report", None).await;
        assert_eq!(cache.get("key1").await.as_deref(), Some("report"));
        assert!(cache.get("key2").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());

        cache
            .put("key1", "report", Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get("key1").await.as_deref(), Some("report"));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_remove() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());

        cache.put("key1", "report", None).await;
        cache.remove("key1").await;
        assert!(cache.get("key1").await.is_none());
    }
}
