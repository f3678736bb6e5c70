pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::debug;

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<(String, bool), Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    /// Opens the store with its disk keyspace under `data_path/cache`.
    ///
    /// Persistent collections are unavailable when the keyspace cannot be opened.
    pub fn open(data_path: &Path) -> Self {
        let cache_dir = data_path.join("cache");
        let keyspace = match fjall::Config::new(&cache_dir).open() {
            Ok(keyspace) => Some(keyspace),
            Err(e) => {
                debug!("Could not open cache at {}: {}", cache_dir.display(), e);
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    /// A store without a disk keyspace.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    fn create_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Some(Arc::new(MemoryCollection::new()));
        }
        let keyspace = self.keyspace.as_ref()?;
        match keyspace.open_partition(name, PartitionCreateOptions::default()) {
            Ok(partition) => Some(Arc::new(DiskCollection::new(partition))),
            Err(e) => {
                debug!("Could not open cache partition {}: {}", name, e);
                None
            }
        }
    }
}

impl Store for KeyValueStore {
    fn get_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        let key = (name.to_string(), persist);
        if let Some(collection) = self
            .collections
            .read()
            .ok()
            .and_then(|collections| collections.get(&key).cloned())
        {
            return Some(collection);
        }

        let collection = self.create_collection(name, persist)?;
        let mut collections = self.collections.write().ok()?;
        Some(Arc::clone(collections.entry(key).or_insert(collection)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_collections_are_shared_by_name() {
        let store = KeyValueStore::in_memory();
        let first = store.get_collection("reports", false).unwrap();
        let second = store.get_collection("reports", false).unwrap();

        first.put("k", "v", None).await;
        assert_eq!(second.get("k").await.as_deref(), Some("v"));
        assert!(
            store
                .get_collection("other", false)
                .unwrap()
                .get("k")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_persistent_collection_opens_on_disk() {
        let dir = tempdir().unwrap();
        let store = KeyValueStore::open(dir.path());
        let collection = store.get_collection("reports", true).unwrap();
        collection.put("k", "v", None).await;
        assert_eq!(collection.get("k").await.as_deref(), Some("v"));
        assert!(dir.path().join("cache").exists());
    }

    #[test]
    fn test_persistent_collection_requires_keyspace() {
        let store = KeyValueStore::in_memory();
        assert!(store.get_collection("reports", true).is_none());
    }
}
