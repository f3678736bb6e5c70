use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A named set of string entries with optional expiry.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    /// Returns the value for `key` unless it is missing or expired.
    async fn get(&self, key: &str) -> Option<String>;

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>);

    async fn remove(&self, key: &str);
}

pub trait Store: Send + Sync {
    /// Returns the collection called `name`, creating it when missing.
    ///
    /// `persist` selects a disk backed collection; `None` when one cannot be opened.
    fn get_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>>;
}
