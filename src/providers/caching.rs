use crate::core::cache::KeyValueCollection;
use crate::core::range::{DateChunk, format_report_date};
use crate::core::report::ReportSource;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Serves reports from a collection before asking the wrapped source.
///
/// Only successful retrievals are stored.
pub struct CachingReportSource<S: ReportSource> {
    inner: S,
    cache: Arc<dyn KeyValueCollection>,
    ttl: Option<Duration>,
}

impl<S: ReportSource> CachingReportSource<S> {
    pub fn new(inner: S, cache: Arc<dyn KeyValueCollection>, ttl: Option<Duration>) -> Self {
        Self { inner, cache, ttl }
    }

    fn cache_key(chunk: &DateChunk) -> String {
        format!(
            "{}:{}",
            format_report_date(chunk.start),
            format_report_date(chunk.end)
        )
    }
}

#[async_trait]
impl<S: ReportSource> ReportSource for CachingReportSource<S> {
    async fn fetch_report(&self, chunk: &DateChunk) -> Result<String> {
        let key = Self::cache_key(chunk);
        match self.cache.get(&key).await {
            Some(cached) if !cached.trim().is_empty() => {
                debug!("Cache hit for report: {}", key);
                return Ok(cached);
            }
            Some(_) => {
                debug!("Dropping blank cached report: {}", key);
                self.cache.remove(&key).await;
            }
            None => {}
        }

        debug!("Cache miss for report: {}", key);
        let text = self.inner.fetch_report(chunk).await?;
        self.cache.put(&key, &text, self.ttl).await;
        Ok(text)
    }
}
