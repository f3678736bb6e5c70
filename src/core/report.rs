//! Retrieval abstraction for the raw NAV history report

use crate::core::range::DateChunk;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Returns the raw report text covering `chunk`, both ends inclusive.
    async fn fetch_report(&self, chunk: &DateChunk) -> Result<String>;
}
