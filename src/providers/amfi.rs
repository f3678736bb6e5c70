use crate::core::range::{DateChunk, format_report_date};
use crate::core::report::ReportSource;
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://portal.amfiindia.com";
const REPORT_PATH: &str = "DownloadNAVHistoryReport_Po.aspx";

/// Downloads the NAV history report published by AMFI.
pub struct AmfiReportSource {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl AmfiReportSource {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        retries: usize,
        retry_delay_ms: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("mfnav/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(AmfiReportSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries,
            retry_delay_ms,
        })
    }

    fn report_url(&self, chunk: &DateChunk) -> String {
        format!(
            "{}/{}?frmdt={}&todt={}",
            self.base_url,
            REPORT_PATH,
            format_report_date(chunk.start),
            format_report_date(chunk.end)
        )
    }
}

#[async_trait]
impl ReportSource for AmfiReportSource {
    async fn fetch_report(&self, chunk: &DateChunk) -> Result<String> {
        let url = self.report_url(chunk);
        debug!("Requesting NAV history from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).send().await },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .with_context(|| format!("Failed to send request for {chunk}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("AMFI returned HTTP {} for {}", status, chunk));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read report body for {chunk}"))?;

        if text.trim().is_empty() {
            return Err(anyhow!("Received empty report for {}", chunk));
        }

        debug!("Received {} bytes for {}", text.len(), chunk);
        Ok(text)
    }
}
