//! Fetches a date range chunk by chunk and concatenates the parsed records.
use crate::core::error::NavError;
use crate::core::parser::parse_report;
use crate::core::range::{DEFAULT_MAX_SPAN_DAYS, DateChunk, parse_report_date, split_date_range};
use crate::core::record::NavRecord;
use crate::core::report::ReportSource;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Receives the completed fraction of chunks, in `[0, 1]`, after each chunk.
pub type ProgressFn = dyn Fn(f64) + Send + Sync;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub max_span_days: i64,
    /// Retrievals allowed in flight at once. Results are still consumed in order.
    pub concurrency: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            max_span_days: DEFAULT_MAX_SPAN_DAYS,
            concurrency: 1,
        }
    }
}

/// A chunk whose report could not be retrieved.
#[derive(Debug)]
pub struct ChunkFailure {
    pub chunk: DateChunk,
    pub error: NavError,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub records: Vec<NavRecord>,
    pub failures: Vec<ChunkFailure>,
    pub chunks: usize,
}

impl FetchOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Surfaces an empty fetch as [`NavError::NoRecords`].
    pub fn ensure_records(&self) -> Result<&[NavRecord], NavError> {
        if self.records.is_empty() {
            return Err(NavError::NoRecords {
                start: self.start,
                end: self.end,
            });
        }
        Ok(&self.records)
    }

    /// Number of records repeating an earlier `(code, date)` pair.
    pub fn duplicate_keys(&self) -> usize {
        let mut seen: HashMap<(u64, NaiveDate), usize> = HashMap::new();
        for record in &self.records {
            *seen.entry((record.code, record.date)).or_default() += 1;
        }
        seen.values().map(|count| count - 1).sum()
    }
}

/// Retrieves and parses the NAV history between two `DD-Mon-YYYY` dates.
///
/// Parameters are validated before any retrieval. A chunk that fails to
/// download contributes no records and is reported in
/// [`FetchOutcome::failures`]; the remaining chunks are still fetched.
pub async fn fetch_nav_history(
    source: &dyn ReportSource,
    start: &str,
    end: &str,
    options: &FetchOptions,
    progress: &ProgressFn,
) -> Result<FetchOutcome, NavError> {
    let start = parse_report_date(start)?;
    let end = parse_report_date(end)?;
    if options.concurrency == 0 {
        return Err(NavError::invalid("concurrency must be at least 1"));
    }
    let chunks = split_date_range(start, end, options.max_span_days)?;
    let total = chunks.len();
    info!("Fetching NAV history from {} to {} in {} chunks", start, end, total);

    let mut retrievals = stream::iter(chunks)
        .map(|chunk| async move { (chunk, source.fetch_report(&chunk).await) })
        .buffered(options.concurrency);

    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut completed = 0usize;
    while let Some((chunk, result)) = retrievals.next().await {
        match result {
            Ok(text) => {
                let parsed = parse_report(&text);
                debug!(
                    "Chunk {} ({} days) yielded {} records",
                    chunk,
                    chunk.days(),
                    parsed.len()
                );
                records.extend(parsed);
            }
            Err(e) => {
                warn!("Skipping chunk {}: {:#}", chunk, e);
                failures.push(ChunkFailure {
                    chunk,
                    error: NavError::RetrievalFailure {
                        chunk,
                        message: format!("{e:#}"),
                    },
                });
            }
        }
        completed += 1;
        progress(completed as f64 / total as f64);
    }

    let outcome = FetchOutcome {
        start,
        end,
        records,
        failures,
        chunks: total,
    };

    let duplicates = outcome.duplicate_keys();
    if duplicates > 0 {
        warn!(
            "{} records repeat a scheme code and date already fetched",
            duplicates
        );
    }
    info!(
        "Fetched {} records ({} of {} chunks failed)",
        outcome.records.len(),
        outcome.failures.len(),
        total
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::range::format_report_date;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves one report per chunk, echoing the chunk start as the NAV date.
    struct MockSource {
        fail_on: Option<NaiveDate>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn new(fail_on: Option<NaiveDate>) -> Self {
            Self {
                fail_on,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReportSource for MockSource {
        async fn fetch_report(&self, chunk: &DateChunk) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(chunk.start) == self.fail_on {
                return Err(anyhow!("connection reset"));
            }
            let start = format_report_date(chunk.start);
            let end = format_report_date(chunk.end);
            Ok(format!(
                "title\r\nEquity (Large Cap - Growth)\r\n\r\n\r\nABC Mutual Fund\r\n\r\n1;ABC Fund - Direct - Growth;;;10.0;;;{start}\r\n2;ABC Fund - Regular - IDCW;;;11.0;;;{end}\r\n\r\n"
            ))
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn options(max_span_days: i64, concurrency: usize) -> FetchOptions {
        FetchOptions {
            max_span_days,
            concurrency,
        }
    }

    #[tokio::test]
    async fn test_concatenates_chunks_in_order() {
        let source = MockSource::new(None);
        let outcome = fetch_nav_history(
            &source,
            "01-Jan-2024",
            "10-Jan-2024",
            &options(4, 1),
            &|_| {},
        )
        .await
        .unwrap();

        assert_eq!(outcome.chunks, 3);
        assert!(outcome.failures.is_empty());
        let dates: Vec<_> = outcome.records.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                date("2024-01-01"),
                date("2024-01-04"),
                date("2024-01-05"),
                date("2024-01-08"),
                date("2024-01-09"),
                date("2024-01-10"),
            ]
        );
        let codes: Vec<_> = outcome.records.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![1, 2, 1, 2, 1, 2]);
        assert!(outcome.records.iter().all(|r| r.amc == "ABC Mutual Fund"));
    }

    #[tokio::test]
    async fn test_parallel_fetch_preserves_order() {
        let sequential = fetch_nav_history(
            &MockSource::new(None),
            "01-Jan-2024",
            "31-Mar-2024",
            &options(7, 1),
            &|_| {},
        )
        .await
        .unwrap();
        let parallel = fetch_nav_history(
            &MockSource::new(None),
            "01-Jan-2024",
            "31-Mar-2024",
            &options(7, 4),
            &|_| {},
        )
        .await
        .unwrap();

        assert_eq!(sequential.records, parallel.records);
    }

    #[tokio::test]
    async fn test_failed_chunk_is_skipped_and_reported() {
        let source = MockSource::new(Some(date("2024-01-05")));
        let outcome = fetch_nav_history(
            &source,
            "01-Jan-2024",
            "10-Jan-2024",
            &options(4, 1),
            &|_| {},
        )
        .await
        .unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.records.len(), 4);
        assert_eq!(outcome.failures.len(), 1);
        let failure = &outcome.failures[0];
        assert_eq!(failure.chunk.start, date("2024-01-05"));
        assert!(matches!(failure.error, NavError::RetrievalFailure { .. }));
        assert!(failure.error.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_progress_reported_after_each_chunk() {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let source = MockSource::new(Some(date("2024-01-01")));
        let sink = std::sync::Arc::clone(&seen);
        fetch_nav_history(
            &source,
            "01-Jan-2024",
            "08-Jan-2024",
            &options(2, 1),
            &move |fraction| sink.lock().unwrap().push(fraction),
        )
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[tokio::test]
    async fn test_invalid_parameters_fail_before_retrieval() {
        let source = MockSource::new(None);
        for (start, end, opts) in [
            ("10-Jan-2024", "01-Jan-2024", options(90, 1)),
            ("01-Jan-2024", "10-Jan-2024", options(0, 1)),
            ("01-Jan-2024", "10-Jan-2024", options(90, 0)),
            ("2024-01-01", "10-Jan-2024", options(90, 1)),
        ] {
            let result = fetch_nav_history(&source, start, end, &opts, &|_| {}).await;
            assert!(matches!(result, Err(NavError::InvalidParameter(_))));
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_fetch_surfaces_no_records() {
        let source = MockSource::new(Some(date("2024-01-01")));
        let outcome = fetch_nav_history(
            &source,
            "01-Jan-2024",
            "01-Jan-2024",
            &FetchOptions::default(),
            &|_| {},
        )
        .await
        .unwrap();

        assert!(outcome.is_empty());
        assert!(matches!(
            outcome.ensure_records(),
            Err(NavError::NoRecords { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_keys_are_counted_not_removed() {
        // One-day chunks: both records of a chunk share the date, not the code.
        let source = MockSource::new(None);
        let outcome = fetch_nav_history(
            &source,
            "01-Jan-2024",
            "02-Jan-2024",
            &options(1, 1),
            &|_| {},
        )
        .await
        .unwrap();
        assert_eq!(outcome.records.len(), 4);
        assert_eq!(outcome.duplicate_keys(), 0);

        let mut doubled = outcome;
        let copy = doubled.records[0].clone();
        doubled.records.push(copy);
        assert_eq!(doubled.duplicate_keys(), 1);
        assert_eq!(doubled.records.len(), 5);
    }
}
