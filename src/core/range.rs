//! Splits a requested date range into chunks the report source accepts.

use crate::core::error::NavError;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::fmt::Display;

/// Date format used by the report both in queries and in record lines.
pub const DATE_FORMAT: &str = "%d-%b-%Y";

/// Upper bound on the days the report source returns for a single query.
pub const DEFAULT_MAX_SPAN_DAYS: i64 = 90;

/// An inclusive sub-interval of a requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateChunk {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateChunk {
    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl Display for DateChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}..{}",
            format_report_date(self.start),
            format_report_date(self.end)
        )
    }
}

pub fn parse_report_date(value: &str) -> Result<NaiveDate, NavError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        NavError::invalid(format!("'{value}' is not a DD-Mon-YYYY date ({e})"))
    })
}

pub fn format_report_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Breaks `[start, end]` into contiguous chunks of at most `max_span_days` days.
pub fn split_date_range(
    start: NaiveDate,
    end: NaiveDate,
    max_span_days: i64,
) -> Result<Vec<DateChunk>, NavError> {
    if max_span_days <= 0 {
        return Err(NavError::invalid(format!(
            "max span must be positive, got {max_span_days} days"
        )));
    }
    if start > end {
        return Err(NavError::invalid(format!(
            "start date {} is after end date {}",
            format_report_date(start),
            format_report_date(end)
        )));
    }

    let mut chunks = Vec::new();
    let mut current = start;
    loop {
        let chunk_end = current
            .checked_add_days(Days::new(max_span_days as u64 - 1))
            .map_or(end, |d| d.min(end));
        chunks.push(DateChunk {
            start: current,
            end: chunk_end,
        });

        match chunk_end.succ_opt() {
            Some(next) if next <= end => current = next,
            _ => break,
        }
    }

    Ok(chunks)
}
