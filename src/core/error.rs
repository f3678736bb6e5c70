//! Error taxonomy for range splitting, report parsing and fetching.

use crate::core::range::DateChunk;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NavError {
    /// Rejected input, raised before any retrieval is attempted.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Failed to retrieve report for {chunk}: {message}")]
    RetrievalFailure { chunk: DateChunk, message: String },

    /// A single malformed record or header line. Never surfaced by the parser.
    #[error("Failed to parse line: {0}")]
    RecordParseFailure(String),

    #[error("No NAV records returned between {start} and {end}")]
    NoRecords { start: NaiveDate, end: NaiveDate },
}

impl NavError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        NavError::InvalidParameter(message.into())
    }

    pub(crate) fn unparsable(message: impl Into<String>) -> Self {
        NavError::RecordParseFailure(message.into())
    }
}
