//! Core NAV history abstractions: range splitting, report parsing, fetching and indicators

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod indicators;
pub mod log;
pub mod parser;
pub mod range;
pub mod record;
pub mod report;
pub mod series;

// Re-export main types for cleaner imports
pub use error::NavError;
pub use fetch::{FetchOptions, FetchOutcome, fetch_nav_history};
pub use parser::parse_report;
pub use range::{DateChunk, split_date_range};
pub use record::{NavRecord, PlanOption, SourcePlan};
pub use report::ReportSource;
pub use series::NavSeries;
