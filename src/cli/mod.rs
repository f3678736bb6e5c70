pub mod browse;
pub mod fetch;
pub mod setup;
pub mod show;
pub mod ui;

use crate::FetchRange;
use crate::core::{FetchOptions, FetchOutcome, ReportSource, fetch_nav_history};
use anyhow::Result;

/// Fetches `range` behind a progress bar and reports skipped chunks on stderr.
///
/// Fails when no chunk produced a record.
pub(crate) async fn fetch_with_progress(
    source: &dyn ReportSource,
    range: &FetchRange,
    options: &FetchOptions,
) -> Result<FetchOutcome> {
    let pb = ui::new_progress_bar("Fetching NAV history...");
    let pb_clone = pb.clone();
    let outcome = fetch_nav_history(source, &range.from, &range.to, options, &move |fraction| {
        pb_clone.set_position((fraction * 100.0).round() as u64);
    })
    .await;
    pb.finish_and_clear();
    let outcome = outcome?;

    for failure in &outcome.failures {
        eprintln!(
            "{}",
            ui::style_text(&format!("Skipped: {}", failure.error), ui::StyleType::Error)
        );
    }
    outcome.ensure_records()?;
    Ok(outcome)
}
