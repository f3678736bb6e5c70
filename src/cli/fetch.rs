use super::ui;
use crate::FetchRange;
use crate::core::{FetchOptions, FetchOutcome, NavRecord, ReportSource};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
struct AmcSummary {
    schemes: BTreeSet<u64>,
    records: usize,
    first: Option<NaiveDate>,
    last: Option<NaiveDate>,
}

fn summarize(records: &[NavRecord]) -> BTreeMap<&str, AmcSummary> {
    let mut summaries: BTreeMap<&str, AmcSummary> = BTreeMap::new();
    for record in records {
        let summary = summaries.entry(record.amc.as_str()).or_default();
        summary.schemes.insert(record.code);
        summary.records += 1;
        summary.first = Some(summary.first.map_or(record.date, |d| d.min(record.date)));
        summary.last = Some(summary.last.map_or(record.date, |d| d.max(record.date)));
    }
    summaries
}

pub fn display_summary(outcome: &FetchOutcome) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("AMC"),
        ui::header_cell("Schemes"),
        ui::header_cell("Records"),
        ui::header_cell("From"),
        ui::header_cell("To"),
    ]);

    for (amc, summary) in summarize(&outcome.records) {
        let amc = if amc.is_empty() { "(unattributed)" } else { amc };
        table.add_row(vec![
            Cell::new(amc),
            ui::number_cell(summary.schemes.len()),
            ui::number_cell(summary.records),
            ui::format_optional_cell(summary.first, |d| d.to_string()),
            ui::format_optional_cell(summary.last, |d| d.to_string()),
        ]);
    }

    let mut output = table.to_string();
    output.push_str(&format!(
        "\n\n{}: {}",
        ui::style_text("Records", ui::StyleType::TotalLabel),
        ui::style_text(&outcome.records.len().to_string(), ui::StyleType::TotalValue)
    ));
    output.push_str(&format!(
        "\n{}",
        ui::style_text(
            &format!(
                "{} of {} chunks retrieved, {} repeated code/date pairs",
                outcome.chunks - outcome.failures.len(),
                outcome.chunks,
                outcome.duplicate_keys()
            ),
            ui::StyleType::Subtle
        )
    ));
    output
}

pub fn write_json(records: &[NavRecord], path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)
        .with_context(|| format!("Failed to write records to {}", path.display()))?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

pub async fn run(
    source: &dyn ReportSource,
    range: &FetchRange,
    options: &FetchOptions,
    output: Option<&Path>,
) -> Result<()> {
    let outcome = super::fetch_with_progress(source, range, options).await?;

    println!(
        "\nNAV history: {}\n",
        ui::style_text(&format!("{} to {}", range.from, range.to), ui::StyleType::Title)
    );
    println!("{}", display_summary(&outcome));

    if let Some(path) = output {
        write_json(&outcome.records, path)?;
        println!("\nSaved {} records to {}", outcome.records.len(), path.display());
    }
    Ok(())
}
