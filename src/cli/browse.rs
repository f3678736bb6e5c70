use super::ui;
use crate::FetchRange;
use crate::core::series::{amcs, schemes};
use crate::core::{FetchOptions, NavRecord, ReportSource};
use anyhow::{Result, bail};
use comfy_table::Cell;

pub fn display_amcs(records: &[NavRecord]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("AMC"), ui::header_cell("Schemes")]);
    for amc in amcs(records) {
        table.add_row(vec![
            Cell::new(amc),
            ui::number_cell(schemes(records, amc).len()),
        ]);
    }
    table.to_string()
}

pub fn display_schemes(records: &[NavRecord], amc: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Scheme"),
        ui::header_cell("Plan"),
        ui::header_cell("Option"),
        ui::header_cell("Category"),
        ui::header_cell("Sub-category"),
        ui::header_cell("Records"),
    ]);

    for name in schemes(records, amc) {
        let mut matching = records.iter().filter(|r| r.amc == amc && r.name == name);
        let Some(first) = matching.next() else {
            continue;
        };
        table.add_row(vec![
            ui::number_cell(first.code),
            Cell::new(name),
            Cell::new(first.source_plan),
            Cell::new(first.option),
            Cell::new(&first.category),
            Cell::new(&first.sub_category),
            ui::number_cell(1 + matching.count()),
        ]);
    }
    table.to_string()
}

pub async fn run_amcs(
    source: &dyn ReportSource,
    range: &FetchRange,
    options: &FetchOptions,
) -> Result<()> {
    let outcome = super::fetch_with_progress(source, range, options).await?;
    println!("{}", display_amcs(&outcome.records));
    Ok(())
}

pub async fn run_schemes(
    source: &dyn ReportSource,
    range: &FetchRange,
    options: &FetchOptions,
    amc: &str,
) -> Result<()> {
    let outcome = super::fetch_with_progress(source, range, options).await?;
    if !outcome.records.iter().any(|r| r.amc == amc) {
        bail!("No schemes found for AMC '{}'", amc);
    }
    println!("\nAMC: {}\n", ui::style_text(amc, ui::StyleType::Title));
    println!("{}", display_schemes(&outcome.records, amc));
    Ok(())
}
