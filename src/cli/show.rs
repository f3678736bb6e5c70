use super::ui;
use crate::FetchRange;
use crate::core::indicators::{IndicatorFrame, IndicatorParams, compute};
use crate::core::range::parse_report_date;
use crate::core::{FetchOptions, NavSeries, ReportSource};
use anyhow::{Result, bail};
use comfy_table::Cell;

#[derive(Debug, Clone)]
pub struct ShowRequest {
    pub scheme: String,
    /// Optional `DD-Mon-YYYY` bounds narrowing the fetched range.
    pub plot_from: Option<String>,
    pub plot_to: Option<String>,
    pub params: IndicatorParams,
    /// Most recent rows to print; 0 prints all.
    pub rows: usize,
}

pub fn display_frame(frame: &IndicatorFrame, params: &IndicatorParams, rows: usize) -> String {
    if frame.is_empty() {
        return "No NAV values to display".to_string();
    }

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Date"), ui::header_cell("NAV")];
    for sma in &frame.sma {
        header.push(ui::header_cell(&format!("SMA {}", sma.window)));
    }
    header.push(ui::header_cell(&format!("RSI ({})", params.rsi_period)));
    header.push(ui::header_cell("MACD"));
    header.push(ui::header_cell("Signal"));
    table.set_header(header);

    let skip = if rows == 0 {
        0
    } else {
        frame.len().saturating_sub(rows)
    };
    for i in skip..frame.len() {
        let mut row = vec![
            Cell::new(frame.dates[i]),
            ui::number_cell(format!("{:.4}", frame.nav[i])),
        ];
        for sma in &frame.sma {
            row.push(ui::format_optional_cell(sma.values[i], |v| format!("{v:.4}")));
        }
        row.push(ui::rsi_cell(frame.rsi[i]));
        row.push(ui::format_optional_cell(frame.macd.line[i], |v| format!("{v:.4}")));
        row.push(ui::format_optional_cell(frame.macd.signal[i], |v| format!("{v:.4}")));
        table.add_row(row);
    }
    table.to_string()
}

pub async fn run(
    source: &dyn ReportSource,
    range: &FetchRange,
    options: &FetchOptions,
    request: &ShowRequest,
) -> Result<()> {
    // Reject bad plot bounds and indicator settings before downloading anything.
    let plot_from = request
        .plot_from
        .as_deref()
        .map(parse_report_date)
        .transpose()?;
    let plot_to = request.plot_to.as_deref().map(parse_report_date).transpose()?;
    request.params.validate()?;

    let outcome = super::fetch_with_progress(source, range, options).await?;

    let series = NavSeries::for_scheme(&outcome.records, &request.scheme);
    if series.is_empty() {
        bail!("No NAV records found for scheme '{}'", request.scheme);
    }
    let series = series.between(plot_from, plot_to);
    if series.is_empty() {
        bail!(
            "No NAV records for scheme '{}' in the selected plot range",
            request.scheme
        );
    }

    let frame = compute(&series, &request.params)?;
    println!("\nScheme: {}", ui::style_text(&series.name, ui::StyleType::Title));
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!("{} NAVs from {} to {}\n", series.len(), first, last);
    }
    println!("{}", display_frame(&frame, &request.params, request.rows));
    Ok(())
}
