pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::Store;
use crate::core::config::AppConfig;
use crate::core::{FetchOptions, ReportSource};
use crate::providers::amfi::AmfiReportSource;
use crate::providers::caching::CachingReportSource;
use crate::store::KeyValueStore;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};

const REPORT_COLLECTION: &str = "amfi_reports";

/// Requested fetch range, both dates in `DD-Mon-YYYY` form.
#[derive(Debug, Clone)]
pub struct FetchRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Fetch {
        range: FetchRange,
        output: Option<PathBuf>,
    },
    Amcs {
        range: FetchRange,
    },
    Schemes {
        range: FetchRange,
        amc: String,
    },
    Show {
        range: FetchRange,
        scheme: String,
        plot_from: Option<String>,
        plot_to: Option<String>,
        sma_windows: Vec<usize>,
        rows: usize,
    },
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    use_cache: bool,
) -> Result<()> {
    info!("mfnav starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let source = build_report_source(&config, use_cache)?;
    let options = FetchOptions::from(&config.fetch);

    match command {
        AppCommand::Fetch { range, output } => {
            cli::fetch::run(source.as_ref(), &range, &options, output.as_deref()).await
        }
        AppCommand::Amcs { range } => {
            cli::browse::run_amcs(source.as_ref(), &range, &options).await
        }
        AppCommand::Schemes { range, amc } => {
            cli::browse::run_schemes(source.as_ref(), &range, &options, &amc).await
        }
        AppCommand::Show {
            range,
            scheme,
            plot_from,
            plot_to,
            sma_windows,
            rows,
        } => {
            let mut params = config.indicators.clone();
            if !sma_windows.is_empty() {
                params.sma_windows = sma_windows;
            }
            let request = cli::show::ShowRequest {
                scheme,
                plot_from,
                plot_to,
                params,
                rows,
            };
            cli::show::run(source.as_ref(), &range, &options, &request).await
        }
    }
}

fn build_report_source(config: &AppConfig, use_cache: bool) -> Result<Box<dyn ReportSource>> {
    let amfi = &config.providers.amfi;
    let source = AmfiReportSource::new(
        &amfi.base_url,
        amfi.timeout(),
        amfi.retries,
        amfi.retry_delay_ms,
    )?;

    if !(use_cache && config.cache.enabled) {
        debug!("Report cache disabled");
        return Ok(Box::new(source));
    }

    let store = match config.data_path() {
        Ok(data_path) => KeyValueStore::open(&data_path),
        Err(e) => {
            debug!("No data directory for the report cache: {:#}", e);
            KeyValueStore::in_memory()
        }
    };
    let collection = store
        .get_collection(REPORT_COLLECTION, true)
        .or_else(|| {
            debug!("Falling back to an in-memory report cache");
            store.get_collection(REPORT_COLLECTION, false)
        })
        .context("Could not open report cache")?;

    Ok(Box::new(CachingReportSource::new(
        source,
        collection,
        config.cache.ttl(),
    )))
}
