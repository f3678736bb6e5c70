use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use mfnav::core::log::init_logging;
use mfnav::{AppCommand, FetchRange};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Download every report even when a cached copy exists
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct RangeArgs {
    /// First date to fetch, e.g. 01-Apr-2025
    #[arg(long)]
    from: String,

    /// Last date to fetch, e.g. 30-Jun-2025
    #[arg(long)]
    to: String,
}

impl From<RangeArgs> for FetchRange {
    fn from(args: RangeArgs) -> FetchRange {
        FetchRange {
            from: args.from,
            to: args.to,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch NAV history and summarise it per AMC
    Fetch {
        #[command(flatten)]
        range: RangeArgs,

        /// Write the fetched records to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the AMCs present in the fetched range
    Amcs {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// List the schemes of an AMC
    Schemes {
        #[command(flatten)]
        range: RangeArgs,

        /// AMC name as listed by `amcs`
        #[arg(long)]
        amc: String,
    },
    /// Show a scheme's NAV with SMA, RSI and MACD
    Show {
        #[command(flatten)]
        range: RangeArgs,

        /// Scheme name as listed by `schemes`
        #[arg(long)]
        scheme: String,

        /// Only show NAVs from this date
        #[arg(long)]
        plot_from: Option<String>,

        /// Only show NAVs up to this date
        #[arg(long)]
        plot_to: Option<String>,

        /// SMA window, repeatable; overrides the configured windows
        #[arg(long = "sma")]
        sma_windows: Vec<usize>,

        /// Number of most recent rows to print, 0 for all
        #[arg(long, default_value_t = 30)]
        rows: usize,
    },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Fetch { range, output } => AppCommand::Fetch {
                range: range.into(),
                output,
            },
            Commands::Amcs { range } => AppCommand::Amcs {
                range: range.into(),
            },
            Commands::Schemes { range, amc } => AppCommand::Schemes {
                range: range.into(),
                amc,
            },
            Commands::Show {
                range,
                scheme,
                plot_from,
                plot_to,
                sma_windows,
                rows,
            } => AppCommand::Show {
                range: range.into(),
                scheme,
                plot_from,
                plot_to,
                sma_windows,
                rows,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => mfnav::cli::setup::setup(),
        Some(cmd) => {
            mfnav::run_command(cmd.into(), cli.config_path.as_deref(), !cli.no_cache).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
