// pwatch - MSRP compliance monitoring over dated retailer price snapshots

mod evaluate;
mod exit_codes;
mod export;
mod notify;
mod products;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use pricewatch_config::{ConfigError, PriceWatchConfig};
use pricewatch_io::SourceError;
use pricewatch_recon::ReconError;
use tracing_subscriber::EnvFilter;

use exit_codes::{
    source_exit_code, EXIT_CONFIG_INVALID, EXIT_DATA_INTEGRITY, EXIT_ERROR, EXIT_SUCCESS,
    EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "pwatch")]
#[command(about = "Check retailer listings against manufacturer MSRP")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/pricewatch/pricewatch.toml)
    #[arg(long, global = true, env = "PRICEWATCH_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log progress to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every retailer and print the compliance report
    #[command(after_help = "\
Examples:
  pwatch report
  pwatch report --date 2024-03-10
  pwatch report --json > report.json
  pwatch report --output report.json --strict")]
    Report {
        /// Snapshot date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output JSON to stdout (the human summary always goes to stderr)
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit 6 if any listing is non-compliant
        #[arg(long)]
        strict: bool,
    },

    /// Export top offenders per retailer as CSV
    #[command(after_help = "\
Examples:
  pwatch export --out offenders.csv
  pwatch export --date 2024-03-10 > offenders.csv")]
    Export {
        /// Snapshot date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// List reference products with each retailer's price
    #[command(after_help = "\
Examples:
  pwatch products
  pwatch products --search p24
  pwatch products --json")]
    Products {
        /// Snapshot date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Only products whose name contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Draft a compliance notice for one retailer
    #[command(after_help = "\
Examples:
  pwatch notify bestbuy
  pwatch notify newegg --json")]
    Notify {
        /// Retailer key as it appears in the config
        retailer: String,

        /// Snapshot date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a config file without loading any data
    Validate {
        /// Config file (default: --config, then the default location)
        #[arg(value_name = "CONFIG")]
        path: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  pricewatch-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.unwrap_or_else(PriceWatchConfig::default_path);
    tracing::debug!(config = %config_path.display(), "pwatch starting");

    let result = match cli.command {
        Commands::Report {
            date,
            json,
            output,
            strict,
        } => report::cmd_report(&config_path, date, json, output, strict),
        Commands::Export { date, out } => export::cmd_export(&config_path, date, out),
        Commands::Products { date, search, json } => {
            products::cmd_products(&config_path, date, search, json)
        }
        Commands::Notify {
            retailer,
            date,
            json,
        } => notify::cmd_notify(&config_path, &retailer, date, json),
        Commands::Validate { path } => cmd_validate(path.as_deref().unwrap_or(&config_path)),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::Read { .. } => {
                Some("pass --config <PATH> or set PRICEWATCH_CONFIG".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_CONFIG_INVALID, message: err.to_string(), hint }
    }

    /// Create error from a listing source failure with the matching exit code.
    pub fn source(err: SourceError) -> Self {
        let code = source_exit_code(&err);
        let hint = match &err {
            SourceError::SnapshotNotFound { .. } => {
                Some("check snapshots.data_dir or pass --date for an earlier day".to_string())
            }
            SourceError::SnapshotTooOld { .. } => {
                Some("raise snapshots.max_age_days or refresh the snapshot".to_string())
            }
            SourceError::MissingColumn { .. } => {
                Some("column names in the config must match the CSV header".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn recon(err: ReconError) -> Self {
        Self { code: EXIT_DATA_INTEGRITY, message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(path: &Path) -> Result<(), CliError> {
    let config = PriceWatchConfig::load(path).map_err(CliError::config)?;

    let base_dir = evaluate::config_base_dir(path);
    let data_dir = config.data_dir(base_dir);
    if !data_dir.is_dir() {
        tracing::warn!(data_dir = %data_dir.display(), "snapshot directory does not exist");
    }

    println!(
        "{}: ok ({} retailer{}, snapshots in {})",
        config.name,
        config.retailers.len(),
        if config.retailers.len() == 1 { "" } else { "s" },
        data_dir.display(),
    );
    Ok(())
}
