//! Shared path for data commands: config → snapshots → report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, SecondsFormat, Utc};
use pricewatch_config::PriceWatchConfig;
use pricewatch_io::{load_input, LoadedInput, SourceStatus};
use pricewatch_recon::ComplianceReport;
use serde::Serialize;

use crate::CliError;

pub struct Evaluation {
    pub config: PriceWatchConfig,
    pub config_path: PathBuf,
    pub as_of: NaiveDate,
    pub loaded: LoadedInput,
    pub report: ComplianceReport,
}

/// Run metadata. Kept out of [`ComplianceReport`] so the report itself is a
/// pure function of its input.
#[derive(Debug, Serialize)]
pub struct RunMeta<'a> {
    pub config: &'a str,
    pub as_of: NaiveDate,
    pub engine_version: &'static str,
    pub generated_at: String,
    pub reference: &'a SourceStatus,
    pub retailers: &'a BTreeMap<String, SourceStatus>,
}

/// Directory that relative paths in a config resolve against.
pub fn config_base_dir(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

pub fn evaluate(config_path: &Path, date: Option<NaiveDate>) -> Result<Evaluation, CliError> {
    let config = PriceWatchConfig::load(config_path).map_err(CliError::config)?;
    let as_of = date.unwrap_or_else(|| Local::now().date_naive());

    let loaded =
        load_input(&config, config_base_dir(config_path), as_of).map_err(CliError::source)?;
    let report = pricewatch_recon::run(&loaded.input).map_err(CliError::recon)?;

    tracing::info!(
        config = %config.name,
        %as_of,
        retailers = report.len(),
        products = loaded.input.reference.len(),
        "evaluation complete"
    );

    Ok(Evaluation {
        config,
        config_path: config_path.to_path_buf(),
        as_of,
        loaded,
        report,
    })
}

impl Evaluation {
    /// Retailer key → display label for every configured retailer.
    pub fn labels(&self) -> BTreeMap<String, String> {
        self.config
            .retailers
            .keys()
            .map(|key| (key.clone(), self.config.retailer_label(key).to_string()))
            .collect()
    }

    pub fn label<'a>(&'a self, key: &'a str) -> &'a str {
        self.config.retailer_label(key)
    }

    pub fn meta(&self) -> RunMeta<'_> {
        RunMeta {
            config: &self.config.name,
            as_of: self.as_of,
            engine_version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            reference: &self.loaded.reference,
            retailers: &self.loaded.retailers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_of_bare_file_name() {
        assert_eq!(config_base_dir(Path::new("pricewatch.toml")), Path::new("."));
        assert_eq!(
            config_base_dir(Path::new("/etc/pricewatch/pricewatch.toml")),
            Path::new("/etc/pricewatch")
        );
    }
}
