// Price watch settings
// Loaded from ~/.config/pricewatch/pricewatch.toml unless a path is given

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PriceWatchConfig {
    pub name: String,
    #[serde(default)]
    pub snapshots: SnapshotConfig,
    #[serde(default)]
    pub index: Option<IndexConfig>,
    pub reference: ReferenceConfig,
    pub retailers: BTreeMap<String, RetailerConfig>,
    #[serde(default)]
    pub notice: Option<NoticeConfig>,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Where dated CSV snapshots live and how missing days are handled.
///
/// Snapshot files are named `<file_prefix>_<YYYYMMDD>.csv`. With `fallback`
/// on, a missing day falls back to the latest earlier snapshot, optionally
/// bounded by `max_age_days`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    /// Relative paths resolve against the config file's directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_fallback")]
    pub fallback: bool,
    #[serde(default)]
    pub max_age_days: Option<u32>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_fallback() -> bool {
    true
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fallback: default_fallback(),
            max_age_days: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// SKU → product name mapping shared by SKU-keyed retailers.
///
/// Each SKU-keyed retailer's `columns.sku` names a column that exists in
/// both the retailer snapshot and this index file.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    pub file: String,
    pub product_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    pub file_prefix: String,
    pub columns: ReferenceColumns,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceColumns {
    pub product_name: String,
    pub price: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailerConfig {
    #[serde(default)]
    pub display_name: Option<String>,
    pub file_prefix: String,
    /// Address for compliance notices.
    #[serde(default)]
    pub contact: Option<String>,
    pub columns: ListingColumns,
}

/// Column mapping for a retailer snapshot. Exactly one of `product_name`
/// and `sku` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingColumns {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub price: String,
}

/// How a retailer's rows are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKey<'a> {
    ProductName(&'a str),
    Sku(&'a str),
}

impl ListingColumns {
    /// The join column. Only meaningful on a validated config.
    pub fn key(&self) -> Option<ListingKey<'_>> {
        match (&self.product_name, &self.sku) {
            (Some(name), None) => Some(ListingKey::ProductName(name)),
            (None, Some(sku)) => Some(ListingKey::Sku(sku)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoticeConfig {
    pub sender_name: String,
    #[serde(default)]
    pub sender_title: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PriceWatchConfig {
    /// Default config location: `<config_dir>/pricewatch/pricewatch.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pricewatch")
            .join("pricewatch.toml")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: PriceWatchConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retailers.is_empty() {
            return Err(ConfigError::Validation(
                "at least 1 retailer is required".into(),
            ));
        }

        // Snapshot prefixes must be distinct or two sources would read the same file
        let mut prefixes: HashSet<&str> = HashSet::new();
        let reference_prefix = self.reference.file_prefix.trim();
        if reference_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "reference: file_prefix must not be empty".into(),
            ));
        }
        prefixes.insert(reference_prefix);

        require_column("reference", "product_name", &self.reference.columns.product_name)?;
        require_column("reference", "price", &self.reference.columns.price)?;

        for (key, retailer) in &self.retailers {
            let prefix = retailer.file_prefix.trim();
            if prefix.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "retailer '{key}': file_prefix must not be empty"
                )));
            }
            if !prefixes.insert(prefix) {
                return Err(ConfigError::Validation(format!(
                    "retailer '{key}': file_prefix '{prefix}' is already used"
                )));
            }

            require_column(key, "price", &retailer.columns.price)?;

            match retailer.columns.key() {
                Some(ListingKey::ProductName(column)) => {
                    require_column(key, "product_name", column)?;
                }
                Some(ListingKey::Sku(column)) => {
                    require_column(key, "sku", column)?;
                    if self.index.is_none() {
                        return Err(ConfigError::Validation(format!(
                            "retailer '{key}': sku column requires an [index] section"
                        )));
                    }
                }
                None => {
                    return Err(ConfigError::Validation(format!(
                        "retailer '{key}': set exactly one of columns.product_name or columns.sku"
                    )));
                }
            }
        }

        if let Some(ref index) = self.index {
            if index.file.trim().is_empty() {
                return Err(ConfigError::Validation("index: file must not be empty".into()));
            }
            require_column("index", "product_name", &index.product_name)?;
        }

        if self.snapshots.max_age_days.is_some() && !self.snapshots.fallback {
            return Err(ConfigError::Validation(
                "snapshots: max_age_days requires fallback = true".into(),
            ));
        }

        Ok(())
    }

    /// Snapshot directory, resolved against `base_dir` when relative.
    pub fn data_dir(&self, base_dir: &Path) -> PathBuf {
        if self.snapshots.data_dir.is_absolute() {
            self.snapshots.data_dir.clone()
        } else {
            base_dir.join(&self.snapshots.data_dir)
        }
    }

    /// Label shown to humans for a retailer key; falls back to the key.
    pub fn retailer_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.retailers
            .get(key)
            .and_then(|r| r.display_name.as_deref())
            .unwrap_or(key)
    }
}

fn require_column(owner: &str, field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{owner}: columns.{field} must not be empty"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
