//! Config-driven loading of one evaluation input.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pricewatch_config::{ListingKey, PriceWatchConfig};
use pricewatch_recon::{ObservedListing, ReconInput};
use serde::Serialize;

use crate::error::SourceError;
use crate::listing::{load_listings_by_name, load_listings_by_sku, load_reference_csv, SkuIndex};
use crate::snapshot::{read_snapshot_text, resolve_snapshot, SnapshotPolicy};
use crate::Snapshot;

/// What was read for one source. `snapshot` is `None` when the source had
/// no usable snapshot and was evaluated as empty.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub source: String,
    pub snapshot: Option<Snapshot>,
    pub row_count: usize,
}

impl SourceStatus {
    pub fn is_missing(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn is_stale(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.stale)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub input: ReconInput,
    pub reference: SourceStatus,
    pub retailers: BTreeMap<String, SourceStatus>,
}

impl LoadedInput {
    /// Retailers that had no usable snapshot.
    pub fn missing_retailers(&self) -> impl Iterator<Item = &str> {
        self.retailers
            .iter()
            .filter(|(_, status)| status.is_missing())
            .map(|(key, _)| key.as_str())
    }
}

/// Load the reference list and every configured retailer as of `as_of`.
///
/// `base_dir` is the directory relative paths in `config` resolve against
/// (normally the config file's directory). A missing reference snapshot is
/// an error; a missing retailer snapshot yields an empty listing set.
pub fn load_input(
    config: &PriceWatchConfig,
    base_dir: &Path,
    as_of: NaiveDate,
) -> Result<LoadedInput, SourceError> {
    let data_dir = config.data_dir(base_dir);
    let policy = SnapshotPolicy {
        fallback: config.snapshots.fallback,
        max_age_days: config.snapshots.max_age_days,
    };

    let ref_cfg = &config.reference;
    let snapshot = resolve_snapshot(&data_dir, &ref_cfg.file_prefix, as_of, policy)?;
    let text = read_snapshot_text(&snapshot.path)?;
    let reference = load_reference_csv(
        "reference",
        &text,
        &ref_cfg.columns.product_name,
        &ref_cfg.columns.price,
    )?;
    tracing::info!(
        path = %snapshot.path.display(),
        products = reference.len(),
        stale = snapshot.stale,
        "loaded reference snapshot"
    );
    let reference_status = SourceStatus {
        source: "reference".to_string(),
        row_count: reference.len(),
        snapshot: Some(snapshot),
    };

    let index = load_index(config, base_dir)?;

    let mut listings = BTreeMap::new();
    let mut retailers = BTreeMap::new();
    for (key, retailer) in &config.retailers {
        let (rows, snapshot) =
            match resolve_snapshot(&data_dir, &retailer.file_prefix, as_of, policy) {
                Ok(snapshot) => {
                    let text = read_snapshot_text(&snapshot.path)?;
                    let rows = load_retailer_rows(
                        key,
                        retailer.columns.key(),
                        &retailer.columns.price,
                        &text,
                        index.as_ref(),
                    )?;
                    tracing::info!(
                        retailer = key.as_str(),
                        path = %snapshot.path.display(),
                        rows = rows.len(),
                        stale = snapshot.stale,
                        "loaded retailer snapshot"
                    );
                    (rows, Some(snapshot))
                }
                Err(e) if e.is_unavailable() => {
                    tracing::warn!(
                        retailer = key.as_str(),
                        error = %e,
                        "retailer evaluated with no listings"
                    );
                    (Vec::new(), None)
                }
                Err(e) => return Err(e),
            };

        retailers.insert(
            key.clone(),
            SourceStatus {
                source: key.clone(),
                snapshot,
                row_count: rows.len(),
            },
        );
        listings.insert(key.clone(), rows);
    }

    Ok(LoadedInput {
        input: ReconInput {
            reference,
            listings,
        },
        reference: reference_status,
        retailers,
    })
}

fn load_retailer_rows(
    key: &str,
    listing_key: Option<ListingKey<'_>>,
    price_column: &str,
    text: &str,
    index: Option<&SkuIndex>,
) -> Result<Vec<ObservedListing>, SourceError> {
    match (listing_key, index) {
        (Some(ListingKey::ProductName(column)), _) => {
            load_listings_by_name(key, text, column, price_column)
        }
        (Some(ListingKey::Sku(column)), Some(index)) => {
            load_listings_by_sku(key, text, column, price_column, index)
        }
        (Some(ListingKey::Sku(_)), None) => Err(SourceError::InvalidMapping {
            source_name: key.to_string(),
            message: "sku column requires an [index] section".into(),
        }),
        (None, _) => Err(SourceError::InvalidMapping {
            source_name: key.to_string(),
            message: "set exactly one of columns.product_name or columns.sku".into(),
        }),
    }
}

/// Load the SKU index if any retailer is SKU-keyed.
fn load_index(config: &PriceWatchConfig, base_dir: &Path) -> Result<Option<SkuIndex>, SourceError> {
    let Some(index_cfg) = &config.index else {
        return Ok(None);
    };
    let sku_columns: Vec<&str> = config
        .retailers
        .values()
        .filter_map(|r| match r.columns.key() {
            Some(ListingKey::Sku(column)) => Some(column),
            _ => None,
        })
        .collect();
    if sku_columns.is_empty() {
        return Ok(None);
    }

    let path = resolve_path(base_dir, &index_cfg.file);
    let text = read_snapshot_text(&path)?;
    let index = SkuIndex::from_csv(&text, &index_cfg.product_name, &sku_columns)?;
    tracing::debug!(path = %path.display(), "loaded SKU index");
    Ok(Some(index))
}

fn resolve_path(base_dir: &Path, file: &str) -> PathBuf {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
