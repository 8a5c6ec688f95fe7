use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    /// File read / directory scan failure.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV (bad quoting, ragged rows, ...).
    #[error("{source_name}: CSV error: {message}")]
    Csv { source_name: String, message: String },

    /// Missing required column in a snapshot.
    #[error("{source_name}: missing column '{column}'")]
    MissingColumn { source_name: String, column: String },

    /// Price cell that is neither a number nor an absent marker.
    #[error("{source_name}, row {row}: cannot parse price '{value}'")]
    PriceParse {
        source_name: String,
        row: usize,
        value: String,
    },

    /// Reference rows must carry a price.
    #[error("{source_name}, row {row}: reference product '{product_name}' has no price")]
    MissingReferencePrice {
        source_name: String,
        row: usize,
        product_name: String,
    },

    /// Column mapping that names neither or both key columns.
    #[error("{source_name}: {message}")]
    InvalidMapping { source_name: String, message: String },

    /// No usable snapshot for the requested date.
    #[error("no snapshot '{prefix}' on or before {as_of} in {}", .dir.display())]
    SnapshotNotFound {
        prefix: String,
        dir: PathBuf,
        as_of: NaiveDate,
    },

    /// The latest snapshot is older than the configured limit.
    #[error("snapshot '{prefix}' from {date} is {age_days} days old (max {max_age_days})")]
    SnapshotTooOld {
        prefix: String,
        date: NaiveDate,
        age_days: i64,
        max_age_days: u32,
    },

    /// Export write failure.
    #[error("export error: {0}")]
    Export(#[from] csv::Error),
}

impl SourceError {
    /// True when the error means "no data for this source", as opposed to
    /// data that exists but is broken.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::SnapshotNotFound { .. } | Self::SnapshotTooOld { .. }
        )
    }
}
