//! Listing source and export layer for `pricewatch`.
//!
//! - [`snapshot`]: dated snapshot resolution with staleness fallback
//! - [`listing`]: CSV → reference products / observed listings
//! - [`source`]: config-driven loading of a full evaluation input
//! - [`export`]: row-oriented CSV export of a compliance report

pub mod error;
pub mod export;
pub mod listing;
pub mod snapshot;
pub mod source;

pub use error::SourceError;
pub use snapshot::{resolve_snapshot, Snapshot, SnapshotPolicy};
pub use source::{load_input, LoadedInput, SourceStatus};
