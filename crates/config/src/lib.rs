// Configuration loading

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    IndexConfig, ListingColumns, ListingKey, NoticeConfig, PriceWatchConfig, ReferenceColumns,
    ReferenceConfig, RetailerConfig, SnapshotConfig,
};
