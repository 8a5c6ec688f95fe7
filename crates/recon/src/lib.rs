//! `pricewatch-recon`: MSRP compliance reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded reference and retailer listings,
//! returns a typed compliance report. No CLI or IO dependencies.

pub mod aggregate;
pub mod catalog;
pub mod classify;
pub mod deviation;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod notice;
pub mod summary;

pub use catalog::{Catalog, CatalogRow};
pub use classify::classify;
pub use engine::{build_report, run};
pub use error::ReconError;
pub use model::{
    round2, ComplianceReport, ComplianceStatus, DeviationResult, MatchedRecord, ObservedListing,
    ReconInput, ReferenceProduct, ReportRecord, RetailerReport, StatusCounts,
};
pub use notice::{draft_notice, NoticeDraft, NoticeSender};
pub use summary::NetworkSummary;
