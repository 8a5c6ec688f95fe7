use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A manufacturer list price (MSRP). `product_name` is the join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProduct {
    pub product_name: String,
    pub reference_price: f64,
}

impl ReferenceProduct {
    pub fn new(product_name: impl Into<String>, reference_price: f64) -> Self {
        Self {
            product_name: product_name.into(),
            reference_price,
        }
    }
}

/// One retailer's listing for one product. `None` means the retailer does
/// not currently sell it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedListing {
    pub product_name: String,
    pub observed_price: Option<f64>,
}

impl ObservedListing {
    pub fn new(product_name: impl Into<String>, observed_price: Option<f64>) -> Self {
        Self {
            product_name: product_name.into(),
            observed_price,
        }
    }

    pub fn listed(product_name: impl Into<String>, price: f64) -> Self {
        Self::new(product_name, Some(price))
    }

    pub fn unlisted(product_name: impl Into<String>) -> Self {
        Self::new(product_name, None)
    }
}

/// Pre-loaded records for one evaluation: the reference list plus each
/// retailer's listings, keyed by retailer name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconInput {
    pub reference: Vec<ReferenceProduct>,
    pub listings: BTreeMap<String, Vec<ObservedListing>>,
}

// ---------------------------------------------------------------------------
// Join + deviation
// ---------------------------------------------------------------------------

/// A reference product joined against one retailer's listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRecord {
    pub product_name: String,
    pub reference_price: f64,
    pub observed_price: Option<f64>,
}

/// A matched record with its percentage deviation from the reference price.
///
/// `deviation_percent` is `None` when the deviation is unknown (no listing,
/// or a zero reference price). `Some(0.0)` means the prices agree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationResult {
    pub product_name: String,
    pub reference_price: f64,
    pub observed_price: Option<f64>,
    pub deviation_percent: Option<f64>,
}

impl DeviationResult {
    pub fn absolute_deviation(&self) -> Option<f64> {
        self.deviation_percent.map(f64::abs)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NeedsAttention,
    NonCompliant,
    Undetermined,
}

impl ComplianceStatus {
    /// Human-facing label used by tables, exports and notices.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::NeedsAttention => "Needs Attention",
            Self::NonCompliant => "Non-Compliant",
            Self::Undetermined => "Undetermined",
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// A classified record inside a [`RetailerReport`].
///
/// `position` is the 1-based index of the record within its report, which
/// follows the reference list order. It is the display id for tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub position: usize,
    #[serde(flatten)]
    pub result: DeviationResult,
    pub status: ComplianceStatus,
}

/// Per-status record counts. Not part of the aggregated metrics, but handy
/// for summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub compliant: usize,
    pub needs_attention: usize,
    pub non_compliant: usize,
    pub undetermined: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetailerReport {
    pub retailer_name: String,
    pub records: Vec<ReportRecord>,
    pub total_products: usize,
    pub compliant_count: usize,
    pub deviated_count: usize,
    pub compliance_rate_percent: f64,
    pub average_absolute_deviation_percent: f64,
    pub top_offenders: Vec<ReportRecord>,
}

impl RetailerReport {
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for record in &self.records {
            match record.status {
                ComplianceStatus::Compliant => counts.compliant += 1,
                ComplianceStatus::NeedsAttention => counts.needs_attention += 1,
                ComplianceStatus::NonCompliant => counts.non_compliant += 1,
                ComplianceStatus::Undetermined => counts.undetermined += 1,
            }
        }
        counts
    }

    /// Records the retailer actually lists (observed price present).
    pub fn listed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.result.observed_price.is_some())
            .count()
    }

    pub fn record(&self, product_name: &str) -> Option<&ReportRecord> {
        self.records
            .iter()
            .find(|r| r.result.product_name == product_name)
    }
}

/// Retailer name → report. Built fresh per evaluation and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComplianceReport {
    pub retailers: BTreeMap<String, RetailerReport>,
}

impl ComplianceReport {
    pub fn get(&self, retailer_name: &str) -> Option<&RetailerReport> {
        self.retailers.get(retailer_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RetailerReport)> {
        self.retailers.iter()
    }

    pub fn len(&self) -> usize {
        self.retailers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retailers.is_empty()
    }
}

/// Round to 2 decimal places. Only applied at output boundaries.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
