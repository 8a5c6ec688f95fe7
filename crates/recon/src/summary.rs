use serde::Serialize;

use crate::model::{ComplianceReport, ComplianceStatus};

/// Totals across every retailer in a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub retailer_count: usize,
    pub total_deviated: usize,
    pub total_non_compliant: usize,
    /// Retailers with at least one non-compliant product.
    pub offending_retailers: usize,
}

/// Compute network-wide totals from per-retailer reports.
pub fn network_summary(report: &ComplianceReport) -> NetworkSummary {
    let mut summary = NetworkSummary {
        retailer_count: report.len(),
        ..NetworkSummary::default()
    };

    for retailer in report.retailers.values() {
        let non_compliant = retailer
            .records
            .iter()
            .filter(|r| r.status == ComplianceStatus::NonCompliant)
            .count();

        summary.total_deviated += retailer.deviated_count;
        summary.total_non_compliant += non_compliant;
        if non_compliant > 0 {
            summary.offending_retailers += 1;
        }
    }

    summary
}

impl ComplianceReport {
    pub fn network_summary(&self) -> NetworkSummary {
        network_summary(self)
    }
}
