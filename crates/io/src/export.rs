//! Offender export: one CSV row per top offender, with the retailer's
//! summary metrics repeated on every row.

use std::collections::BTreeMap;
use std::io::Write;

use pricewatch_recon::{round2, ComplianceReport, RetailerReport};

use crate::error::SourceError;

pub const EXPORT_HEADERS: [&str; 8] = [
    "Retailer",
    "Product Name",
    "MSRP",
    "Retailer Price",
    "Deviation",
    "Total Deviated Products",
    "Average Deviation",
    "Compliance Rate",
];

/// Write the offender export for every retailer in `report`.
///
/// `labels` maps retailer keys to display names; unmapped keys are written
/// as-is. A retailer with no offenders still gets one summary row with the
/// product columns left blank. Returns the number of data rows written.
pub fn write_offender_export<W: Write>(
    writer: W,
    report: &ComplianceReport,
    labels: &BTreeMap<String, String>,
) -> Result<usize, SourceError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(EXPORT_HEADERS)?;

    let mut rows = 0usize;
    for (key, retailer) in report.iter() {
        let label = labels.get(key).map(String::as_str).unwrap_or(key);
        let summary = summary_cells(retailer);

        if retailer.top_offenders.is_empty() {
            wtr.write_record([
                label,
                "",
                "",
                "",
                "",
                summary[0].as_str(),
                summary[1].as_str(),
                summary[2].as_str(),
            ])?;
            rows += 1;
            continue;
        }

        for offender in &retailer.top_offenders {
            let result = &offender.result;
            let observed = result
                .observed_price
                .map(|p| format!("{:.2}", round2(p)))
                .unwrap_or_default();
            let deviation = result
                .deviation_percent
                .map(|d| format!("{:.2}%", round2(d)))
                .unwrap_or_default();
            let msrp = format!("{:.2}", round2(result.reference_price));
            wtr.write_record([
                label,
                result.product_name.as_str(),
                msrp.as_str(),
                observed.as_str(),
                deviation.as_str(),
                summary[0].as_str(),
                summary[1].as_str(),
                summary[2].as_str(),
            ])?;
            rows += 1;
        }
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(rows)
}

fn summary_cells(retailer: &RetailerReport) -> [String; 3] {
    [
        retailer.deviated_count.to_string(),
        format!("{:.2}%", round2(retailer.average_absolute_deviation_percent)),
        format!("{:.2}%", round2(retailer.compliance_rate_percent)),
    ]
}
