use crate::classify::classify;
use crate::model::{ComplianceStatus, DeviationResult, ReportRecord, RetailerReport};

/// Maximum number of records in [`RetailerReport::top_offenders`].
pub const TOP_OFFENDER_LIMIT: usize = 5;

/// Classify each result and compute the retailer's summary metrics.
///
/// Records keep the order of `results`; positions are 1-based in that order.
/// Rates and averages are 0 when there is nothing to divide by.
pub fn aggregate(retailer_name: &str, results: Vec<DeviationResult>) -> RetailerReport {
    let records: Vec<ReportRecord> = results
        .into_iter()
        .enumerate()
        .map(|(i, result)| {
            let status = classify(result.deviation_percent);
            ReportRecord {
                position: i + 1,
                result,
                status,
            }
        })
        .collect();

    let total_products = records.len();
    let compliant_count = records
        .iter()
        .filter(|r| r.status == ComplianceStatus::Compliant)
        .count();

    let compliance_rate_percent = if total_products == 0 {
        0.0
    } else {
        compliant_count as f64 / total_products as f64 * 100.0
    };

    // Undetermined records stay out of the denominator.
    let (deviation_sum, defined) = records
        .iter()
        .filter(|r| r.status != ComplianceStatus::Undetermined)
        .filter_map(|r| r.result.absolute_deviation())
        .fold((0.0, 0usize), |(sum, n), d| (sum + d, n + 1));
    let average_absolute_deviation_percent = if defined == 0 {
        0.0
    } else {
        deviation_sum / defined as f64
    };

    let top_offenders = top_offenders(&records, TOP_OFFENDER_LIMIT);

    RetailerReport {
        retailer_name: retailer_name.to_string(),
        total_products,
        compliant_count,
        deviated_count: total_products - compliant_count,
        compliance_rate_percent,
        average_absolute_deviation_percent,
        top_offenders,
        records,
    }
}

/// Non-compliant records by descending absolute deviation, at most `limit`.
/// Ties keep their original order.
pub fn top_offenders(records: &[ReportRecord], limit: usize) -> Vec<ReportRecord> {
    let mut offenders: Vec<&ReportRecord> = records
        .iter()
        .filter(|r| r.status == ComplianceStatus::NonCompliant)
        .collect();

    // sort_by is stable
    offenders.sort_by(|a, b| {
        let a = a.result.absolute_deviation().unwrap_or(0.0);
        let b = b.result.absolute_deviation().unwrap_or(0.0);
        b.total_cmp(&a)
    });

    offenders.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, deviation: Option<f64>) -> DeviationResult {
        DeviationResult {
            product_name: name.into(),
            reference_price: 100.0,
            observed_price: deviation.map(|d| 100.0 + d),
            deviation_percent: deviation,
        }
    }

    #[test]
    fn empty_input_yields_zero_metrics() {
        let report = aggregate("bestbuy", Vec::new());
        assert_eq!(report.total_products, 0);
        assert_eq!(report.compliant_count, 0);
        assert_eq!(report.deviated_count, 0);
        assert_eq!(report.compliance_rate_percent, 0.0);
        assert_eq!(report.average_absolute_deviation_percent, 0.0);
        assert!(report.top_offenders.is_empty());
    }

    #[test]
    fn counts_and_rates() {
        let report = aggregate(
            "newegg",
            vec![
                result("A", Some(-10.0)),
                result("B", Some(-50.0)),
                result("C", Some(0.0)),
            ],
        );
        assert_eq!(report.retailer_name, "newegg");
        assert_eq!(report.total_products, 3);
        assert_eq!(report.compliant_count, 1);
        assert_eq!(report.deviated_count, 2);
        assert!((report.compliance_rate_percent - 100.0 / 3.0).abs() < 1e-9);
        assert!((report.average_absolute_deviation_percent - 20.0).abs() < 1e-9);
    }

    #[test]
    fn undetermined_excluded_from_average() {
        let report = aggregate(
            "bestbuy",
            vec![result("A", Some(10.0)), result("B", None), result("C", None)],
        );
        assert!((report.average_absolute_deviation_percent - 10.0).abs() < 1e-9);
        // Undetermined still counts as not compliant.
        assert_eq!(report.deviated_count, 3);
        assert_eq!(report.compliance_rate_percent, 0.0);
    }

    #[test]
    fn nan_deviation_stays_out_of_average() {
        let report = aggregate(
            "bestbuy",
            vec![result("A", Some(10.0)), result("B", Some(f64::NAN))],
        );
        assert_eq!(report.records[1].status, ComplianceStatus::Undetermined);
        assert!((report.average_absolute_deviation_percent - 10.0).abs() < 1e-9);
    }

    #[test]
    fn positions_are_one_based_in_input_order() {
        let report = aggregate("r", vec![result("X", None), result("Y", Some(1.0))]);
        assert_eq!(report.records[0].position, 1);
        assert_eq!(report.records[0].result.product_name, "X");
        assert_eq!(report.records[1].position, 2);
        assert_eq!(report.records[1].status, ComplianceStatus::Compliant);
    }

    #[test]
    fn top_offenders_ranked_and_capped() {
        let report = aggregate(
            "r",
            vec![
                result("a", Some(16.0)),
                result("b", Some(-40.0)),
                result("c", Some(12.0)),
                result("d", Some(25.0)),
                result("e", Some(-25.0)),
                result("f", Some(90.0)),
                result("g", Some(17.0)),
                result("h", None),
            ],
        );
        let names: Vec<&str> = report
            .top_offenders
            .iter()
            .map(|r| r.result.product_name.as_str())
            .collect();
        // d and e tie at 25; d comes first in input order.
        assert_eq!(names, vec!["f", "b", "d", "e", "g"]);
        assert!(report
            .top_offenders
            .iter()
            .all(|r| r.status == ComplianceStatus::NonCompliant));
    }

    #[test]
    fn top_offenders_keep_record_positions() {
        let report = aggregate("r", vec![result("a", Some(1.0)), result("b", Some(30.0))]);
        assert_eq!(report.top_offenders.len(), 1);
        assert_eq!(report.top_offenders[0].position, 2);
    }
}
