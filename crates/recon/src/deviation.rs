use crate::error::ReconError;
use crate::model::{DeviationResult, MatchedRecord};

/// Percentage deviation of the observed price from the reference price.
///
/// Unknown (`None`) when the product is not listed, the reference price is
/// zero, or the result is not finite (NaN or infinite observed price).
/// Values are left unrounded.
pub fn compute_deviation(record: &MatchedRecord) -> Result<DeviationResult, ReconError> {
    if record.reference_price < 0.0 {
        return Err(ReconError::NegativeReferencePrice {
            product_name: record.product_name.clone(),
            price: record.reference_price,
        });
    }

    let deviation_percent = match record.observed_price {
        Some(observed) if record.reference_price > 0.0 => {
            Some((observed - record.reference_price) / record.reference_price * 100.0)
        }
        _ => None,
    }
    .filter(|d| d.is_finite());

    Ok(DeviationResult {
        product_name: record.product_name.clone(),
        reference_price: record.reference_price,
        observed_price: record.observed_price,
        deviation_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(reference_price: f64, observed_price: Option<f64>) -> MatchedRecord {
        MatchedRecord {
            product_name: "Widget".into(),
            reference_price,
            observed_price,
        }
    }

    #[test]
    fn above_reference() {
        let r = compute_deviation(&record(100.0, Some(103.0))).unwrap();
        assert!((r.deviation_percent.unwrap() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn below_reference() {
        let r = compute_deviation(&record(200.0, Some(150.0))).unwrap();
        assert!((r.deviation_percent.unwrap() + 25.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_observed_price_is_unknown() {
        let r = compute_deviation(&record(100.0, Some(f64::NAN))).unwrap();
        assert_eq!(r.deviation_percent, None);
        let r = compute_deviation(&record(100.0, Some(f64::INFINITY))).unwrap();
        assert_eq!(r.deviation_percent, None);
        assert_eq!(r.observed_price, Some(f64::INFINITY));
    }

    #[test]
    fn equal_prices_are_zero_not_unknown() {
        let r = compute_deviation(&record(100.0, Some(100.0))).unwrap();
        assert_eq!(r.deviation_percent, Some(0.0));
    }

    #[test]
    fn missing_listing_is_unknown() {
        let r = compute_deviation(&record(100.0, None)).unwrap();
        assert_eq!(r.deviation_percent, None);
        assert_eq!(r.observed_price, None);
    }

    #[test]
    fn zero_reference_is_unknown() {
        let r = compute_deviation(&record(0.0, Some(10.0))).unwrap();
        assert_eq!(r.deviation_percent, None);
    }

    #[test]
    fn negative_reference_rejected() {
        let err = compute_deviation(&record(-1.0, Some(10.0))).unwrap_err();
        assert!(matches!(err, ReconError::NegativeReferencePrice { .. }));
        assert!(err.to_string().contains("negative price"));
    }

    #[test]
    fn no_rounding_applied() {
        let r = compute_deviation(&record(3.0, Some(4.0))).unwrap();
        let d = r.deviation_percent.unwrap();
        assert!((d - 100.0 / 3.0).abs() < 1e-9);
        assert_ne!(d, 33.33);
    }
}
