use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;

use crate::aggregate::aggregate;
use crate::deviation::compute_deviation;
use crate::error::ReconError;
use crate::matcher::{match_products, normalize_key};
use crate::model::{ComplianceReport, ObservedListing, ReconInput, ReferenceProduct, RetailerReport};

/// Run reconciliation over pre-loaded records.
pub fn run(input: &ReconInput) -> Result<ComplianceReport, ReconError> {
    build_report(&input.reference, &input.listings)
}

/// Build one [`RetailerReport`] per retailer key in `listings`.
///
/// The reference list is validated first; any data-integrity problem fails
/// the whole evaluation. Retailers are evaluated in parallel, but the output
/// does not depend on completion order: the map is ordered by retailer name
/// and each report follows reference order.
pub fn build_report(
    reference: &[ReferenceProduct],
    listings: &BTreeMap<String, Vec<ObservedListing>>,
) -> Result<ComplianceReport, ReconError> {
    validate_reference(reference)?;

    let retailers = listings
        .par_iter()
        .map(|(retailer_name, observed)| {
            retailer_report(retailer_name, reference, observed)
                .map(|report| (retailer_name.clone(), report))
        })
        .collect::<Result<BTreeMap<String, RetailerReport>, ReconError>>()?;

    Ok(ComplianceReport { retailers })
}

/// Match → deviation → aggregate for a single retailer.
///
/// Does not check the reference list for duplicates; [`build_report`] does
/// that once for all retailers.
pub fn retailer_report(
    retailer_name: &str,
    reference: &[ReferenceProduct],
    observed: &[ObservedListing],
) -> Result<RetailerReport, ReconError> {
    let results = match_products(reference, observed)
        .iter()
        .map(compute_deviation)
        .collect::<Result<Vec<_>, _>>()?;

    let report = aggregate(retailer_name, results);
    tracing::debug!(
        retailer = retailer_name,
        products = report.total_products,
        compliant = report.compliant_count,
        offenders = report.top_offenders.len(),
        "retailer report built"
    );
    Ok(report)
}

/// Reject reference lists that would make the join ambiguous or the
/// deviation meaningless.
pub fn validate_reference(reference: &[ReferenceProduct]) -> Result<(), ReconError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(reference.len());

    for (i, product) in reference.iter().enumerate() {
        let key = normalize_key(&product.product_name);
        if key.is_empty() {
            return Err(ReconError::EmptyProductName { position: i + 1 });
        }
        if !product.reference_price.is_finite() {
            return Err(ReconError::NonFiniteReferencePrice {
                product_name: key.to_string(),
            });
        }
        if product.reference_price < 0.0 {
            return Err(ReconError::NegativeReferencePrice {
                product_name: key.to_string(),
                price: product.reference_price,
            });
        }
        if !seen.insert(key) {
            return Err(ReconError::DuplicateProduct {
                product_name: key.to_string(),
            });
        }
    }

    Ok(())
}
