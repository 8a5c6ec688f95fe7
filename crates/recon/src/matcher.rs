use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::model::{MatchedRecord, ObservedListing, ReferenceProduct};

/// Join-key normalization: surrounding whitespace is trimmed, case is kept.
///
/// "Dell S2721D" and " Dell S2721D " join; "dell s2721d" does not.
pub fn normalize_key(product_name: &str) -> &str {
    product_name.trim()
}

/// Join one retailer's listings against the reference list.
///
/// The output has exactly one record per reference product, in reference
/// order. Listings for products outside the reference list are discarded.
/// When a retailer lists the same product more than once, the first listing
/// wins.
pub fn match_products(
    reference: &[ReferenceProduct],
    observed: &[ObservedListing],
) -> Vec<MatchedRecord> {
    let mut by_key: HashMap<&str, Option<f64>> = HashMap::with_capacity(observed.len());
    for listing in observed {
        match by_key.entry(normalize_key(&listing.product_name)) {
            Entry::Vacant(slot) => {
                slot.insert(listing.observed_price);
            }
            Entry::Occupied(_) => {
                tracing::debug!(
                    product = %listing.product_name,
                    "duplicate listing ignored, first occurrence kept"
                );
            }
        }
    }

    reference
        .iter()
        .map(|product| {
            let key = normalize_key(&product.product_name);
            MatchedRecord {
                product_name: key.to_string(),
                reference_price: product.reference_price,
                observed_price: by_key.get(key).copied().flatten(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(items: &[(&str, f64)]) -> Vec<ReferenceProduct> {
        items
            .iter()
            .map(|(name, price)| ReferenceProduct::new(*name, *price))
            .collect()
    }

    #[test]
    fn preserves_reference_order_and_length() {
        let refs = reference(&[("C", 30.0), ("A", 10.0), ("B", 20.0)]);
        let observed = vec![
            ObservedListing::listed("B", 21.0),
            ObservedListing::listed("C", 29.0),
        ];
        let out = match_products(&refs, &observed);
        let names: Vec<&str> = out.iter().map(|m| m.product_name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(out[0].observed_price, Some(29.0));
        assert_eq!(out[1].observed_price, None);
        assert_eq!(out[2].observed_price, Some(21.0));
    }

    #[test]
    fn unknown_listings_discarded() {
        let refs = reference(&[("A", 10.0)]);
        let observed = vec![
            ObservedListing::listed("Z", 99.0),
            ObservedListing::listed("A", 10.0),
        ];
        let out = match_products(&refs, &observed);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].observed_price, Some(10.0));
    }

    #[test]
    fn whitespace_trimmed_case_kept() {
        let refs = reference(&[("  Dell S2721D ", 200.0), ("Dell P2422H", 300.0)]);
        let observed = vec![
            ObservedListing::listed("Dell S2721D", 190.0),
            ObservedListing::listed("dell p2422h", 280.0),
        ];
        let out = match_products(&refs, &observed);
        assert_eq!(out[0].product_name, "Dell S2721D");
        assert_eq!(out[0].observed_price, Some(190.0));
        assert_eq!(out[1].observed_price, None);
    }

    #[test]
    fn first_duplicate_listing_wins() {
        let refs = reference(&[("A", 10.0)]);
        let observed = vec![
            ObservedListing::listed("A", 11.0),
            ObservedListing::listed("A", 50.0),
        ];
        let out = match_products(&refs, &observed);
        assert_eq!(out[0].observed_price, Some(11.0));
    }

    #[test]
    fn unlisted_entry_yields_absent_price() {
        let refs = reference(&[("A", 10.0)]);
        let observed = vec![ObservedListing::unlisted("A")];
        let out = match_products(&refs, &observed);
        assert_eq!(out[0].observed_price, None);
    }

    #[test]
    fn empty_observed() {
        let refs = reference(&[("A", 10.0), ("B", 20.0)]);
        let out = match_products(&refs, &[]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|m| m.observed_price.is_none()));
    }
}
