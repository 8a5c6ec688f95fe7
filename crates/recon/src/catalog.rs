//! Combined product view: every reference product with each retailer's
//! observed price side by side.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::matcher::normalize_key;
use crate::model::{ComplianceReport, ReferenceProduct};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    /// 1-based display id, assigned after ordering.
    pub id: usize,
    pub product_name: String,
    pub reference_price: f64,
    /// Retailer name → observed price. `None` = not sold at that retailer.
    pub prices: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub retailers: Vec<String>,
    pub rows: Vec<CatalogRow>,
}

impl Catalog {
    /// One row per reference product, cheapest first. Products with equal
    /// reference prices keep reference order.
    pub fn build(reference: &[ReferenceProduct], report: &ComplianceReport) -> Self {
        let retailers: Vec<String> = report.retailers.keys().cloned().collect();
        let observed: Vec<(&String, HashMap<&str, Option<f64>>)> = report
            .iter()
            .map(|(retailer, retailer_report)| {
                let prices = retailer_report
                    .records
                    .iter()
                    .map(|r| (r.result.product_name.as_str(), r.result.observed_price))
                    .collect();
                (retailer, prices)
            })
            .collect();

        let mut products: Vec<&ReferenceProduct> = reference.iter().collect();
        products.sort_by(|a, b| a.reference_price.total_cmp(&b.reference_price));

        let rows = products
            .into_iter()
            .enumerate()
            .map(|(i, product)| {
                let name = normalize_key(&product.product_name);
                let prices = observed
                    .iter()
                    .map(|(retailer, by_name)| {
                        ((*retailer).clone(), by_name.get(name).copied().flatten())
                    })
                    .collect();
                CatalogRow {
                    id: i + 1,
                    product_name: name.to_string(),
                    reference_price: product.reference_price,
                    prices,
                }
            })
            .collect();

        Self { retailers, rows }
    }

    /// Number of catalog products the retailer lists.
    pub fn listed_count(&self, retailer: &str) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row.prices.get(retailer), Some(Some(_))))
            .count()
    }

    /// Case-insensitive substring search on product name. An empty query
    /// returns every row.
    pub fn search(&self, query: &str) -> Vec<&CatalogRow> {
        let needle = query.trim().to_lowercase();
        self.rows
            .iter()
            .filter(|row| row.product_name.to_lowercase().contains(&needle))
            .collect()
    }
}
