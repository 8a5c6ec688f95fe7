//! `pwatch products`: reference catalog with retailer prices side by side.

use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;
use pricewatch_recon::{round2, Catalog, CatalogRow};
use serde::Serialize;

use crate::evaluate::evaluate;
use crate::CliError;

#[derive(Serialize)]
struct ProductsOutput<'a> {
    retailers: &'a [String],
    rows: Vec<&'a CatalogRow>,
}

pub fn cmd_products(
    config_path: &Path,
    date: Option<NaiveDate>,
    search: Option<String>,
    json_output: bool,
) -> Result<(), CliError> {
    let eval = evaluate(config_path, date)?;
    let catalog = Catalog::build(&eval.loaded.input.reference, &eval.report);

    let rows = match search.as_deref() {
        Some(query) => catalog.search(query),
        None => catalog.rows.iter().collect(),
    };

    if json_output {
        let output = ProductsOutput {
            retailers: &catalog.retailers,
            rows,
        };
        let json_str = serde_json::to_string_pretty(&output)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    let labels: Vec<&str> = catalog.retailers.iter().map(|k| eval.label(k)).collect();
    let stdout = io::stdout();
    render_table(&catalog, &labels, &rows, &mut stdout.lock())
        .map_err(|e| CliError::io(e.to_string()))
}

fn render_table(
    catalog: &Catalog,
    labels: &[&str],
    rows: &[&CatalogRow],
    out: &mut impl Write,
) -> io::Result<()> {
    let name_width = rows
        .iter()
        .map(|r| r.product_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Product".len());
    let price_widths: Vec<usize> = labels.iter().map(|l| l.chars().count().max(10)).collect();

    write!(out, "{:>4}  {:<name_width$}  {:>10}", "ID", "Product", "MSRP")?;
    for (label, width) in labels.iter().zip(&price_widths) {
        write!(out, "  {:>width$}", label, width = *width)?;
    }
    writeln!(out)?;

    for row in rows {
        write!(
            out,
            "{:>4}  {:<name_width$}  {:>10.2}",
            row.id,
            row.product_name,
            round2(row.reference_price),
        )?;
        for (key, width) in catalog.retailers.iter().zip(&price_widths) {
            let cell = match row.prices.get(key).copied().flatten() {
                Some(price) => format!("{:.2}", round2(price)),
                None => "-".to_string(),
            };
            write!(out, "  {:>width$}", cell, width = *width)?;
        }
        writeln!(out)?;
    }

    writeln!(out)?;
    for (key, label) in catalog.retailers.iter().zip(labels) {
        writeln!(
            out,
            "{} lists {} of {} products",
            label,
            catalog.listed_count(key),
            catalog.rows.len(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_recon::{build_report, ObservedListing, ReferenceProduct};
    use std::collections::BTreeMap;

    #[test]
    fn table_layout() {
        let reference = vec![
            ReferenceProduct::new("Dell P2422H", 200.0),
            ReferenceProduct::new("Dell S2721D", 100.0),
        ];
        let mut listings = BTreeMap::new();
        listings.insert(
            "newegg".to_string(),
            vec![ObservedListing::listed("Dell S2721D", 99.5)],
        );
        let report = build_report(&reference, &listings).unwrap();
        let catalog = Catalog::build(&reference, &report);
        let rows: Vec<&CatalogRow> = catalog.rows.iter().collect();

        let mut out = Vec::new();
        render_table(&catalog, &["Newegg"], &rows, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].contains("Product"));
        assert!(lines[0].ends_with("Newegg"));
        assert!(lines[1].contains("Dell S2721D"));
        assert!(lines[1].ends_with("99.50"));
        assert!(lines[2].contains("Dell P2422H"));
        assert!(lines[2].ends_with('-'));
        assert_eq!(lines[4], "Newegg lists 1 of 2 products");
    }
}
