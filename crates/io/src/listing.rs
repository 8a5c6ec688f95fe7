//! CSV snapshot parsing into engine records.
//!
//! Raw cells are validated here so the engine only ever sees finite,
//! non-negative prices or an explicit "not listed".

use std::collections::HashMap;

use pricewatch_recon::{ObservedListing, ReferenceProduct};

use crate::error::SourceError;

/// Cell values that mean "this retailer does not sell the product".
const ABSENT_MARKERS: &[&str] = &["", "-", "n/a", "na", "nan", "none", "not sold in this retailer"];

/// Parse a scraped price cell.
///
/// Currency symbols and thousands separators are stripped. Absent markers
/// yield `Ok(None)`; negative or non-finite values are rejected.
pub fn parse_price(source_name: &str, row: usize, raw: &str) -> Result<Option<f64>, SourceError> {
    let trimmed = raw.trim();
    if ABSENT_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        return Ok(None);
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();

    let invalid = || SourceError::PriceParse {
        source_name: source_name.to_string(),
        row,
        value: raw.to_string(),
    };

    let value: f64 = cleaned.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok(Some(value))
}

/// A CSV snapshot with its header row resolved. Borrows the snapshot text.
struct Table<'a> {
    source_name: &'a str,
    headers: Vec<String>,
    reader: csv::Reader<&'a [u8]>,
}

impl<'a> Table<'a> {
    fn open(source_name: &'a str, csv_data: &'a str) -> Result<Self, SourceError> {
        let data = csv_data.strip_prefix('\u{feff}').unwrap_or(csv_data);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| csv_err(source_name, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(Self {
            source_name,
            headers,
            reader,
        })
    }

    fn column(&self, name: &str) -> Result<usize, SourceError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| SourceError::MissingColumn {
                source_name: self.source_name.to_string(),
                column: name.to_string(),
            })
    }

    /// Data rows with their 1-based row number (header excluded).
    fn rows(
        &mut self,
    ) -> impl Iterator<Item = Result<(usize, csv::StringRecord), SourceError>> + use<'_, 'a> {
        let source_name = self.source_name;
        self.reader.records().enumerate().map(move |(i, record)| {
            record
                .map(|r| (i + 1, r))
                .map_err(|e| csv_err(source_name, e))
        })
    }
}

fn csv_err(source_name: &str, e: csv::Error) -> SourceError {
    SourceError::Csv {
        source_name: source_name.to_string(),
        message: e.to_string(),
    }
}

/// Load the manufacturer price list. Every row must have a price.
pub fn load_reference_csv(
    source_name: &str,
    csv_data: &str,
    product_column: &str,
    price_column: &str,
) -> Result<Vec<ReferenceProduct>, SourceError> {
    let mut table = Table::open(source_name, csv_data)?;
    let name_idx = table.column(product_column)?;
    let price_idx = table.column(price_column)?;

    let mut products = Vec::new();
    for row in table.rows() {
        let (row, record) = row?;
        let product_name = record.get(name_idx).unwrap_or("").trim().to_string();
        let price = parse_price(source_name, row, record.get(price_idx).unwrap_or(""))?;
        let Some(reference_price) = price else {
            return Err(SourceError::MissingReferencePrice {
                source_name: source_name.to_string(),
                row,
                product_name,
            });
        };
        products.push(ReferenceProduct {
            product_name,
            reference_price,
        });
    }

    Ok(products)
}

/// Load a retailer snapshot keyed by product name.
pub fn load_listings_by_name(
    source_name: &str,
    csv_data: &str,
    product_column: &str,
    price_column: &str,
) -> Result<Vec<ObservedListing>, SourceError> {
    let mut table = Table::open(source_name, csv_data)?;
    let name_idx = table.column(product_column)?;
    let price_idx = table.column(price_column)?;

    let mut listings = Vec::new();
    for row in table.rows() {
        let (row, record) = row?;
        let product_name = record.get(name_idx).unwrap_or("").trim();
        if product_name.is_empty() {
            continue;
        }
        let observed_price = parse_price(source_name, row, record.get(price_idx).unwrap_or(""))?;
        listings.push(ObservedListing::new(product_name, observed_price));
    }

    Ok(listings)
}

/// Load a retailer snapshot keyed by SKU, resolving product names through
/// `index`. Rows whose SKU is not in the index are dropped.
pub fn load_listings_by_sku(
    source_name: &str,
    csv_data: &str,
    sku_column: &str,
    price_column: &str,
    index: &SkuIndex,
) -> Result<Vec<ObservedListing>, SourceError> {
    let mut table = Table::open(source_name, csv_data)?;
    let sku_idx = table.column(sku_column)?;
    let price_idx = table.column(price_column)?;

    let mut listings = Vec::new();
    let mut unknown = 0usize;
    for row in table.rows() {
        let (row, record) = row?;
        let sku = record.get(sku_idx).unwrap_or("").trim();
        if sku.is_empty() {
            continue;
        }
        let Some(product_name) = index.product_name(sku_column, sku) else {
            unknown += 1;
            tracing::debug!(source = source_name, sku, "SKU not in index, row dropped");
            continue;
        };
        let observed_price = parse_price(source_name, row, record.get(price_idx).unwrap_or(""))?;
        listings.push(ObservedListing::new(product_name, observed_price));
    }

    if unknown > 0 {
        tracing::info!(source = source_name, unknown, "rows with unindexed SKUs dropped");
    }

    Ok(listings)
}

/// SKU → product name, per retailer SKU column.
#[derive(Debug, Clone, Default)]
pub struct SkuIndex {
    by_column: HashMap<String, HashMap<String, String>>,
}

impl SkuIndex {
    /// Build from an index CSV that has a product name column plus one SKU
    /// column per SKU-keyed retailer. Blank SKUs are skipped; the first
    /// row for a SKU wins.
    pub fn from_csv(
        csv_data: &str,
        product_column: &str,
        sku_columns: &[&str],
    ) -> Result<Self, SourceError> {
        const SOURCE: &str = "index";

        let mut table = Table::open(SOURCE, csv_data)?;
        let name_idx = table.column(product_column)?;
        let sku_idx: Vec<(String, usize)> = sku_columns
            .iter()
            .map(|c| table.column(c).map(|i| (c.to_string(), i)))
            .collect::<Result<_, _>>()?;

        let mut by_column: HashMap<String, HashMap<String, String>> = sku_idx
            .iter()
            .map(|(c, _)| (c.clone(), HashMap::new()))
            .collect();

        for row in table.rows() {
            let (_, record) = row?;
            let product_name = record.get(name_idx).unwrap_or("").trim();
            if product_name.is_empty() {
                continue;
            }
            for (column, idx) in &sku_idx {
                let sku = record.get(*idx).unwrap_or("").trim();
                if sku.is_empty() {
                    continue;
                }
                if let Some(map) = by_column.get_mut(column) {
                    map.entry(sku.to_string())
                        .or_insert_with(|| product_name.to_string());
                }
            }
        }

        Ok(Self { by_column })
    }

    pub fn product_name(&self, sku_column: &str, sku: &str) -> Option<&str> {
        self.by_column
            .get(sku_column)?
            .get(sku)
            .map(String::as_str)
    }

    pub fn len(&self, sku_column: &str) -> usize {
        self.by_column.get(sku_column).map_or(0, HashMap::len)
    }
}
