use std::collections::BTreeMap;

use super::model::{GapDataset, GapRecord, RawTable};
use super::resolver::{display_header, ResolvedColumns};

// ---------------------------------------------------------------------------
// Crop normalization
// ---------------------------------------------------------------------------

/// Cereals outside the evaluation scope; any crop text containing one of
/// these (case-insensitive) drops the whole row.
const EXCLUDED_CROPS: &[&str] = &["rye", "triticale", "spelt", "oat"];

/// Canonical crop groups. Matched as case-sensitive substrings, first match
/// in this order wins, so "Barley spring" and "Barley winter" fold together.
const CROP_GROUPS: &[&str] = &["Barley", "Wheat", "Cabbage", "Onion", "Rape"];

/// Normalize one crop cell.
///
/// * `None` cell → empty string (the row is kept).
/// * Excluded crop → `None` (the row is dropped from the pipeline).
/// * Group member → the canonical group name.
/// * Anything else → the original text, unchanged.
pub fn normalize_crop(raw: Option<&str>) -> Option<String> {
    let crop = raw.unwrap_or("");
    let lower = crop.to_lowercase();
    if EXCLUDED_CROPS.iter().any(|t| lower.contains(t)) {
        return None;
    }
    for group in CROP_GROUPS {
        if crop.contains(group) {
            return Some((*group).to_string());
        }
    }
    Some(crop.to_string())
}

// ---------------------------------------------------------------------------
// Canonical record construction
// ---------------------------------------------------------------------------

/// Turn a resolved raw table into the canonical dataset.
///
/// Row exclusion here is deliberate, never defaulting:
/// * excluded crops (see [`normalize_crop`]);
/// * rows with a blank product cell (a GAP without a formulation identifies
///   nothing).
/// Blank zone cells merely leave that candidate column absent for the row;
/// whether that excludes the row is decided at aggregation time, once the
/// active zone column is known.
pub fn build_dataset(table: &RawTable, cols: &ResolvedColumns) -> GapDataset {
    let zone_columns: Vec<String> = cols
        .zone_columns
        .iter()
        .map(|&i| display_header(&table.headers[i]))
        .collect();
    let rate_columns: Vec<String> = cols
        .rate_columns
        .iter()
        .map(|&i| display_header(&table.headers[i]))
        .collect();

    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let Some(crop) = normalize_crop(table.cell(row, cols.crop).as_text()) else {
            continue;
        };
        let Some(product) = table.cell(row, cols.product).to_text() else {
            continue;
        };

        let mut zones = BTreeMap::new();
        for (&idx, name) in cols.zone_columns.iter().zip(&zone_columns) {
            if let Some(v) = table.cell(row, idx).to_text() {
                zones.insert(name.clone(), v);
            }
        }

        let mut rates = BTreeMap::new();
        for (&idx, name) in cols.rate_columns.iter().zip(&rate_columns) {
            if let Some(v) = table.cell(row, idx).as_f64() {
                rates.insert(name.clone(), v);
            }
        }

        records.push(GapRecord {
            product,
            crop,
            bbch_end: table.cell(row, cols.bbch_end).as_f64(),
            max_applications: table.cell(row, cols.max_applications).as_i64(),
            phi: table.cell(row, cols.phi).as_f64(),
            min_interval: table.cell(row, cols.min_interval).as_f64(),
            max_interval: cols
                .max_interval
                .and_then(|i| table.cell(row, i).as_f64()),
            zones,
            rates,
        });
    }

    GapDataset {
        records,
        zone_columns,
        rate_columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, RawTable};
    use crate::data::resolver::resolve;

    fn raw_table(rows: Vec<Vec<CellValue>>) -> RawTable {
        let headers = [
            "Product\n(PLT short)",
            "Regulatory Zone",
            "Crop",
            "applicationn timing BBCH end",
            "Max # of applns.\n(per block)",
            "Application rate PTZ (g/ha)",
            "PHI",
            "Minimum appl. interval\n(days)",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        RawTable { headers, rows }
    }

    #[test]
    fn numeric_product_and_zone_cells_keep_the_row() {
        // product codes and zone labels arrive as bare numbers in some
        // workbooks; they are keys, not criteria, and must survive as text
        let table = raw_table(vec![vec![
            CellValue::Integer(1234),
            CellValue::Integer(2),
            CellValue::String("Barley spring".to_string()),
            CellValue::Float(69.0),
            CellValue::Integer(3),
            CellValue::Float(120.0),
            CellValue::Integer(14),
            CellValue::Integer(7),
        ]]);
        let cols = resolve(&table.headers).unwrap();
        let dataset = build_dataset(&table, &cols);

        assert_eq!(dataset.len(), 1);
        let rec = &dataset.records[0];
        assert_eq!(rec.product, "1234");
        assert_eq!(rec.zones.get("Regulatory Zone").map(String::as_str), Some("2"));
    }

    #[test]
    fn blank_product_cells_still_drop_the_row() {
        let table = raw_table(vec![vec![
            CellValue::Null,
            CellValue::String("Z1".to_string()),
            CellValue::String("Barley spring".to_string()),
            CellValue::Float(69.0),
            CellValue::Integer(3),
            CellValue::Float(120.0),
            CellValue::Integer(14),
            CellValue::Integer(7),
        ]]);
        let cols = resolve(&table.headers).unwrap();
        assert!(build_dataset(&table, &cols).is_empty());
    }

    #[test]
    fn excluded_cereals_drop_the_row() {
        assert_eq!(normalize_crop(Some("Rye winter")), None);
        assert_eq!(normalize_crop(Some("TRITICALE")), None);
        assert_eq!(normalize_crop(Some("Spelt, dinkel")), None);
        assert_eq!(normalize_crop(Some("Oat")), None);
        // exclusion is substring + case-insensitive
        assert_eq!(normalize_crop(Some("winter triticale mix")), None);
    }

    #[test]
    fn group_members_fold_to_the_canonical_name() {
        assert_eq!(normalize_crop(Some("Barley spring")).as_deref(), Some("Barley"));
        assert_eq!(normalize_crop(Some("Wheat, durum")).as_deref(), Some("Wheat"));
        assert_eq!(normalize_crop(Some("Head Cabbage")).as_deref(), Some("Cabbage"));
        assert_eq!(normalize_crop(Some("Onion, bulb")).as_deref(), Some("Onion"));
        assert_eq!(normalize_crop(Some("Rape seed winter")).as_deref(), Some("Rape"));
    }

    #[test]
    fn group_matching_is_case_sensitive() {
        // lowercase "wheat" is not a group member; the text passes unchanged
        assert_eq!(
            normalize_crop(Some("winter wheat")).as_deref(),
            Some("winter wheat")
        );
    }

    #[test]
    fn unknown_crops_pass_unchanged_and_blank_becomes_empty() {
        assert_eq!(normalize_crop(Some("Sugar beet")).as_deref(), Some("Sugar beet"));
        assert_eq!(normalize_crop(None).as_deref(), Some(""));
    }
}
