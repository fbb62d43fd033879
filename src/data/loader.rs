use std::path::Path;

use anyhow::{bail, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// The workbook sheet holding the GAP rows.
pub const SHEET_NAME: &str = "MasterGAP";

/// Rows of title/legend material preceding the header row in the workbook.
pub const HEADER_SKIP_ROWS: usize = 6;

/// Load a raw GAP table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` – Master GAP workbook: sheet `MasterGAP`, header row after
///   six skippable rows
/// * `.csv`  – header row first, one GAP per row
/// * `.json` – records-oriented array: `[{ "Crop": "...", ... }, ...]`
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" => load_xlsx(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

fn load_xlsx(path: &Path) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range(SHEET_NAME)
        .with_context(|| format!("sheet '{SHEET_NAME}' not found"))?;

    let mut rows = range.rows().skip(HEADER_SKIP_ROWS);
    let header_row = rows
        .next()
        .with_context(|| format!("sheet '{SHEET_NAME}' has no header row"))?;

    let headers: Vec<String> = header_row.iter().map(cell_text).collect();

    let data_rows: Vec<Vec<CellValue>> = rows
        .map(|row| {
            let mut cells: Vec<CellValue> = row.iter().map(cell_value).collect();
            cells.resize(headers.len(), CellValue::Null);
            cells
        })
        .collect();

    Ok(RawTable {
        headers,
        rows: data_rows,
    })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        // formula errors (#N/A, #DIV/0!, ...) carry no usable value
        Data::Error(_) => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the raw column names (quoted headers may
/// contain embedded line breaks, exactly as exported from the workbook),
/// then one GAP per row.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mut cells: Vec<CellValue> = record.iter().map(CellValue::from_text).collect();
        cells.resize(headers.len(), CellValue::Null);
        rows.push(cells);
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Crop": "Barley spring", "Regulatory Zone": "EU-N", "PHI": 14, ... },
///   ...
/// ]
/// ```
///
/// The header list is the union of all keys; rows missing a key get a null
/// cell there.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows: Vec<Vec<CellValue>> = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn csv_round_trip_with_messy_headers() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        // quoted header with an embedded line break, as Excel exports it
        write!(
            file,
            "\"Product\nPLT\",Crop,PHI\nP1,Barley spring,14\nP2,,\n"
        )
        .unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.headers, vec!["Product\nPLT", "Crop", "PHI"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], CellValue::Integer(14));
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Null);
    }

    #[test]
    fn json_rows_with_uneven_keys_are_null_padded() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Crop": "Barley", "PHI": 14}}, {{"Crop": "Wheat", "Zone": "Z1"}}]"#
        )
        .unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.rows.len(), 2);
        let zone_idx = table.headers.iter().position(|h| h == "Zone").unwrap();
        assert_eq!(table.rows[0][zone_idx], CellValue::Null);
        assert_eq!(
            table.rows[1][zone_idx],
            CellValue::String("Z1".to_string())
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("gap_table.pdf")).unwrap_err();
        assert!(err.to_string().contains(".pdf"));
    }

    #[test]
    fn missing_workbook_is_an_error() {
        assert!(load_file(Path::new("/nonexistent/master.xlsx")).is_err());
    }
}
