use std::io::Write;

use anyhow::{Context, Result};

use super::model::{labels, CriticalRecord, CriticalTable};

// ---------------------------------------------------------------------------
// Result export
// ---------------------------------------------------------------------------

// Spreadsheet applications only detect UTF-8 in delimited text when the BOM
// is present; without it non-ASCII zone and product names get mangled.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Serialize the filtered critical table as UTF-8 CSV.
///
/// Column order matches the aggregation output: the four group-key columns
/// first, then the four criteria. The zone and rate headers carry the source
/// header text the user selected; the rest use the canonical labels. Values
/// are written as-is, no transformation. An empty record slice still yields
/// a valid header-only file.
pub fn write_csv<W: Write>(
    table: &CriticalTable,
    records: &[&CriticalRecord],
    mut out: W,
) -> Result<()> {
    out.write_all(UTF8_BOM).context("writing BOM")?;

    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([
            table.zone_column.name(),
            labels::PRODUCT,
            labels::CROP,
            labels::MAX_APPLICATIONS,
            table.rate_column.name(),
            labels::BBCH_END,
            labels::PHI,
            labels::MIN_INTERVAL,
        ])
        .context("writing header row")?;

    for rec in records {
        writer
            .write_record([
                rec.key.zone.clone(),
                rec.key.product.clone(),
                rec.key.crop.clone(),
                rec.key.max_applications.to_string(),
                fmt_number(rec.rate),
                fmt_number(rec.bbch_end),
                fmt_number(rec.phi),
                fmt_number(rec.min_interval),
            ])
            .context("writing record")?;
    }

    writer.flush().context("flushing CSV output")?;
    Ok(())
}

/// Whole numbers without the trailing `.0`, blanks for missing values.
fn fmt_number(v: Option<f64>) -> String {
    match v {
        None => String::new(),
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{GapDataset, GroupKey};

    fn table_with(records: Vec<CriticalRecord>) -> CriticalTable {
        let ds = GapDataset {
            records: Vec::new(),
            zone_columns: vec!["Residues region".to_string()],
            rate_columns: vec!["Application rate PTZ (g/ha)".to_string()],
        };
        CriticalTable {
            zone_column: ds.select_zone("Residues region").unwrap(),
            rate_column: ds.select_rate("Application rate PTZ (g/ha)").unwrap(),
            records,
        }
    }

    fn critical(zone: &str, product: &str, crop: &str) -> CriticalRecord {
        CriticalRecord {
            key: GroupKey {
                zone: zone.to_string(),
                product: product.to_string(),
                crop: crop.to_string(),
                max_applications: 3,
            },
            rate: Some(120.0),
            bbch_end: Some(71.0),
            phi: Some(10.5),
            min_interval: None,
        }
    }

    #[test]
    fn empty_table_exports_header_only() {
        let table = table_with(Vec::new());
        let mut out = Vec::new();
        write_csv(&table, &[], &mut out).unwrap();

        let text = String::from_utf8(out[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Residues region,Product (PLT short),Crop"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn non_ascii_values_round_trip() {
        let table = table_with(vec![critical("Süd-Europa", "Prodüct µ", "Barley")]);
        let records: Vec<&CriticalRecord> = table.records.iter().collect();
        let mut out = Vec::new();
        write_csv(&table, &records, &mut out).unwrap();

        assert_eq!(&out[..3], UTF8_BOM);
        let mut reader = csv::Reader::from_reader(&out[UTF8_BOM.len()..]);
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[0], "Süd-Europa");
        assert_eq!(&row[1], "Prodüct µ");
    }

    #[test]
    fn numbers_are_written_plainly_and_blanks_stay_blank() {
        let table = table_with(vec![critical("Z1", "P1", "Barley")]);
        let records: Vec<&CriticalRecord> = table.records.iter().collect();
        let mut out = Vec::new();
        write_csv(&table, &records, &mut out).unwrap();

        let text = String::from_utf8(out[UTF8_BOM.len()..].to_vec()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "Z1,P1,Barley,3,120,71,10.5,");
    }
}
