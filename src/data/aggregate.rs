use std::collections::BTreeMap;

use super::model::{CriticalRecord, CriticalTable, GapDataset, GroupKey, RateColumn, ZoneColumn};

// ---------------------------------------------------------------------------
// Critical-value aggregation
// ---------------------------------------------------------------------------

/// Reduce the canonical dataset to one [`CriticalRecord`] per distinct
/// (zone, product, crop, application count) group.
///
/// Each criterion is folded independently over the group: the max rate, the
/// latest BBCH stage, the shortest PHI and the shortest application interval
/// need not come from the same source row. This mirrors the established
/// evaluation procedure (multi-application rate interactions are not yet
/// evaluated) and must not be replaced by a joint single-row selection.
///
/// Rows with no value in the active zone column or with no application count
/// belong to no group and are skipped. Blank criteria cells are ignored by
/// the folds.
///
/// Deterministic: grouping uses a `BTreeMap`, so the same input rows in any
/// order produce the same table.
pub fn aggregate(
    dataset: &GapDataset,
    zone: &ZoneColumn,
    rate: &RateColumn,
) -> CriticalTable {
    let mut groups: BTreeMap<GroupKey, CriticalRecord> = BTreeMap::new();

    for rec in &dataset.records {
        let Some(zone_value) = rec.zones.get(zone.name()) else {
            continue;
        };
        let Some(max_applications) = rec.max_applications else {
            continue;
        };

        let key = GroupKey {
            zone: zone_value.clone(),
            product: rec.product.clone(),
            crop: rec.crop.clone(),
            max_applications,
        };

        let entry = groups.entry(key.clone()).or_insert(CriticalRecord {
            key,
            rate: None,
            bbch_end: None,
            phi: None,
            min_interval: None,
        });

        entry.rate = fold_max(entry.rate, rec.rates.get(rate.name()).copied());
        entry.bbch_end = fold_max(entry.bbch_end, rec.bbch_end);
        entry.phi = fold_min(entry.phi, rec.phi);
        entry.min_interval = fold_min(entry.min_interval, rec.min_interval);
    }

    CriticalTable {
        zone_column: zone.clone(),
        rate_column: rate.clone(),
        records: groups.into_values().collect(),
    }
}

fn fold_max(acc: Option<f64>, v: Option<f64>) -> Option<f64> {
    match (acc, v) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

fn fold_min(acc: Option<f64>, v: Option<f64>) -> Option<f64> {
    match (acc, v) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::data::model::GapRecord;

    const ZONE: &str = "Regulatory Zone";
    const RATE: &str = "Application rate PTZ (g/ha)";

    fn record(
        zone: &str,
        product: &str,
        crop: &str,
        bbch: f64,
        maxapp: i64,
        rate: f64,
        phi: f64,
        min_interval: f64,
    ) -> GapRecord {
        GapRecord {
            product: product.to_string(),
            crop: crop.to_string(),
            bbch_end: Some(bbch),
            max_applications: Some(maxapp),
            phi: Some(phi),
            min_interval: Some(min_interval),
            max_interval: None,
            zones: BTreeMap::from([(ZONE.to_string(), zone.to_string())]),
            rates: BTreeMap::from([(RATE.to_string(), rate)]),
        }
    }

    fn dataset(records: Vec<GapRecord>) -> GapDataset {
        GapDataset {
            records,
            zone_columns: vec![ZONE.to_string()],
            rate_columns: vec![RATE.to_string()],
        }
    }

    fn run(ds: &GapDataset) -> CriticalTable {
        let zone = ds.select_zone(ZONE).unwrap();
        let rate = ds.select_rate(RATE).unwrap();
        aggregate(ds, &zone, &rate)
    }

    #[test]
    fn folds_each_criterion_independently() {
        // Two Barley regimes in one group: the critical record mixes the
        // worse value of every criterion across both rows.
        let ds = dataset(vec![
            record("Z1", "P1", "Barley", 69.0, 3, 120.0, 14.0, 7.0),
            record("Z1", "P1", "Barley", 71.0, 3, 100.0, 10.0, 10.0),
        ]);
        let table = run(&ds);
        assert_eq!(table.len(), 1);

        let rec = &table.records[0];
        assert_eq!(rec.key.zone, "Z1");
        assert_eq!(rec.key.product, "P1");
        assert_eq!(rec.key.crop, "Barley");
        assert_eq!(rec.key.max_applications, 3);
        assert_eq!(rec.rate, Some(120.0));
        assert_eq!(rec.bbch_end, Some(71.0));
        assert_eq!(rec.phi, Some(10.0));
        assert_eq!(rec.min_interval, Some(7.0));
    }

    #[test]
    fn distinct_application_counts_stay_separate_groups() {
        let ds = dataset(vec![
            record("Z1", "P1", "Barley", 69.0, 2, 120.0, 14.0, 7.0),
            record("Z1", "P1", "Barley", 71.0, 3, 100.0, 10.0, 10.0),
        ]);
        let table = run(&ds);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn input_order_does_not_change_the_result() {
        let rows = vec![
            record("Z2", "P2", "Wheat", 61.0, 1, 90.0, 21.0, 14.0),
            record("Z1", "P1", "Barley", 69.0, 3, 120.0, 14.0, 7.0),
            record("Z1", "P1", "Barley", 71.0, 3, 100.0, 10.0, 10.0),
            record("Z1", "P2", "Wheat", 65.0, 1, 110.0, 28.0, 7.0),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = run(&dataset(rows));
        let b = run(&dataset(reversed));

        assert_eq!(a.len(), b.len());
        for (ra, rb) in a.records.iter().zip(&b.records) {
            assert_eq!(ra.key, rb.key);
            assert_eq!(ra.rate, rb.rate);
            assert_eq!(ra.bbch_end, rb.bbch_end);
            assert_eq!(ra.phi, rb.phi);
            assert_eq!(ra.min_interval, rb.min_interval);
        }
    }

    #[test]
    fn rows_without_zone_value_or_application_count_are_skipped() {
        let mut no_zone = record("Z1", "P1", "Barley", 69.0, 3, 120.0, 14.0, 7.0);
        no_zone.zones.clear();
        let mut no_count = record("Z1", "P1", "Barley", 69.0, 3, 120.0, 14.0, 7.0);
        no_count.max_applications = None;

        let table = run(&dataset(vec![no_zone, no_count]));
        assert!(table.is_empty());
    }

    #[test]
    fn blank_criteria_cells_are_ignored_by_the_folds() {
        let mut partial = record("Z1", "P1", "Barley", 69.0, 3, 120.0, 14.0, 7.0);
        partial.phi = None;
        partial.rates.clear();
        let full = record("Z1", "P1", "Barley", 71.0, 3, 100.0, 10.0, 10.0);

        let table = run(&dataset(vec![partial, full]));
        let rec = &table.records[0];
        assert_eq!(rec.rate, Some(100.0));
        assert_eq!(rec.phi, Some(10.0));
        assert_eq!(rec.bbch_end, Some(71.0));
    }
}
