use std::io::Write;
use std::path::Path;

use crate::data::aggregate::aggregate;
use crate::data::export::write_csv;
use crate::data::filter::{filter_records, value_options, FilterSelection};
use crate::data::model::{CriticalRecord, CriticalTable, GapDataset, RateColumn, ZoneColumn};
use crate::data::normalize::build_dataset;
use crate::data::{loader, resolver};
use crate::error::GapError;

// ---------------------------------------------------------------------------
// Session – the explicit per-dataset state object
// ---------------------------------------------------------------------------

/// One interactive session: the current canonical dataset, the user's
/// zone/rate column choices, the aggregated critical table and the filter
/// selections. The presentation layer owns exactly one of these and calls
/// into it on every user action; `&mut self` makes the single-writer rule a
/// compile-time fact rather than a convention.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<GapDataset>,
    zone_column: Option<ZoneColumn>,
    rate_column: Option<RateColumn>,
    critical: Option<CriticalTable>,
    filters: FilterSelection,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // -- import --------------------------------------------------------

    /// Run the import half of the pipeline: load → resolve → normalize.
    ///
    /// On success the previous dataset, column choices, critical table and
    /// filters are replaced in one step. On failure the session is left
    /// exactly as it was before the call.
    pub fn import_file(&mut self, path: &Path) -> Result<(), GapError> {
        let table = loader::load_file(path).map_err(|e| {
            log::error!("import of {} failed: {e:#}", path.display());
            GapError::Import(format!("{e:#}"))
        })?;
        let cols = resolver::resolve(&table.headers)?;
        let dataset = build_dataset(&table, &cols);

        log::info!(
            "imported {} GAP records ({} zone columns, {} rate columns) from {}",
            dataset.len(),
            dataset.zone_columns.len(),
            dataset.rate_columns.len(),
            path.display()
        );

        self.dataset = Some(dataset);
        self.zone_column = None;
        self.rate_column = None;
        self.critical = None;
        self.filters.reset();
        Ok(())
    }

    /// The current canonical dataset, if an import has succeeded.
    pub fn dataset(&self) -> Option<&GapDataset> {
        self.dataset.as_ref()
    }

    // -- column configuration ------------------------------------------

    /// Candidate zone columns for the configuration dropdown.
    pub fn zone_options(&self) -> &[String] {
        self.dataset
            .as_ref()
            .map(|d| d.zone_columns.as_slice())
            .unwrap_or(&[])
    }

    /// Candidate application-rate columns for the configuration dropdown.
    pub fn rate_options(&self) -> &[String] {
        self.dataset
            .as_ref()
            .map(|d| d.rate_columns.as_slice())
            .unwrap_or(&[])
    }

    /// Select the active zone column and re-aggregate if fully configured.
    pub fn select_zone_column(&mut self, name: &str) -> Result<(), GapError> {
        let zone = self
            .dataset
            .as_ref()
            .and_then(|d| d.select_zone(name))
            .ok_or_else(|| GapError::UnknownColumn {
                kind: "zone",
                name: name.to_string(),
            })?;
        self.zone_column = Some(zone);
        self.reaggregate();
        Ok(())
    }

    /// Select the active rate column and re-aggregate if fully configured.
    pub fn select_rate_column(&mut self, name: &str) -> Result<(), GapError> {
        let rate = self
            .dataset
            .as_ref()
            .and_then(|d| d.select_rate(name))
            .ok_or_else(|| GapError::UnknownColumn {
                kind: "rate",
                name: name.to_string(),
            })?;
        self.rate_column = Some(rate);
        self.reaggregate();
        Ok(())
    }

    // -- aggregation ---------------------------------------------------

    /// Re-run aggregation against the current dataset and column choices.
    /// Fails (without touching the previous table) until the user has picked
    /// both a zone column and a rate column.
    pub fn aggregate(&mut self) -> Result<&CriticalTable, GapError> {
        let (Some(dataset), Some(zone), Some(rate)) = (
            self.dataset.as_ref(),
            self.zone_column.as_ref(),
            self.rate_column.as_ref(),
        ) else {
            return Err(GapError::AggregationNotConfigured);
        };

        let table = aggregate(dataset, zone, rate);
        log::info!(
            "aggregated {} GAP records into {} critical groups (zone: {}, rate: {})",
            dataset.len(),
            table.len(),
            zone.name(),
            rate.name()
        );
        Ok(self.critical.insert(table))
    }

    fn reaggregate(&mut self) {
        if self.zone_column.is_some() && self.rate_column.is_some() {
            // both handles validated above, cannot fail
            let _ = self.aggregate();
        }
    }

    /// The current critical table, if aggregation has run.
    pub fn critical(&self) -> Option<&CriticalTable> {
        self.critical.as_ref()
    }

    // -- value filters -------------------------------------------------

    /// Product dropdown options ("All" + distinct products).
    pub fn product_options(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|d| value_options(&d.products()))
            .unwrap_or_default()
    }

    /// Crop dropdown options ("All" + distinct normalized crops).
    pub fn crop_options(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|d| value_options(&d.crops()))
            .unwrap_or_default()
    }

    /// Zone-value dropdown options for the selected zone column
    /// ("All" + distinct values); empty until a zone column is chosen.
    pub fn zone_value_options(&self) -> Vec<String> {
        match (self.dataset.as_ref(), self.zone_column.as_ref()) {
            (Some(d), Some(zone)) => value_options(&d.zone_values(zone)),
            _ => Vec::new(),
        }
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    /// Replace the product allow-list.
    pub fn set_product_filter<I: IntoIterator<Item = String>>(&mut self, values: I) {
        self.filters.products = values.into_iter().collect();
    }

    /// Replace the crop allow-list.
    pub fn set_crop_filter<I: IntoIterator<Item = String>>(&mut self, values: I) {
        self.filters.crops = values.into_iter().collect();
    }

    /// Replace the zone-value allow-list.
    pub fn set_zone_filter<I: IntoIterator<Item = String>>(&mut self, values: I) {
        self.filters.zones = values.into_iter().collect();
    }

    /// The filtered view of the critical table, recomputed from the full
    /// current table on every call so filter changes never compound.
    pub fn filtered(&self) -> Vec<&CriticalRecord> {
        match &self.critical {
            Some(table) => filter_records(table, &self.filters),
            None => Vec::new(),
        }
    }

    // -- export --------------------------------------------------------

    /// Export the current filtered view as UTF-8 CSV. A no-op returning
    /// `Ok(false)` when nothing has been aggregated yet.
    pub fn export_filtered<W: Write>(&self, out: W) -> Result<bool, GapError> {
        let Some(table) = &self.critical else {
            log::info!("export requested with no aggregated table; skipping");
            return Ok(false);
        };
        let records = filter_records(table, &self.filters);
        write_csv(table, &records, out).map_err(|e| GapError::Export(format!("{e:#}")))?;
        log::info!("exported {} critical records", records.len());
        Ok(true)
    }
}
