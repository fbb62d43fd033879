use std::collections::BTreeSet;

use super::model::{CriticalRecord, CriticalTable};

// ---------------------------------------------------------------------------
// Filter composition over the critical table
// ---------------------------------------------------------------------------

/// The pseudo-option prefixed to every value dropdown; selecting it (or
/// selecting nothing) leaves that dimension unconstrained.
pub const ALL: &str = "All";

/// Per-dimension multi-select state: three independent allow-lists over the
/// critical table. Reset on every new import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub products: BTreeSet<String>,
    pub crops: BTreeSet<String>,
    pub zones: BTreeSet<String>,
}

impl FilterSelection {
    /// Drop all constraints (equivalent to "All" everywhere).
    pub fn reset(&mut self) {
        self.products.clear();
        self.crops.clear();
        self.zones.clear();
    }
}

/// An empty selection, or exactly `{"All"}`, constrains nothing.
fn unconstrained(selected: &BTreeSet<String>) -> bool {
    selected.is_empty() || (selected.len() == 1 && selected.contains(ALL))
}

fn passes(selected: &BTreeSet<String>, value: &str) -> bool {
    unconstrained(selected) || selected.contains(value)
}

/// Apply the three dimension constraints simultaneously: AND across
/// dimensions, set membership within a dimension. Always evaluated against
/// the full current table, never a previously filtered subset, so changing
/// one dropdown can both narrow and widen the view.
pub fn filter_records<'a>(
    table: &'a CriticalTable,
    selection: &FilterSelection,
) -> Vec<&'a CriticalRecord> {
    table
        .records
        .iter()
        .filter(|r| {
            passes(&selection.products, &r.key.product)
                && passes(&selection.crops, &r.key.crop)
                && passes(&selection.zones, &r.key.zone)
        })
        .collect()
}

/// Build a dropdown option list: `"All"` followed by the given distinct
/// values in sorted order.
pub fn value_options(values: &BTreeSet<String>) -> Vec<String> {
    let mut options = Vec::with_capacity(values.len() + 1);
    options.push(ALL.to_string());
    options.extend(values.iter().cloned());
    options
}
