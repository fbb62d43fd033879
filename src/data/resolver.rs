use crate::error::GapError;

// ---------------------------------------------------------------------------
// Column resolution: raw header set → canonical semantic fields
// ---------------------------------------------------------------------------
//
// The Master GAP workbooks arrive with inconsistent header spellings: embedded
// line breaks, varying case, and a long-standing misspelling of the BBCH
// column. Aliases are matched against a normalized header (line breaks →
// spaces, whitespace collapsed, lowercase); per field the alias lists are
// checked in priority order and the first alias present wins.

/// Accepted spellings per semantic field, highest priority first.
const PRODUCT_ALIASES: &[&str] = &["product (plt short)", "product(plt short)", "product"];

const CROP_ALIASES: &[&str] = &["crop"];

// The misspelled variant ("applicationn") ships in real workbooks.
const BBCH_END_ALIASES: &[&str] = &[
    "applicationn timing bbch end",
    "application timing bbch end",
];

const MAX_APPLICATIONS_ALIASES: &[&str] = &[
    "max # of applns. (per block)",
    "max # of applns.(per block)",
];

const PHI_ALIASES: &[&str] = &["phi"];

const MIN_INTERVAL_ALIASES: &[&str] = &[
    "minimum appl. interval (days)",
    "minimum appl. interval(days)",
];

const MAX_INTERVAL_ALIASES: &[&str] = &[
    "maximum appl. interval (days)",
    "maximum appl. interval(days)",
];

/// Headers naming a regulatory/residue zone; every match becomes a
/// user-selectable zone-column option.
const ZONE_ALIASES: &[&str] = &["regulatory zone", "residues region"];

/// Rate columns are matched by shape, not by a closed list: any header that
/// starts with the rate prefix and ends with the unit suffix is an option.
const RATE_PREFIX: &str = "application rate";
const RATE_SUFFIX: &str = "(g/ha)";

/// Collapse embedded line breaks and whitespace runs, trim, lowercase.
pub fn normalize_header(raw: &str) -> String {
    raw.replace(['\n', '\r'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Like [`normalize_header`] but case-preserving, for display and export.
pub fn display_header(raw: &str) -> String {
    raw.replace(['\n', '\r'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// ResolvedColumns
// ---------------------------------------------------------------------------

/// Column indices into the raw header list for each canonical field, plus
/// the discovered zone/rate column options. The active zone and rate columns
/// are chosen by the user later, not here.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    pub product: usize,
    pub crop: usize,
    pub bbch_end: usize,
    pub max_applications: usize,
    pub phi: usize,
    pub min_interval: usize,
    /// Not aggregated, so its absence is tolerated.
    pub max_interval: Option<usize>,
    /// Candidate zone columns in header order.
    pub zone_columns: Vec<usize>,
    /// Candidate rate columns in header order.
    pub rate_columns: Vec<usize>,
}

/// Resolve the raw header list. Pure function: no state, no side effects.
///
/// Fails with [`GapError::UnresolvedColumn`] naming the first required field
/// that has no matching header. An empty zone or rate option set also fails,
/// since aggregation could never be configured from such a table.
pub fn resolve(headers: &[String]) -> Result<ResolvedColumns, GapError> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    let find = |aliases: &[&str], field: &'static str| -> Result<usize, GapError> {
        for alias in aliases {
            if let Some(idx) = normalized.iter().position(|h| h == alias) {
                return Ok(idx);
            }
        }
        Err(GapError::UnresolvedColumn(field))
    };

    let zone_columns: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, h)| ZONE_ALIASES.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect();
    if zone_columns.is_empty() {
        return Err(GapError::UnresolvedColumn("zone"));
    }

    let rate_columns: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, h)| h.starts_with(RATE_PREFIX) && h.ends_with(RATE_SUFFIX))
        .map(|(i, _)| i)
        .collect();
    if rate_columns.is_empty() {
        return Err(GapError::UnresolvedColumn("rate"));
    }

    Ok(ResolvedColumns {
        product: find(PRODUCT_ALIASES, "product")?,
        crop: find(CROP_ALIASES, "crop")?,
        bbch_end: find(BBCH_END_ALIASES, "bbch_end")?,
        max_applications: find(MAX_APPLICATIONS_ALIASES, "max_applications")?,
        phi: find(PHI_ALIASES, "phi")?,
        min_interval: find(MIN_INTERVAL_ALIASES, "min_interval")?,
        max_interval: find(MAX_INTERVAL_ALIASES, "max_interval").ok(),
        zone_columns,
        rate_columns,
    })
}
