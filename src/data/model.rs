use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell.
/// Unique-value sets use `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for the numeric criteria.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to interpret the value as an `i64` (application counts).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Borrow the value as trimmed text; `None` for non-strings and blanks.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => {
                let t = s.trim();
                (!t.is_empty()).then_some(t)
            }
            _ => None,
        }
    }

    /// Render the value as trimmed text, numbers included; `None` only for
    /// nulls and blanks. Key columns (product, zone) go through this, since
    /// workbooks do ship purely numeric product codes and zone labels.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::String(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            other => Some(other.to_string()),
        }
    }

    /// Guess a typed value from raw text (CSV cells).
    pub fn from_text(s: &str) -> CellValue {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// RawTable – one imported sheet, headers still unresolved
// ---------------------------------------------------------------------------

/// The source table exactly as loaded: raw header strings (line breaks and
/// all) and one `CellValue` row per data row. Rows shorter than the header
/// list are padded with [`CellValue::Null`] by the loader.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Cell at (row, column), `Null` when the row is short.
    pub fn cell<'a>(&self, row: &'a [CellValue], col: usize) -> &'a CellValue {
        row.get(col).unwrap_or(&CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// GapRecord / GapDataset – canonical rows after resolution + normalization
// ---------------------------------------------------------------------------

/// One canonical GAP row. The zone and rate columns are chosen by the user
/// after import, so every candidate column's value is carried per record and
/// the active one is picked at aggregation time.
#[derive(Debug, Clone)]
pub struct GapRecord {
    pub product: String,
    /// Post-normalization crop text; empty when the source cell was blank.
    pub crop: String,
    pub bbch_end: Option<f64>,
    pub max_applications: Option<i64>,
    pub phi: Option<f64>,
    pub min_interval: Option<f64>,
    /// Carried through for display/export candidates, never aggregated.
    pub max_interval: Option<f64>,
    /// Candidate zone column → zone value (absent when the cell was blank).
    pub zones: BTreeMap<String, String>,
    /// Candidate rate column → application rate (absent when blank).
    pub rates: BTreeMap<String, f64>,
}

/// The full canonical dataset for one import, with the selectable
/// zone/rate column options discovered by the resolver.
#[derive(Debug, Clone)]
pub struct GapDataset {
    pub records: Vec<GapRecord>,
    /// Candidate zone column headers (normalized, display-ready).
    pub zone_columns: Vec<String>,
    /// Candidate rate column headers (normalized, display-ready).
    pub rate_columns: Vec<String>,
}

impl GapDataset {
    /// Number of canonical records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validate a zone column name against the discovered options.
    pub fn select_zone(&self, name: &str) -> Option<ZoneColumn> {
        self.zone_columns
            .iter()
            .find(|c| c.as_str() == name)
            .map(|c| ZoneColumn(c.clone()))
    }

    /// Validate a rate column name against the discovered options.
    pub fn select_rate(&self, name: &str) -> Option<RateColumn> {
        self.rate_columns
            .iter()
            .find(|c| c.as_str() == name)
            .map(|c| RateColumn(c.clone()))
    }

    /// Sorted distinct product names.
    pub fn products(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.product.clone()).collect()
    }

    /// Sorted distinct crop names (post-normalization).
    pub fn crops(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.crop.clone()).collect()
    }

    /// Sorted distinct zone values for one candidate zone column.
    pub fn zone_values(&self, zone: &ZoneColumn) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|r| r.zones.get(zone.name()).cloned())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Selected-column handles
// ---------------------------------------------------------------------------

/// The active zone column, validated once against [`GapDataset::zone_columns`]
/// and carried as a handle instead of re-looked-up by string on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneColumn(String);

impl ZoneColumn {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// The active application-rate column, validated against
/// [`GapDataset::rate_columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateColumn(String);

impl RateColumn {
    pub fn name(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// CriticalRecord – one aggregated row per group
// ---------------------------------------------------------------------------

/// Aggregation bucket identity: one bucket per distinct
/// (zone, product, crop, application count) combination.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub zone: String,
    pub product: String,
    pub crop: String,
    pub max_applications: i64,
}

/// The per-criterion extremums of one group. Each criterion is folded
/// independently over the group, so the max rate and the min PHI may come
/// from different source rows. `None` means no row in the group carried a
/// value for that criterion.
#[derive(Debug, Clone)]
pub struct CriticalRecord {
    pub key: GroupKey,
    /// Maximum application rate (higher is more critical).
    pub rate: Option<f64>,
    /// Latest application timing (later growth stage is more critical).
    pub bbch_end: Option<f64>,
    /// Shortest pre-harvest interval (shorter is more critical).
    pub phi: Option<f64>,
    /// Shortest interval between applications (shorter is more critical).
    pub min_interval: Option<f64>,
}

/// The aggregated table: one [`CriticalRecord`] per distinct [`GroupKey`],
/// ordered by key. Replaced wholesale on re-aggregation or re-import,
/// never mutated in place.
#[derive(Debug, Clone)]
pub struct CriticalTable {
    pub zone_column: ZoneColumn,
    pub rate_column: RateColumn,
    pub records: Vec<CriticalRecord>,
}

impl CriticalTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Canonical display labels (export headers, option captions)
// ---------------------------------------------------------------------------

pub mod labels {
    pub const PRODUCT: &str = "Product (PLT short)";
    pub const CROP: &str = "Crop";
    pub const BBCH_END: &str = "Application timing BBCH end";
    pub const MAX_APPLICATIONS: &str = "Max # of applns. (per block)";
    pub const PHI: &str = "PHI";
    pub const MIN_INTERVAL: &str = "Minimum appl. interval (days)";
    pub const MAX_INTERVAL: &str = "Maximum appl. interval (days)";
}
