use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors surfaced to the presentation layer.
///
/// Import failures and unresolvable headers are blocking (no partial table is
/// ever shown); [`GapError::AggregationNotConfigured`] is instructional and
/// leaves the session usable.
#[derive(Debug, Error)]
pub enum GapError {
    /// The source file could not be read or its sheet/header row is missing.
    #[error("import failed: {0}")]
    Import(String),

    /// A required semantic column has no matching header in the source table.
    #[error("no matching header found for required column '{0}'")]
    UnresolvedColumn(&'static str),

    /// A zone/rate column selection that is not among the discovered options.
    #[error("unknown {kind} column '{name}'")]
    UnknownColumn { kind: &'static str, name: String },

    /// Aggregation was requested before both the zone column and the rate
    /// column were selected.
    #[error("select a regulatory zone column and an application rate column before aggregating")]
    AggregationNotConfigured,

    /// The filtered table could not be written to the output stream.
    #[error("export failed: {0}")]
    Export(String),
}
