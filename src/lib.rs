//! Core pipeline for the critical GAP identifier.
//!
//! Takes a "Master GAP" table (one row per product/crop/zone/application
//! regime), normalizes its crops, and reduces it to the single most critical
//! record per (zone, product, crop, application count) group: highest rate,
//! latest BBCH stage, shortest PHI, shortest application interval, with each
//! criterion taken independently across the group.
//!
//! The presentation layer (upload widget, dropdowns, table view, download
//! button) lives elsewhere; it drives a [`Session`] and renders what comes
//! back.

pub mod data;
pub mod error;
pub mod session;

pub use data::filter::{FilterSelection, ALL};
pub use data::model::{
    CriticalRecord, CriticalTable, GapDataset, GapRecord, GroupKey, RateColumn, ZoneColumn,
};
pub use error::GapError;
pub use session::Session;
