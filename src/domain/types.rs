//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - accumulated in-memory during the windowed download
//! - flattened into one table
//! - exported to CSV or previewed in the terminal

use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Upstream hard limit: the feed rejects query windows wider than 8 calendar
/// days (inclusive of both endpoints).
pub const MAX_WINDOW_DAYS: usize = 8;

/// One NEO record exactly as the feed returned it.
///
/// Records stay as raw JSON objects because the flat table's column order is
/// defined by the upstream field order (`serde_json` is built with
/// `preserve_order`, so iteration follows insertion order).
pub type NeoRecord = Map<String, Value>;

/// All records the feed reported for one calendar day.
#[derive(Debug, Clone)]
pub struct DayRecords {
    pub date: NaiveDate,
    pub records: Vec<NeoRecord>,
}

/// The flat, analysis-ready table produced by one download.
///
/// Every row has exactly `columns.len()` cells; `skipped` counts records that
/// were dropped for having no close-approach event.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub skipped: usize,
}

impl FlatTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by output name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell lookup by row index and output column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }
}
