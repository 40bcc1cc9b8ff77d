//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the raw per-day feed records (`NeoRecord`, `DayRecords`)
//! - the flattened output table (`FlatTable`)
//! - the upstream window constraint (`MAX_WINDOW_DAYS`)

pub mod types;

pub use types::*;
