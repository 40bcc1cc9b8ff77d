//! Input/output helpers.
//!
//! - flat-table CSV export (`export`)

pub mod export;

pub use export::*;
