//! `neofeed` library crate.
//!
//! Downloads near-Earth-object records from the NASA NEO feed across an
//! arbitrary date range and reshapes them into one flat, analysis-ready
//! table. The binary (`neofeed`) is a thin wrapper around this library so
//! that:
//!
//! - the pipeline is testable without spawning processes
//! - other front-ends (notebooks, dashboards) can reuse the download logic

pub mod app;
pub mod cli;
pub mod data;
pub mod dates;
pub mod domain;
pub mod error;
pub mod flatten;
pub mod io;
pub mod report;
