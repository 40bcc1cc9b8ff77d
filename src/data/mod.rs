//! Upstream data access.
//!
//! - NASA NEO feed client (`feed`)

pub mod feed;

pub use feed::*;
