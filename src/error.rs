//! Crate-wide error type.
//!
//! Every fallible operation in the pipeline returns [`AppError`]. The variants
//! are the failure modes a caller can actually react to: bad arguments surface
//! before any network I/O, upstream/schema failures abort the whole download
//! (a silently incomplete table would corrupt downstream aggregation), and the
//! one row-scoped condition (`MissingApproachData`) is converted into a
//! skip-and-count inside the flattener.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// A date argument did not parse as `YYYY-MM-DD`.
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Windowing bug indicator: an anchor date was not found in the sequence
    /// it was supposed to come from. Should never surface to a caller.
    #[error("anchor date {0} not present in the date sequence")]
    AnchorNotFound(NaiveDate),

    /// The feed rejected the request or the transport failed. Carries the
    /// service-provided message when the error body is parseable. Not retried
    /// internally.
    #[error("upstream feed error: {0}")]
    Upstream(String),

    #[error("upstream feed request timed out")]
    Timeout,

    /// A record did not match the expected feed schema (e.g. a different
    /// diameter unit set). Indicates the upstream contract changed.
    #[error("inconsistent feed schema: {0}")]
    InconsistentSchema(String),

    /// A record has an empty `close_approach_data` sequence. Row-scoped: the
    /// flattener skips the record and counts it rather than failing the run.
    #[error("record '{0}' has no close approach data")]
    MissingApproachData(String),

    #[error("missing API key: set NASA_API_KEY (or .env) or pass --api-key")]
    MissingCredential,

    #[error("export failed: {0}")]
    Export(String),
}

impl AppError {
    /// Process exit code for the binary: 2 for usage/configuration errors,
    /// 4 for upstream/data errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidDateFormat(_)
            | AppError::InvalidRange { .. }
            | AppError::MissingCredential
            | AppError::Export(_) => 2,
            AppError::AnchorNotFound(_)
            | AppError::Upstream(_)
            | AppError::Timeout
            | AppError::InconsistentSchema(_)
            | AppError::MissingApproachData(_) => 4,
        }
    }
}
