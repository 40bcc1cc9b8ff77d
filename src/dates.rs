//! Calendar date sequencing and fetch-window construction.
//!
//! The feed only answers queries spanning at most [`MAX_WINDOW_DAYS`]
//! consecutive days, so a long requested range is partitioned into fixed-size
//! windows here and fetched one window at a time.

use chrono::NaiveDate;

use crate::domain::MAX_WINDOW_DAYS;
use crate::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` date argument.
pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| AppError::InvalidDateFormat(s.to_string()))
}

/// Every calendar date from `start` to `end`, inclusive.
pub fn sequence(start: &str, end: &str) -> Result<Vec<NaiveDate>, AppError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        return Err(AppError::InvalidRange { start, end });
    }

    let mut out = Vec::new();
    let mut day = start;
    loop {
        out.push(day);
        if day == end {
            break;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            // End of the representable calendar; `day < end` makes this
            // unreachable in practice.
            None => break,
        }
    }
    Ok(out)
}

/// The date `days_after` positions past `anchor` in `dates`, clamped at the
/// sequence end rather than overflowing.
pub fn window_end(
    days_after: usize,
    anchor: NaiveDate,
    dates: &[NaiveDate],
) -> Result<NaiveDate, AppError> {
    let start = position(anchor, dates)?;
    let end = (start + days_after).min(dates.len() - 1);
    Ok(dates[end])
}

/// The contiguous inclusive sub-sequence from `anchor` to
/// `window_end(MAX_WINDOW_DAYS - 1, anchor, dates)`. Always 1 to
/// [`MAX_WINDOW_DAYS`] days long.
pub fn window_slice(anchor: NaiveDate, dates: &[NaiveDate]) -> Result<&[NaiveDate], AppError> {
    let start = position(anchor, dates)?;
    let end = (start + MAX_WINDOW_DAYS - 1).min(dates.len() - 1);
    Ok(&dates[start..=end])
}

/// Partition `dates` into consecutive non-overlapping windows of up to
/// [`MAX_WINDOW_DAYS`] days by advancing the anchor one window at a time.
pub fn windows(dates: &[NaiveDate]) -> Result<Vec<&[NaiveDate]>, AppError> {
    let mut out = Vec::new();
    let mut idx = 0;
    while idx < dates.len() {
        let window = window_slice(dates[idx], dates)?;
        idx += window.len();
        out.push(window);
    }
    Ok(out)
}

fn position(anchor: NaiveDate, dates: &[NaiveDate]) -> Result<usize, AppError> {
    dates
        .iter()
        .position(|d| *d == anchor)
        .ok_or(AppError::AnchorNotFound(anchor))
}
