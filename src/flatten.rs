//! Nested feed JSON to flat table transform.
//!
//! The output column layout is schema-driven and positional: each record's
//! top-level fields are emitted in upstream order, with three in-place
//! rewrites:
//!
//! - `date` (the feed day) is inserted as the second column
//! - `estimated_diameter` expands into one `<unit>.estimated_diameter_min` /
//!   `<unit>.estimated_diameter_max` column pair per unit, at its position
//! - `close_approach_data` is replaced, at its position, by the first
//!   approach event's fields followed by its renamed `relative_velocity`
//!   and `miss_distance` unit columns
//!
//! Pure transform: no I/O, no hidden state, identical input yields identical
//! output.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{DayRecords, FlatTable, NeoRecord};
use crate::error::AppError;

const DIAMETER_FIELD: &str = "estimated_diameter";
const APPROACH_FIELD: &str = "close_approach_data";
const VELOCITY_FIELD: &str = "relative_velocity";
const MISS_FIELD: &str = "miss_distance";

/// Diameter unit sub-objects every record is expected to carry. A record with
/// a different unit set means the upstream contract changed.
const DIAMETER_UNITS: [&str; 4] = ["kilometers", "meters", "miles", "feet"];

/// Output names for `relative_velocity` unit keys; unknown keys pass through.
const VELOCITY_RENAMES: [(&str, &str); 3] = [
    ("kilometers_per_second", "relative_velocity_km/s"),
    ("kilometers_per_hour", "relative_velocity_km/h"),
    ("miles_per_hour", "relative_velocity_m/h"),
];

/// Output names for `miss_distance` unit keys; unknown keys pass through.
const MISS_RENAMES: [(&str, &str); 4] = [
    ("astronomical", "miss_dist_astronomical"),
    ("lunar", "miss_dist_lunar"),
    ("kilometers", "miss_dist_km"),
    ("miles", "miss_dist_miles"),
];

/// Flatten the accumulated per-day records into one table.
///
/// Rows come out in date order, records within a day in upstream response
/// order. Records with no close-approach event are skipped and counted in
/// [`FlatTable::skipped`]; a record whose columns diverge from the first
/// record's aborts with `InconsistentSchema`.
pub fn flatten(days: &[DayRecords]) -> Result<FlatTable, AppError> {
    let mut columns: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut skipped = 0usize;

    for day in days {
        for record in &day.records {
            let (cols, values) = match flatten_record(day.date, record) {
                Ok(pair) => pair,
                Err(AppError::MissingApproachData(id)) => {
                    warn!(date = %day.date, record = %id, "skipping record with no close approach data");
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            // The first emitted row fixes the column list for the whole table.
            if rows.is_empty() {
                columns = cols;
            } else if cols != columns {
                return Err(AppError::InconsistentSchema(format!(
                    "record '{}' on {} produced a different column set than the first record",
                    record_id(record),
                    day.date,
                )));
            }
            rows.push(values);
        }
    }

    Ok(FlatTable {
        columns,
        rows,
        skipped,
    })
}

/// Flatten one record into parallel (column, value) lists.
fn flatten_record(
    date: NaiveDate,
    record: &NeoRecord,
) -> Result<(Vec<String>, Vec<Value>), AppError> {
    let mut cells: Vec<(String, Value)> = Vec::new();

    for (idx, (key, value)) in record.iter().enumerate() {
        if idx == 1 {
            push_date(date, &mut cells);
        }
        match key.as_str() {
            DIAMETER_FIELD => expand_diameter(record, value, &mut cells)?,
            APPROACH_FIELD => expand_approach(record, value, &mut cells)?,
            _ => cells.push((key.clone(), value.clone())),
        }
    }
    if record.len() < 2 {
        push_date(date, &mut cells);
    }

    Ok(cells.into_iter().unzip())
}

fn push_date(date: NaiveDate, cells: &mut Vec<(String, Value)>) {
    cells.push((
        "date".to_string(),
        Value::String(date.format("%Y-%m-%d").to_string()),
    ));
}

/// Expand `estimated_diameter` into min/max columns per unit, in the record's
/// own key order.
fn expand_diameter(
    record: &NeoRecord,
    value: &Value,
    cells: &mut Vec<(String, Value)>,
) -> Result<(), AppError> {
    let units = value.as_object().ok_or_else(|| {
        schema_error(record, format!("'{DIAMETER_FIELD}' is not an object"))
    })?;

    // Set comparison: key order may vary, the unit set may not.
    if units.len() != DIAMETER_UNITS.len()
        || !DIAMETER_UNITS.iter().all(|u| units.contains_key(*u))
    {
        let found: Vec<&str> = units.keys().map(String::as_str).collect();
        return Err(schema_error(
            record,
            format!("unexpected diameter unit set [{}]", found.join(", ")),
        ));
    }

    for (unit, bounds) in units {
        let bounds = bounds.as_object().ok_or_else(|| {
            schema_error(record, format!("diameter unit '{unit}' is not an object"))
        })?;
        for field in ["estimated_diameter_min", "estimated_diameter_max"] {
            let v = bounds.get(field).ok_or_else(|| {
                schema_error(record, format!("diameter unit '{unit}' is missing '{field}'"))
            })?;
            cells.push((format!("{unit}.{field}"), v.clone()));
        }
    }
    Ok(())
}

/// Expand the first close-approach event: its scalar fields in event order,
/// then renamed velocity columns, then renamed miss-distance columns.
fn expand_approach(
    record: &NeoRecord,
    value: &Value,
    cells: &mut Vec<(String, Value)>,
) -> Result<(), AppError> {
    let events = value.as_array().ok_or_else(|| {
        schema_error(record, format!("'{APPROACH_FIELD}' is not an array"))
    })?;
    if events.len() > 1 {
        // Only the first event is kept per day-record; make the loss visible.
        debug!(record = %record_id(record), events = events.len(), "multiple close approach events, flattening the first only");
    }
    let first = events
        .first()
        .ok_or_else(|| AppError::MissingApproachData(record_id(record)))?;
    let event = first
        .as_object()
        .ok_or_else(|| schema_error(record, "close approach event is not an object".to_string()))?;

    let mut velocity: Vec<(String, Value)> = Vec::new();
    let mut miss: Vec<(String, Value)> = Vec::new();
    for (key, v) in event {
        match key.as_str() {
            VELOCITY_FIELD => expand_units(record, key, v, &VELOCITY_RENAMES, &mut velocity)?,
            MISS_FIELD => expand_units(record, key, v, &MISS_RENAMES, &mut miss)?,
            _ => cells.push((key.clone(), v.clone())),
        }
    }
    cells.extend(velocity);
    cells.extend(miss);
    Ok(())
}

/// Expand one unit sub-object, applying the rename map. Unknown unit keys are
/// passed through unrenamed (forward-compatible).
fn expand_units(
    record: &NeoRecord,
    field: &str,
    value: &Value,
    renames: &[(&str, &str)],
    out: &mut Vec<(String, Value)>,
) -> Result<(), AppError> {
    let units = value.as_object().ok_or_else(|| {
        schema_error(record, format!("'{field}' is not an object"))
    })?;
    for (unit, v) in units {
        let name = renames
            .iter()
            .find(|(from, _)| *from == unit.as_str())
            .map(|(_, to)| (*to).to_string())
            .unwrap_or_else(|| unit.clone());
        out.push((name, v.clone()));
    }
    Ok(())
}

fn schema_error(record: &NeoRecord, detail: String) -> AppError {
    AppError::InconsistentSchema(format!("record '{}': {detail}", record_id(record)))
}

fn record_id(record: &NeoRecord) -> String {
    record
        .get("name")
        .or_else(|| record.get("id"))
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string()
}
