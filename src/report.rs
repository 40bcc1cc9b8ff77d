//! Terminal preview formatting for a downloaded table.
//!
//! Formatting stays in one place so the pipeline code remains pure and
//! output changes are localized.

use serde_json::Value;

use crate::domain::FlatTable;

/// Column subset shown in the preview. The full table usually has ~28 columns;
/// these are the ones worth eyeballing after a download.
const PREVIEW_COLUMNS: [&str; 6] = [
    "name",
    "date",
    "absolute_magnitude_h",
    "is_potentially_hazardous_asteroid",
    "relative_velocity_km/h",
    "miss_dist_km",
];

/// Summary lines plus the first `limit` rows of the preview columns.
pub fn format_preview(table: &FlatTable, limit: usize) -> String {
    let mut out = String::new();

    out.push_str("=== neofeed - NEO feed download ===\n");
    out.push_str(&format!("Rows: {}\n", table.len()));
    out.push_str(&format!("Columns: {}\n", table.columns.len()));
    out.push_str(&format!(
        "Skipped (no close approach data): {}\n",
        table.skipped
    ));

    let shown: Vec<(&str, usize)> = PREVIEW_COLUMNS
        .iter()
        .filter_map(|c| table.column_index(c).map(|idx| (*c, idx)))
        .collect();
    if table.is_empty() || shown.is_empty() {
        return out;
    }

    out.push('\n');
    let header: Vec<&str> = shown.iter().map(|(c, _)| *c).collect();
    out.push_str(&header.join("  "));
    out.push('\n');

    for row in table.rows.iter().take(limit) {
        let line: Vec<String> = shown.iter().map(|(_, idx)| cell_text(&row[*idx])).collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    }
    if table.len() > limit {
        out.push_str(&format!("... {} more rows\n", table.len() - limit));
    }

    out
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
