//! CSV export for the flat NEO table.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: header row from the table's column list, minimal RFC-style
//! quoting (fields containing commas, quotes, or newlines are quoted, with
//! embedded quotes doubled).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Value;

use crate::domain::FlatTable;
use crate::error::AppError;

/// Write the table to a CSV file, header first, one line per row.
pub fn write_table_csv(path: &Path, table: &FlatTable) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::Export(format!("failed to create '{}': {e}", path.display()))
    })?;
    let mut out = BufWriter::new(file);

    let header = table
        .columns
        .iter()
        .map(|c| quote_field(c))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(out, "{header}").map_err(write_error(path))?;

    for row in &table.rows {
        let line = row.iter().map(render_value).collect::<Vec<_>>().join(",");
        writeln!(out, "{line}").map_err(write_error(path))?;
    }

    out.flush().map_err(write_error(path))?;
    Ok(())
}

fn write_error(path: &Path) -> impl Fn(std::io::Error) -> AppError + '_ {
    move |e| AppError::Export(format!("failed to write '{}': {e}", path.display()))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => quote_field(s),
        // Numbers, booleans, and nested structures use their JSON rendering.
        other => quote_field(&other.to_string()),
    }
}

fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
