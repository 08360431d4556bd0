//! Reading time-tracking exports
//!
//! Spreadsheet exports carry many more columns than the reports use. Only
//! the columns listed in [`SOURCE_COLUMNS`] are kept, in `Field` order, and
//! the header row is dropped. JSON inputs are already in the pruned shape.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use thiserror::Error;
use timesheet_core::{column_index, Field, RawRow, RawValue};
use tracing::debug;

/// Export column letter of each pruned field
pub const SOURCE_COLUMNS: [(Field, &str); Field::COUNT] = [
    (Field::Date, "B"),
    (Field::Project, "E"),
    (Field::Description, "G"),
    (Field::TaskName, "K"),
    (Field::Hours, "R"),
    (Field::TaskId, "AA"),
    (Field::EstimatedHours, "S"),
];

/// Failure to read an export
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook has no worksheets")]
    NoWorksheet,

    #[error("Unsupported input '{0}', expected .xlsx, .xls, .ods or .json")]
    UnsupportedFormat(String),

    #[error("Row {row}: expected at most {expected} fields, found {found}")]
    RowShape { row: usize, expected: usize, found: usize },
}

/// Load pruned rows (header excluded) from an export file.
///
/// `keep_estimate` keeps the estimate column; financial reports do not
/// read it and leave the field empty.
pub fn load_rows(path: &Path, keep_estimate: bool) -> Result<Vec<RawRow>, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mut rows = match extension.as_str() {
        "json" => load_json(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path)?,
        _ => return Err(SourceError::UnsupportedFormat(path.display().to_string())),
    };

    if !keep_estimate {
        for row in &mut rows {
            if let Some(estimate) = row.get_mut(Field::EstimatedHours.index()) {
                *estimate = RawValue::Empty;
            }
        }
    }
    rows.retain(|row| !row.iter().all(RawValue::is_empty));

    debug!(path = %path.display(), rows = rows.len(), keep_estimate, "export loaded");
    Ok(rows)
}

fn load_json(path: &Path) -> Result<Vec<RawRow>, SourceError> {
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<RawRow> = serde_json::from_reader(reader)?;

    // Header first
    let rows: Vec<RawRow> = rows.into_iter().skip(1).collect();
    if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() > Field::COUNT) {
        return Err(SourceError::RowShape {
            row: index + 2,
            expected: Field::COUNT,
            found: row.len(),
        });
    }
    Ok(rows)
}

fn load_workbook(path: &Path) -> Result<Vec<RawRow>, SourceError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(SourceError::NoWorksheet)??;
    Ok(prune_range(&range))
}

/// Pick the source columns out of every row below the header
pub fn prune_range(range: &Range<Data>) -> Vec<RawRow> {
    let Some((last_row, _)) = range.end() else {
        return Vec::new();
    };
    let columns: Vec<Option<u32>> = SOURCE_COLUMNS
        .iter()
        .map(|(_, letters)| column_index(letters).map(|c| u32::from(c) - 1))
        .collect();

    // Sheet row 1 is the header; positions below are absolute
    (1..=last_row)
        .map(|row| {
            columns
                .iter()
                .map(|col| {
                    col.and_then(|col| range.get_value((row, col)))
                        .map_or(RawValue::Empty, raw_value)
                })
                .collect()
        })
        .collect()
}

fn raw_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| RawValue::Number(dt.as_f64()), RawValue::DateTime),
    }
}
