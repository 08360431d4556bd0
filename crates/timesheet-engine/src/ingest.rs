//! Row ingestion: typed fields, date parsing and chronological order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use timesheet_core::{Field, IngestWarning, RawRow, RawValue, ReportError, TimeEntryRow};
use tracing::{debug, warn};

/// Sheet row of the first data row (the header occupies row 1)
const FIRST_SOURCE_ROW: usize = 2;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Rows ready for grouping, sorted by date
#[derive(Clone, Debug, Default)]
pub struct Ingested {
    pub rows: Vec<TimeEntryRow>,
    pub warnings: Vec<IngestWarning>,
}

impl Ingested {
    /// Date of the earliest dated row
    pub fn earliest_date(&self) -> Option<NaiveDateTime> {
        // Undated rows sort last, so the first row decides.
        self.rows.first().and_then(|row| row.date)
    }

    pub fn undated_count(&self) -> usize {
        self.rows.iter().filter(|row| row.date.is_none()).count()
    }

    pub fn total_hours(&self) -> f64 {
        self.rows.iter().map(|row| row.hours).sum()
    }
}

/// Turn pruned export rows (header excluded) into sorted entries.
///
/// Rows whose fields are all empty are skipped. Fails with
/// `ReportError::EmptyDataset` when nothing remains.
pub fn ingest(raw_rows: &[RawRow]) -> Result<Ingested, ReportError> {
    let mut ingested = Ingested::default();

    for (index, raw) in raw_rows.iter().enumerate() {
        if raw.iter().all(RawValue::is_empty) {
            continue;
        }
        let row = ingest_row(raw, index + FIRST_SOURCE_ROW, &mut ingested.warnings);
        ingested.rows.push(row);
    }

    if ingested.rows.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    for warning in &ingested.warnings {
        warn!("{warning}");
    }

    sort_chronologically(&mut ingested.rows);
    debug!(
        rows = ingested.rows.len(),
        undated = ingested.undated_count(),
        "ingested export rows"
    );

    Ok(ingested)
}

fn ingest_row(raw: &RawRow, source_row: usize, warnings: &mut Vec<IngestWarning>) -> TimeEntryRow {
    static EMPTY: RawValue = RawValue::Empty;
    let field = |f: Field| raw.get(f.index()).unwrap_or(&EMPTY);

    let date_value = field(Field::Date);
    let date = parse_date(date_value);
    if date.is_none() {
        warnings.push(IngestWarning::MalformedDate {
            row: source_row,
            value: date_value.to_text(),
        });
    }

    let hours = field(Field::Hours).to_number().unwrap_or_else(|| {
        warnings.push(IngestWarning::MissingOptionalField {
            row: source_row,
            field: Field::Hours,
        });
        0.0
    });

    TimeEntryRow {
        date,
        project: field(Field::Project).to_text(),
        description: field(Field::Description).to_text(),
        task_name: field(Field::TaskName).to_text(),
        hours,
        task_id: field(Field::TaskId).to_text(),
        estimated_hours: field(Field::EstimatedHours).to_number(),
    }
}

/// Read a date cell.
///
/// Native date/time values pass through; text is parsed as ISO-8601.
/// Anything else yields `None`.
pub fn parse_date(value: &RawValue) -> Option<NaiveDateTime> {
    match value {
        RawValue::DateTime(dt) => Some(*dt),
        RawValue::Text(text) => parse_iso_datetime(text.trim()),
        _ => None,
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Stable ascending sort by date; undated rows go last in original order.
pub fn sort_chronologically(rows: &mut [TimeEntryRow]) {
    rows.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
