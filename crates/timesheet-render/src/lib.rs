//! # timesheet-render
//!
//! Spreadsheet backends for timesheet reports.
//!
//! - [`XlsxWriter`]: turns a `SheetPlan` into an `.xlsx` workbook
//! - [`load_rows`]: reads a time-tracking export (xlsx/xls/ods or JSON)
//!   into pruned raw rows

pub mod source;
pub mod xlsx;

pub use source::{load_rows, SourceError, SOURCE_COLUMNS};
pub use xlsx::XlsxWriter;
