//! # timesheet-engine
//!
//! Turns pruned time-tracking export rows into report sheet plans.
//!
//! This crate provides:
//! - `ingest`: date parsing and chronological sorting
//! - `group`: first-seen-order grouping by project and half-month period
//! - `aggregate`: per-task rollup with explicit field reducers
//! - `layout`: row positions, including the financial look-ahead pass
//! - `formula`: live cost and totals formulas
//! - `report`: the `ReportWriter` pipeline and file naming
//!
//! ## Example
//!
//! ```rust
//! use timesheet_core::{FinancialOptions, RawValue};
//! use timesheet_engine::ReportWriter;
//!
//! let rows = vec![vec![
//!     RawValue::from("2024-02-03"),
//!     RawValue::from("Alpha"),
//!     RawValue::from("Checkout fixes"),
//!     RawValue::from("Checkout"),
//!     RawValue::from(2.5),
//!     RawValue::from("T1"),
//!     RawValue::Empty,
//! ]];
//!
//! let report = ReportWriter::new()
//!     .financial(&rows, &FinancialOptions::new(50, 41.0))
//!     .unwrap();
//! assert_eq!(report.file_name(), "financial_february_report.xlsx");
//! ```

pub mod aggregate;
pub mod formula;
pub mod group;
pub mod ingest;
pub mod layout;
pub mod report;

pub use aggregate::{aggregate_tasks, TaskAggregate};
pub use formula::FormulaSynthesizer;
pub use group::{group_by_period, group_by_project, OrderedGroups, PeriodGroups, PeriodKey};
pub use ingest::{ingest, parse_date, Ingested};
pub use layout::{FinancialLayout, ProjectLayout, ReportLayout};
pub use report::{report_file_stem, GeneratedReport, ReportSummary, ReportWriter};
