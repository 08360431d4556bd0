//! # timesheet-core
//!
//! Core domain model and traits for the timesheet report engine.
//!
//! This crate provides:
//! - Domain types: `RawValue`, `TimeEntryRow`, `GroupingMode`, `ReportRequest`
//! - The sheet plan: cell/style/formula instructions handed to a writer
//! - Core trait: `SheetWriter`
//! - Per-call styling: `ReportTheme`
//! - Error and warning types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use timesheet_core::TimeEntryRow;
//!
//! let row = TimeEntryRow::new("Alpha", "T1")
//!     .date(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap().and_hms_opt(0, 0, 0).unwrap())
//!     .task_name("Checkout redesign")
//!     .hours(2.5);
//!
//! assert_eq!(row.teamwork_link(), "https://avada.teamwork.com/#tasks/T1");
//! ```

pub mod sheet;
pub mod theme;

pub use sheet::{column_index, column_letter, Cell, CellStyle, CellValue, SheetPlan};
pub use theme::ReportTheme;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Teamwork task identifier
pub type TaskId = String;

/// Project name as it appears in the export
pub type ProjectName = String;

/// Base URL of Teamwork task deep links
pub const TEAMWORK_TASK_URL: &str = "https://avada.teamwork.com/#tasks/";

// ============================================================================
// Raw Input
// ============================================================================

/// A single cell value as delivered by the spreadsheet reader
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Empty cell (JSON `null`)
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Native date/time cell. Only spreadsheet readers produce this.
    #[serde(skip_deserializing)]
    DateTime(NaiveDateTime),
}

impl RawValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the value as an identifier or label.
    ///
    /// Integral numbers drop their fractional part so that task ids read
    /// from numeric cells (`1234.0`) match the ids Teamwork uses (`1234`).
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.trim().to_string(),
            Self::DateTime(dt) => dt.to_string(),
        }
    }

    /// Numeric reading of the value, `None` for empty or non-numeric cells
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

/// One pruned export row: `[date, project, description, task_name, hours, task_id, estimated_hours]`
pub type RawRow = Vec<RawValue>;

/// Positions of the fields in a pruned export row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date = 0,
    Project = 1,
    Description = 2,
    TaskName = 3,
    Hours = 4,
    TaskId = 5,
    EstimatedHours = 6,
}

impl Field {
    /// Number of fields in a pruned row
    pub const COUNT: usize = 7;

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Project => "project",
            Self::Description => "description",
            Self::TaskName => "task_name",
            Self::Hours => "hours",
            Self::TaskId => "task_id",
            Self::EstimatedHours => "estimated_hours",
        }
    }
}

// ============================================================================
// Time Entries
// ============================================================================

/// One ingested time-tracking entry
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeEntryRow {
    /// Entry date, `None` when the source value was missing or malformed
    pub date: Option<NaiveDateTime>,
    pub project: ProjectName,
    pub description: String,
    pub task_name: String,
    /// Logged hours (missing values already defaulted to 0.0)
    pub hours: f64,
    pub task_id: TaskId,
    /// Estimated hours for the task, when the export carries one
    pub estimated_hours: Option<f64>,
}

impl TimeEntryRow {
    pub fn new(project: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            date: None,
            project: project.into(),
            description: String::new(),
            task_name: String::new(),
            hours: 0.0,
            task_id: task_id.into(),
            estimated_hours: None,
        }
    }

    pub fn date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn task_name(mut self, name: impl Into<String>) -> Self {
        self.task_name = name.into();
        self
    }

    pub fn hours(mut self, hours: f64) -> Self {
        self.hours = hours;
        self
    }

    pub fn estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Deep link to the task in Teamwork
    pub fn teamwork_link(&self) -> String {
        teamwork_link(&self.task_id)
    }
}

/// Deep link to a Teamwork task
pub fn teamwork_link(task_id: &str) -> String {
    format!("{TEAMWORK_TASK_URL}{task_id}")
}

// ============================================================================
// Report Selection
// ============================================================================

/// How a project report groups its rows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// The entire month in one block per project
    FullMonth,
    /// Two blocks: 01–15 and 16–end of month
    SplitHalf,
}

impl GroupingMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullMonth => "full_month",
            Self::SplitHalf => "split_half",
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupingMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_month" => Ok(Self::FullMonth),
            "split_half" => Ok(Self::SplitHalf),
            other => Err(ReportError::InvalidOption(format!(
                "unknown grouping mode '{other}' (expected full_month or split_half)"
            ))),
        }
    }
}

/// How the USD total of a financial report is computed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsdTotalMode {
    /// Divide by the exchange-rate input cell; follows later edits
    #[default]
    Live,
    /// Divide by the exchange rate as it was at generation time
    Snapshot,
}

impl FromStr for UsdTotalMode {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "snapshot" => Ok(Self::Snapshot),
            other => Err(ReportError::InvalidOption(format!(
                "unknown USD total mode '{other}' (expected live or snapshot)"
            ))),
        }
    }
}

/// Parameters of a financial report
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FinancialOptions {
    /// Hourly rate in USD
    pub rate: u32,
    /// UAH per USD
    pub exchange_rate: f64,
    pub usd_total: UsdTotalMode,
}

impl FinancialOptions {
    pub fn new(rate: u32, exchange_rate: f64) -> Self {
        Self {
            rate,
            exchange_rate,
            usd_total: UsdTotalMode::default(),
        }
    }

    pub fn usd_total(mut self, mode: UsdTotalMode) -> Self {
        self.usd_total = mode;
        self
    }
}

/// Which report to generate
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRequest {
    Financial(FinancialOptions),
    Project { grouping: GroupingMode },
}

impl ReportRequest {
    /// Prefix of the generated file name
    pub fn report_type(&self) -> String {
        match self {
            Self::Financial(_) => "financial".to_string(),
            Self::Project { grouping } => format!("{grouping}_project"),
        }
    }

    /// Whether the source reader must keep the estimate column
    pub fn keeps_estimate(&self) -> bool {
        matches!(self, Self::Project { .. })
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Spreadsheet output backend
pub trait SheetWriter {
    type Output;

    /// Turn a sheet plan into a document
    fn write(&self, plan: &SheetPlan) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Warnings and Errors
// ============================================================================

/// Non-fatal problem found while ingesting a row
#[derive(Clone, Debug, PartialEq, Serialize, Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IngestWarning {
    /// Date value could not be read; the row keeps a null date
    #[error("row {row}: malformed date '{value}'")]
    MalformedDate { row: usize, value: String },

    /// Optional numeric field was empty or non-numeric
    #[error("row {row}: missing {}, defaulting to 0.0", field.name())]
    MissingOptionalField { row: usize, field: Field },
}

/// Report generation error
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Empty dataset: the export contains no data rows")]
    EmptyDataset,

    #[error("No dated rows: none of the {0} rows has a valid date")]
    NoDatedRows(usize),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================
