//! Sheet plan: the cell/style/formula instructions a report produces.
//!
//! Rows and columns are 1-based, matching the addresses that appear inside
//! formulas (`D3`, `$G$9`). Writers translate to their own indexing.

use serde::Serialize;

use crate::ReportTheme;

/// What goes into a cell
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Spreadsheet formula including the leading `=`
    Formula(String),
    /// Hyperlink whose display text is the URL itself
    Link(String),
    /// No value, only the style (fills)
    Blank,
}

/// Named cell styles, resolved against a `ReportTheme` by the writer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    Plain,
    /// Bold on the header fill
    Header,
    /// Bold on the project-title fill
    ProjectTitle,
    /// Bold italic on the period-banner fill
    PeriodBanner,
    Hyperlink,
    /// Two-decimal number
    Decimal,
    /// Integer number
    Integer,
    Bold,
    BoldDecimal,
    /// Totals block: bold label on the summary fill
    SummaryLabel,
    /// Totals block: two-decimal value on the summary fill
    SummaryValue,
    /// Totals block: right-aligned unit on the summary fill
    SummaryUnit,
    /// Totals block: empty cell on the summary fill
    SummaryFill,
}

/// A single cell instruction
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
    pub style: CellStyle,
    /// Last column of a horizontal merge starting at this cell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_to: Option<u16>,
}

impl Cell {
    pub fn new(row: u32, col: u16, value: CellValue, style: CellStyle) -> Self {
        Self {
            row,
            col,
            value,
            style,
            merge_to: None,
        }
    }

    pub fn merged(mut self, last_col: u16) -> Self {
        self.merge_to = Some(last_col);
        self
    }

    /// A1-style address of the cell
    pub fn address(&self) -> String {
        format!("{}{}", column_letter(self.col), self.row)
    }
}

/// Complete instructions for one worksheet
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SheetPlan {
    pub sheet_name: String,
    /// Widths of columns A, B, ... in character units
    pub column_widths: Vec<f64>,
    /// Cells in write order
    pub cells: Vec<Cell>,
    /// Styling the writer resolves `CellStyle`s against
    #[serde(skip)]
    pub theme: ReportTheme,
}

impl SheetPlan {
    pub fn new(sheet_name: impl Into<String>, column_widths: &[f64]) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            column_widths: column_widths.to_vec(),
            cells: Vec::new(),
            theme: ReportTheme::default(),
        }
    }

    pub fn with_theme(mut self, theme: ReportTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn push(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    pub fn text(&mut self, row: u32, col: u16, text: impl Into<String>, style: CellStyle) {
        self.push(Cell::new(row, col, CellValue::Text(text.into()), style));
    }

    pub fn number(&mut self, row: u32, col: u16, value: f64, style: CellStyle) {
        self.push(Cell::new(row, col, CellValue::Number(value), style));
    }

    pub fn formula(&mut self, row: u32, col: u16, formula: impl Into<String>, style: CellStyle) {
        self.push(Cell::new(row, col, CellValue::Formula(formula.into()), style));
    }

    pub fn link(&mut self, row: u32, col: u16, url: impl Into<String>) {
        self.push(Cell::new(row, col, CellValue::Link(url.into()), CellStyle::Hyperlink));
    }

    pub fn blank(&mut self, row: u32, col: u16, style: CellStyle) {
        self.push(Cell::new(row, col, CellValue::Blank, style));
    }

    /// Text spanning `first_col..=last_col` of one row
    pub fn merged_text(&mut self, row: u32, first_col: u16, last_col: u16, text: impl Into<String>, style: CellStyle) {
        self.push(Cell::new(row, first_col, CellValue::Text(text.into()), style).merged(last_col));
    }

    /// The last instruction written for a position
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.iter().rev().find(|c| c.row == row && c.col == col)
    }

    /// All instructions on one row, in column order
    pub fn row_cells(&self, row: u32) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self.cells.iter().filter(|c| c.row == row).collect();
        cells.sort_by_key(|c| c.col);
        cells
    }

    /// Highest row that carries an instruction
    pub fn last_row(&self) -> u32 {
        self.cells.iter().map(|c| c.row).max().unwrap_or(0)
    }

    /// Number of columns covered by widths or cells
    pub fn column_count(&self) -> u16 {
        let from_cells = self
            .cells
            .iter()
            .map(|c| c.merge_to.unwrap_or(c.col))
            .max()
            .unwrap_or(0);
        from_cells.max(self.column_widths.len() as u16)
    }
}

/// Spreadsheet letter of a 1-based column (`1 -> A`, `27 -> AA`)
pub fn column_letter(col: u16) -> String {
    let mut n = u32::from(col);
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 1-based column of a spreadsheet letter (`A -> 1`, `AA -> 27`)
pub fn column_index(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u16, |acc, ch| {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        acc.checked_mul(26)?.checked_add(ch as u16 - u16::from(b'A') + 1)
    })
}
