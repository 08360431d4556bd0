//! Row positions of every block in a report sheet.
//!
//! All positions are 1-based sheet rows and come from a single cursor that
//! only moves forward. Layout is computed from group sizes before any cell
//! is planned, so formulas can name cells that are written later.

use serde::Serialize;
use timesheet_core::column_letter;

use crate::group::PeriodKey;

/// Row of the column headers
pub const HEADER_ROW: u32 = 1;

/// Blank rows after each financial project block
pub const FINANCIAL_PROJECT_GAP: u32 = 3;
/// Blank rows between the last financial block and the totals
pub const TOTALS_GAP: u32 = 1;
/// Rows in the financial totals block
pub const TOTALS_ROWS: u32 = 3;
/// Blank rows after each project-report block
pub const PROJECT_GAP: u32 = 2;
/// Blank rows after each half-month bucket
pub const PERIOD_GAP: u32 = 2;

/// Columns of the financial sheet
pub mod financial_col {
    pub const TASK_ID: u16 = 1;
    pub const LINK: u16 = 2;
    pub const DESCRIPTION: u16 = 3;
    pub const HOURS: u16 = 4;
    pub const RATE: u16 = 5;
    pub const EXCHANGE: u16 = 6;
    pub const COST: u16 = 7;
    pub const DATE: u16 = 8;
    /// Totals block labels
    pub const TOTAL_LABEL: u16 = 2;
    pub const TOTAL_VALUE: u16 = 4;
    pub const TOTAL_UNIT: u16 = 5;
    /// Rate / exchange-rate inputs
    pub const INPUT_LABEL: u16 = 6;
    pub const INPUT_VALUE: u16 = 7;
    pub const LAST: u16 = 8;
}

/// Columns of the project sheet
pub mod project_col {
    pub const TASK_NAME: u16 = 1;
    pub const LINK: u16 = 2;
    pub const ESTIMATE: u16 = 3;
    pub const HOURS: u16 = 4;
    pub const LAST: u16 = 4;
}

/// Forward-only row cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowCursor(u32);

impl RowCursor {
    pub const fn at(row: u32) -> Self {
        Self(row)
    }

    pub const fn row(self) -> u32 {
        self.0
    }

    /// Claim `count` rows, returning the first of them
    pub fn take(&mut self, count: u32) -> u32 {
        let first = self.0;
        self.0 += count;
        first
    }

    pub fn skip(&mut self, count: u32) {
        self.0 += count;
    }
}

/// Positional bookkeeping of one generated sheet
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportLayout {
    /// First row after everything the layout placed
    pub row_cursor: u32,
    pub rate_cell_address: Option<String>,
    pub exchange_cell_address: Option<String>,
    pub first_data_row: u32,
    pub last_data_row: u32,
}

/// A titled block of data rows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub title_row: u32,
    pub first_row: u32,
    pub len: u32,
}

impl Block {
    /// Sheet row of the `index`-th data row
    pub fn row(&self, index: usize) -> u32 {
        self.first_row + index as u32
    }

    pub fn last_row(&self) -> Option<u32> {
        (self.len > 0).then(|| self.first_row + self.len - 1)
    }

    fn place(cursor: &mut RowCursor, len: usize, gap: u32) -> Self {
        let title_row = cursor.take(1);
        let len = len as u32;
        let first_row = cursor.take(len);
        cursor.skip(gap);
        Self {
            title_row,
            first_row,
            len,
        }
    }
}

// ============================================================================
// Financial layout
// ============================================================================

/// Positions of a financial report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinancialLayout {
    pub blocks: Vec<Block>,
    pub first_data_row: u32,
    pub last_data_row: u32,
    /// First of the three totals rows
    pub totals_row: u32,
    pub rate_row: u32,
    pub exchange_row: u32,
    pub row_cursor: u32,
}

/// Look-ahead placement of the rate and exchange-rate inputs.
///
/// `total_data_rows = Σ(entries + 4)`, `rate_row = total_data_rows + 2`,
/// `exchange_row = rate_row + 1`.
pub fn input_rows(entry_counts: &[usize]) -> (u32, u32) {
    let total_data_rows: u32 = entry_counts.iter().map(|&n| n as u32 + 1 + FINANCIAL_PROJECT_GAP).sum();
    let rate_row = total_data_rows + 2;
    (rate_row, rate_row + 1)
}

impl FinancialLayout {
    /// Lay out projects with the given entry counts, in order
    pub fn compute(entry_counts: &[usize]) -> Self {
        let (rate_row, exchange_row) = input_rows(entry_counts);

        let mut cursor = RowCursor::at(HEADER_ROW + 1);
        let blocks: Vec<Block> = entry_counts
            .iter()
            .map(|&count| Block::place(&mut cursor, count, FINANCIAL_PROJECT_GAP))
            .collect();

        let first_data_row = blocks
            .iter()
            .find(|b| b.len > 0)
            .map_or(HEADER_ROW + 1, |b| b.first_row);
        let last_data_row = cursor.row().saturating_sub(FINANCIAL_PROJECT_GAP + 1);

        cursor.skip(TOTALS_GAP);
        let totals_row = cursor.take(TOTALS_ROWS);
        let row_cursor = cursor.row().max(exchange_row + 1);

        Self {
            blocks,
            first_data_row,
            last_data_row,
            totals_row,
            rate_row,
            exchange_row,
            row_cursor,
        }
    }

    pub fn rate_address(&self) -> String {
        absolute_address(financial_col::INPUT_VALUE, self.rate_row)
    }

    pub fn exchange_address(&self) -> String {
        absolute_address(financial_col::INPUT_VALUE, self.exchange_row)
    }

    pub fn report_layout(&self) -> ReportLayout {
        ReportLayout {
            row_cursor: self.row_cursor,
            rate_cell_address: Some(self.rate_address()),
            exchange_cell_address: Some(self.exchange_address()),
            first_data_row: self.first_data_row,
            last_data_row: self.last_data_row,
        }
    }
}

// ============================================================================
// Project layout
// ============================================================================

/// A run of project blocks, under a period banner in split-half reports
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub period: Option<PeriodKey>,
    pub banner_row: Option<u32>,
    pub blocks: Vec<Block>,
}

/// Positions of a project report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    pub sections: Vec<Section>,
    pub row_cursor: u32,
}

impl ProjectLayout {
    /// One block per project; task counts in project order
    pub fn full_month(task_counts: &[usize]) -> Self {
        let mut cursor = RowCursor::at(HEADER_ROW + 1);
        let blocks = task_counts
            .iter()
            .map(|&count| Block::place(&mut cursor, count, PROJECT_GAP))
            .collect();
        Self {
            sections: vec![Section {
                period: None,
                banner_row: None,
                blocks,
            }],
            row_cursor: cursor.row(),
        }
    }

    /// A banner per bucket, then one block per project of that bucket
    pub fn split_half(bucket_task_counts: [&[usize]; 2]) -> Self {
        let mut cursor = RowCursor::at(HEADER_ROW + 1);
        let sections = PeriodKey::ALL
            .into_iter()
            .zip(bucket_task_counts)
            .map(|(key, counts)| {
                let banner_row = cursor.take(1);
                let blocks = counts
                    .iter()
                    .map(|&count| Block::place(&mut cursor, count, PROJECT_GAP))
                    .collect();
                cursor.skip(PERIOD_GAP);
                Section {
                    period: Some(key),
                    banner_row: Some(banner_row),
                    blocks,
                }
            })
            .collect();
        Self {
            sections,
            row_cursor: cursor.row(),
        }
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> + Clone {
        self.sections.iter().flat_map(|section| section.blocks.iter())
    }

    pub fn report_layout(&self) -> ReportLayout {
        project_report_layout(self.blocks(), self.row_cursor)
    }
}

/// Bookkeeping for any sequence of project blocks
pub fn project_report_layout<'a>(blocks: impl Iterator<Item = &'a Block> + Clone, row_cursor: u32) -> ReportLayout {
    let first_data_row = blocks
        .clone()
        .find(|b| b.len > 0)
        .map_or(HEADER_ROW + 1, |b| b.first_row);
    let last_data_row = blocks.filter_map(Block::last_row).max().unwrap_or(HEADER_ROW);
    ReportLayout {
        row_cursor,
        rate_cell_address: None,
        exchange_cell_address: None,
        first_data_row,
        last_data_row,
    }
}

/// `$G$9`-style absolute address
pub fn absolute_address(col: u16, row: u32) -> String {
    format!("${}${}", column_letter(col), row)
}
