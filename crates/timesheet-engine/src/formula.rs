//! Live formulas of the financial report.
//!
//! Every entry row points at the shared rate and exchange-rate input cells,
//! so editing those two cells re-prices the whole sheet.

use timesheet_core::{column_letter, UsdTotalMode};

use crate::layout::{absolute_address, financial_col, FinancialLayout};

/// Builds formulas against fixed input-cell positions
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaSynthesizer {
    rate_address: String,
    exchange_address: String,
}

impl FormulaSynthesizer {
    pub fn new(rate_row: u32, exchange_row: u32) -> Self {
        Self {
            rate_address: absolute_address(financial_col::INPUT_VALUE, rate_row),
            exchange_address: absolute_address(financial_col::INPUT_VALUE, exchange_row),
        }
    }

    pub fn for_layout(layout: &FinancialLayout) -> Self {
        Self::new(layout.rate_row, layout.exchange_row)
    }

    /// `=$G$<rate_row>`
    pub fn rate_cell(&self) -> String {
        format!("={}", self.rate_address)
    }

    /// `=$G$<exchange_row>`
    pub fn exchange_cell(&self) -> String {
        format!("={}", self.exchange_address)
    }

    /// Cost of one entry: hours × rate × exchange rate on the same row
    pub fn cost(&self, row: u32) -> String {
        format!(
            "={h}{row}*{r}{row}*{x}{row}",
            h = column_letter(financial_col::HOURS),
            r = column_letter(financial_col::RATE),
            x = column_letter(financial_col::EXCHANGE),
        )
    }

    pub fn hours_total(&self, first_row: u32, last_row: u32) -> String {
        format!("={}", sum(financial_col::HOURS, first_row, last_row))
    }

    pub fn amount_total(&self, first_row: u32, last_row: u32) -> String {
        format!("={}", sum(financial_col::COST, first_row, last_row))
    }

    /// Amount total converted to USD.
    ///
    /// `Live` divides by the exchange-rate cell. `Snapshot` divides by the
    /// literal rate, so later edits of the input cell do not reach it.
    pub fn usd_total(&self, first_row: u32, last_row: u32, mode: UsdTotalMode, exchange_rate: f64) -> String {
        let amount = sum(financial_col::COST, first_row, last_row);
        match mode {
            UsdTotalMode::Live => format!("={amount}/{}", self.exchange_address),
            UsdTotalMode::Snapshot => format!("={amount}/{exchange_rate}"),
        }
    }
}

fn sum(col: u16, first_row: u32, last_row: u32) -> String {
    let letter = column_letter(col);
    format!("SUM({letter}{first_row}:{letter}{last_row})")
}
