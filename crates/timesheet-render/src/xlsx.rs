//! XLSX backend
//!
//! Writes a `SheetPlan` into a single-sheet workbook. Formulas are written
//! as formulas, so the resulting file recalculates when the rate or
//! exchange-rate input cells are edited in a spreadsheet application.
//!
//! Plan coordinates are 1-based; rust_xlsxwriter is 0-based.

use std::collections::HashMap;
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatUnderline, Workbook, Worksheet};
use timesheet_core::{Cell, CellStyle, CellValue, RenderError, ReportTheme, SheetPlan, SheetWriter};
use tracing::debug;

/// XLSX workbook writer
#[derive(Clone, Copy, Debug, Default)]
pub struct XlsxWriter;

impl XlsxWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write the plan to `path`, replacing any existing file
    pub fn save(&self, plan: &SheetPlan, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let bytes = self.write(plan)?;
        std::fs::write(path.as_ref(), bytes)?;
        debug!(path = %path.as_ref().display(), "workbook saved");
        Ok(())
    }

    fn fill_sheet(sheet: &mut Worksheet, plan: &SheetPlan) -> Result<(), RenderError> {
        sheet
            .set_name(plan.sheet_name.as_str())
            .map_err(|e| RenderError::Format(e.to_string()))?;

        for (col, width) in (0u16..).zip(&plan.column_widths) {
            sheet.set_column_width(col, *width).ok();
        }

        let mut formats: HashMap<CellStyle, Format> = HashMap::new();
        for cell in &plan.cells {
            let format = formats
                .entry(cell.style)
                .or_insert_with(|| style_format(cell.style, &plan.theme));
            write_cell(sheet, cell, format)?;
        }
        Ok(())
    }
}

impl SheetWriter for XlsxWriter {
    type Output = Vec<u8>;

    fn write(&self, plan: &SheetPlan) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        Self::fill_sheet(sheet, plan)?;

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        debug!(cells = plan.cells.len(), bytes = buffer.len(), "workbook rendered");
        Ok(buffer)
    }
}

fn write_cell(sheet: &mut Worksheet, cell: &Cell, format: &Format) -> Result<(), RenderError> {
    if cell.row == 0 || cell.col == 0 {
        return Err(RenderError::InvalidData(format!(
            "cell at row {} col {} is outside the 1-based sheet grid",
            cell.row, cell.col
        )));
    }
    let (row, col) = (cell.row - 1, cell.col - 1);

    let written = match (&cell.value, cell.merge_to) {
        (CellValue::Text(text), Some(last_col)) if last_col >= cell.col => {
            sheet.merge_range(row, col, row, last_col - 1, text, format)
        }
        (_, Some(last_col)) => {
            return Err(RenderError::InvalidData(format!(
                "cannot merge {} through column {last_col}",
                cell.address()
            )));
        }
        (CellValue::Text(text), None) if text.is_empty() => sheet.write_blank(row, col, format),
        (CellValue::Text(text), None) => sheet.write_string_with_format(row, col, text, format),
        (CellValue::Number(value), None) => sheet.write_number_with_format(row, col, *value, format),
        (CellValue::Formula(formula), None) => sheet.write_formula_with_format(row, col, formula.as_str(), format),
        (CellValue::Link(url), None) => sheet.write_url_with_format(row, col, url.as_str(), format),
        (CellValue::Blank, None) => sheet.write_blank(row, col, format),
    };
    written.map_err(|e| RenderError::Format(e.to_string()))?;
    Ok(())
}

/// Resolve a named style against the theme
fn style_format(style: CellStyle, theme: &ReportTheme) -> Format {
    let base = Format::new().set_font_name(theme.font_name.as_str());
    match style {
        CellStyle::Plain => base,
        CellStyle::Header => base.set_bold().set_background_color(theme.header_fill),
        CellStyle::ProjectTitle => base.set_bold().set_background_color(theme.title_fill),
        CellStyle::PeriodBanner => base
            .set_bold()
            .set_italic()
            .set_background_color(theme.period_fill),
        CellStyle::Hyperlink => base
            .set_font_color(theme.hyperlink_color)
            .set_underline(FormatUnderline::Single),
        CellStyle::Decimal => base.set_num_format(theme.decimal_format.as_str()),
        CellStyle::Integer => base.set_num_format(theme.integer_format.as_str()),
        CellStyle::Bold => base.set_bold(),
        CellStyle::BoldDecimal => base.set_bold().set_num_format(theme.decimal_format.as_str()),
        CellStyle::SummaryLabel => base.set_bold().set_background_color(theme.summary_fill),
        CellStyle::SummaryValue => base
            .set_bold()
            .set_num_format(theme.decimal_format.as_str())
            .set_background_color(theme.summary_fill),
        CellStyle::SummaryUnit => base
            .set_align(FormatAlign::Right)
            .set_background_color(theme.summary_fill),
        CellStyle::SummaryFill => base.set_background_color(theme.summary_fill),
    }
}
