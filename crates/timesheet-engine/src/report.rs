//! Report generation: the straight-line pipeline from export rows to a sheet plan.
//!
//! ```text
//! ingest -> group -> (aggregate) -> layout -> formulas -> SheetPlan
//! ```
//!
//! The plan is handed to a `SheetWriter`; nothing here touches the file system.

use chrono::NaiveDateTime;
use serde::Serialize;
use timesheet_core::{
    teamwork_link, CellStyle, FinancialOptions, GroupingMode, IngestWarning, RawRow, RenderError,
    ReportError, ReportRequest, ReportTheme, SheetPlan, SheetWriter, TimeEntryRow,
};
use tracing::{debug, info};

use crate::aggregate::{aggregate_tasks, TaskAggregate};
use crate::formula::FormulaSynthesizer;
use crate::group::{group_by_period, group_by_project, ProjectGroups};
use crate::ingest::{ingest, Ingested};
use crate::layout::{project_col, Block, FinancialLayout, ProjectLayout, ReportLayout, HEADER_ROW};

pub const FINANCIAL_HEADERS: [&str; 8] = [
    "Проект",
    "Ссылка на TeamWork",
    "Описание",
    "Кол-во часов",
    "Рейт/час [$]",
    "Курс [$]",
    "Стоимость (ГРН)",
    "Дата",
];

pub const PROJECT_HEADERS: [&str; 4] = ["Task name", "Link to TeamWork", "Estimated time", "Total count time"];

const FINANCIAL_WIDTHS: [f64; 8] = [15.0, 45.0, 55.0, 15.0, 15.0, 15.0, 20.0, 15.0];
const PROJECT_WIDTHS: [f64; 4] = [55.0, 50.0, 15.0, 15.0];

/// Labels and units of the three totals rows
const TOTALS: [(&str, &str); 3] = [
    ("ИТОГО часов", "часов"),
    ("ИТОГО к оплате", "UAH"),
    ("ИТОГО в долларах", "$"),
];

const RATE_LABEL: &str = "Рейт";
const EXCHANGE_LABEL: &str = "Курс";

/// A generated report, ready to be written
#[derive(Clone, Debug)]
pub struct GeneratedReport {
    /// File name without extension, e.g. `financial_february_report`
    pub file_stem: String,
    pub plan: SheetPlan,
    pub layout: ReportLayout,
    pub warnings: Vec<IngestWarning>,
    pub summary: ReportSummary,
}

impl GeneratedReport {
    pub fn file_name(&self) -> String {
        format!("{}.xlsx", self.file_stem)
    }

    /// Hand the plan to a spreadsheet backend
    pub fn render<W: SheetWriter>(&self, writer: &W) -> Result<W::Output, RenderError> {
        writer.write(&self.plan)
    }
}

/// Headline numbers of a generated report
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportSummary {
    pub report_type: String,
    pub month: String,
    pub entries: usize,
    pub projects: usize,
    pub total_hours: f64,
    /// Entries without a valid date
    pub undated: usize,
    pub warnings: usize,
}

/// Orchestrates report generation for one theme
#[derive(Clone, Debug, Default)]
pub struct ReportWriter {
    theme: ReportTheme,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: ReportTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &ReportTheme {
        &self.theme
    }

    /// Generate the requested report from pruned rows (header excluded)
    pub fn generate(&self, rows: &[RawRow], request: &ReportRequest) -> Result<GeneratedReport, ReportError> {
        match request {
            ReportRequest::Financial(options) => self.financial(rows, options),
            ReportRequest::Project { grouping } => self.project(rows, *grouping),
        }
    }

    /// Per-project cost breakdown with live rate and exchange-rate inputs
    pub fn financial(&self, rows: &[RawRow], options: &FinancialOptions) -> Result<GeneratedReport, ReportError> {
        if !options.exchange_rate.is_finite() || options.exchange_rate <= 0.0 {
            return Err(ReportError::InvalidOption(format!(
                "exchange rate must be a positive number, got {}",
                options.exchange_rate
            )));
        }

        let ingested = ingest(rows)?;
        let request = ReportRequest::Financial(*options);
        let (file_stem, month) = file_stem_for(&request, &ingested)?;

        let groups = group_by_project(&ingested.rows);
        let counts: Vec<usize> = groups.iter().map(|(_, rows)| rows.len()).collect();
        let layout = FinancialLayout::compute(&counts);
        debug!(
            projects = groups.len(),
            totals_row = layout.totals_row,
            rate_row = layout.rate_row,
            exchange_row = layout.exchange_row,
            "financial layout computed"
        );

        let plan = self.financial_plan(&groups, &layout, options);
        let summary = summarize(&request, month, &ingested, groups.len());
        info!(file = %file_stem, entries = summary.entries, "financial report generated");

        Ok(GeneratedReport {
            file_stem,
            plan,
            layout: layout.report_layout(),
            warnings: ingested.warnings,
            summary,
        })
    }

    /// Per-task hour/estimate rollup, for the full month or split at the 15th
    pub fn project(&self, rows: &[RawRow], grouping: GroupingMode) -> Result<GeneratedReport, ReportError> {
        let ingested = ingest(rows)?;
        let request = ReportRequest::Project { grouping };
        let (file_stem, month) = file_stem_for(&request, &ingested)?;

        let (plan, layout, projects) = match grouping {
            GroupingMode::FullMonth => self.full_month_plan(&ingested.rows),
            GroupingMode::SplitHalf => {
                // file_stem_for has already rejected a dataset without dates
                let reference = ingested.earliest_date().ok_or(ReportError::NoDatedRows(ingested.rows.len()))?;
                self.split_half_plan(&ingested.rows, reference)
            }
        };

        let summary = summarize(&request, month, &ingested, projects);
        info!(file = %file_stem, entries = summary.entries, %grouping, "project report generated");

        Ok(GeneratedReport {
            file_stem,
            plan,
            layout: layout.report_layout(),
            warnings: ingested.warnings,
            summary,
        })
    }

    fn new_plan(&self, widths: &[f64], headers: &[&str]) -> SheetPlan {
        let mut plan = SheetPlan::new("Report", widths).with_theme(self.theme.clone());
        for (col, header) in (1u16..).zip(headers) {
            plan.text(HEADER_ROW, col, *header, CellStyle::Header);
        }
        plan
    }

    fn financial_plan(&self, groups: &ProjectGroups<'_>, layout: &FinancialLayout, options: &FinancialOptions) -> SheetPlan {
        use crate::layout::financial_col as col;

        let formulas = FormulaSynthesizer::for_layout(layout);
        let mut plan = self.new_plan(&FINANCIAL_WIDTHS, &FINANCIAL_HEADERS);

        for ((project, entries), block) in groups.iter().zip(&layout.blocks) {
            plan.merged_text(block.title_row, 1, col::LAST, project.as_str(), CellStyle::ProjectTitle);

            for (index, entry) in entries.iter().enumerate() {
                let row = block.row(index);
                plan.text(row, col::TASK_ID, entry.task_id.as_str(), CellStyle::Plain);
                plan.link(row, col::LINK, entry.teamwork_link());
                plan.text(row, col::DESCRIPTION, entry.description.as_str(), CellStyle::Plain);
                plan.number(row, col::HOURS, entry.hours, CellStyle::Decimal);
                plan.formula(row, col::RATE, formulas.rate_cell(), CellStyle::Decimal);
                plan.formula(row, col::EXCHANGE, formulas.exchange_cell(), CellStyle::Decimal);
                plan.formula(row, col::COST, formulas.cost(row), CellStyle::Decimal);
                plan.text(row, col::DATE, display_date(entry.date), CellStyle::Plain);
            }
        }

        let (first, last) = (layout.first_data_row, layout.last_data_row);
        let values = [
            formulas.hours_total(first, last),
            formulas.amount_total(first, last),
            formulas.usd_total(first, last, options.usd_total, options.exchange_rate),
        ];
        for ((offset, (label, unit)), value) in (0u32..).zip(TOTALS).zip(values) {
            let row = layout.totals_row + offset;
            plan.text(row, col::TOTAL_LABEL, label, CellStyle::SummaryLabel);
            plan.blank(row, col::TOTAL_LABEL + 1, CellStyle::SummaryFill);
            plan.formula(row, col::TOTAL_VALUE, value, CellStyle::SummaryValue);
            plan.text(row, col::TOTAL_UNIT, unit, CellStyle::SummaryUnit);
        }

        plan.text(layout.rate_row, col::INPUT_LABEL, RATE_LABEL, CellStyle::Bold);
        plan.number(layout.rate_row, col::INPUT_VALUE, f64::from(options.rate), CellStyle::BoldDecimal);
        plan.text(layout.exchange_row, col::INPUT_LABEL, EXCHANGE_LABEL, CellStyle::Bold);
        plan.number(layout.exchange_row, col::INPUT_VALUE, options.exchange_rate, CellStyle::BoldDecimal);

        plan
    }

    fn full_month_plan(&self, rows: &[TimeEntryRow]) -> (SheetPlan, ProjectLayout, usize) {
        let groups = group_by_project(rows);
        let tasks: Vec<(&String, Vec<TaskAggregate>)> = groups
            .iter()
            .map(|(project, entries)| (project, aggregate_tasks(entries.iter().copied())))
            .collect();
        let counts: Vec<usize> = tasks.iter().map(|(_, t)| t.len()).collect();
        let layout = ProjectLayout::full_month(&counts);

        let mut plan = self.new_plan(&PROJECT_WIDTHS, &PROJECT_HEADERS);
        for ((project, project_tasks), block) in tasks.iter().zip(layout.blocks()) {
            write_task_block(&mut plan, block, project, project_tasks);
        }

        (plan, layout, groups.len())
    }

    fn split_half_plan(&self, rows: &[TimeEntryRow], reference: NaiveDateTime) -> (SheetPlan, ProjectLayout, usize) {
        let periods = group_by_period(rows);
        if periods.excluded > 0 {
            debug!(excluded = periods.excluded, "undated rows left out of the period buckets");
        }

        let bucket_tasks: Vec<Vec<(&String, Vec<TaskAggregate>)>> = periods
            .iter()
            .map(|(_, groups)| {
                groups
                    .iter()
                    .map(|(project, entries)| (project, aggregate_tasks(entries.iter().copied())))
                    .collect()
            })
            .collect();
        let counts: Vec<Vec<usize>> = bucket_tasks
            .iter()
            .map(|bucket| bucket.iter().map(|(_, t)| t.len()).collect())
            .collect();
        let layout = ProjectLayout::split_half([&counts[0], &counts[1]]);

        let mut plan = self.new_plan(&PROJECT_WIDTHS, &PROJECT_HEADERS);
        for (section, bucket) in layout.sections.iter().zip(&bucket_tasks) {
            if let (Some(key), Some(banner_row)) = (section.period, section.banner_row) {
                plan.merged_text(banner_row, 1, project_col::LAST, key.title(reference.date()), CellStyle::PeriodBanner);
            }
            for ((project, project_tasks), block) in bucket.iter().zip(&section.blocks) {
                write_task_block(&mut plan, block, project, project_tasks);
            }
        }

        let projects = group_by_project(rows.iter().filter(|row| row.date.is_some())).len();
        (plan, layout, projects)
    }
}

fn write_task_block(plan: &mut SheetPlan, block: &Block, project: &str, tasks: &[TaskAggregate]) {
    use crate::layout::project_col as col;

    plan.merged_text(block.title_row, 1, col::LAST, project, CellStyle::ProjectTitle);
    for (index, task) in tasks.iter().enumerate() {
        let row = block.row(index);
        plan.text(row, col::TASK_NAME, task.task_name.as_str(), CellStyle::Plain);
        plan.link(row, col::LINK, teamwork_link(&task.task_id));
        match task.estimated_hours {
            Some(estimate) if estimate != 0.0 => plan.number(row, col::ESTIMATE, estimate, CellStyle::Integer),
            _ => plan.blank(row, col::ESTIMATE, CellStyle::Integer),
        }
        plan.number(row, col::HOURS, task.hours, CellStyle::Decimal);
    }
}

/// `DD.MM.YYYY`, or an empty string for undated entries
fn display_date(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.format("%d.%m.%Y").to_string()).unwrap_or_default()
}

/// Lowercase English month name, e.g. `february`
pub fn month_name(date: NaiveDateTime) -> String {
    date.format("%B").to_string().to_lowercase()
}

/// `{report_type}_{month}_report`
pub fn report_file_stem(report_type: &str, date: NaiveDateTime) -> String {
    format!("{report_type}_{}_report", month_name(date))
}

fn file_stem_for(request: &ReportRequest, ingested: &Ingested) -> Result<(String, String), ReportError> {
    let earliest = ingested
        .earliest_date()
        .ok_or(ReportError::NoDatedRows(ingested.rows.len()))?;
    Ok((report_file_stem(&request.report_type(), earliest), month_name(earliest)))
}

fn summarize(request: &ReportRequest, month: String, ingested: &Ingested, projects: usize) -> ReportSummary {
    ReportSummary {
        report_type: request.report_type(),
        month,
        entries: ingested.rows.len(),
        projects,
        total_hours: ingested.total_hours(),
        undated: ingested.undated_count(),
        warnings: ingested.warnings.len(),
    }
}
