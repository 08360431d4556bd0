//! End-to-end report scenarios: raw rows in, sheet plan out.

use pretty_assertions::assert_eq;
use timesheet_core::{
    column_index, CellStyle, CellValue, FinancialOptions, GroupingMode, RawRow, RawValue, ReportError, SheetPlan,
    UsdTotalMode,
};
use timesheet_engine::{aggregate_tasks, group_by_period, group_by_project, ingest, ReportWriter};

fn row(date: &str, project: &str, task_name: &str, hours: f64, task_id: &str, estimate: Option<f64>) -> RawRow {
    vec![
        date.into(),
        project.into(),
        format!("{task_name} work").as_str().into(),
        task_name.into(),
        hours.into(),
        task_id.into(),
        estimate.map_or(RawValue::Empty, RawValue::Number),
    ]
}

/// The two rows shared by the financial and split-half scenarios
fn scenario_rows() -> Vec<RawRow> {
    vec![
        row("2024-02-03", "Alpha", "t1", 2.5, "T1", None),
        row("2024-02-20", "Alpha", "t2", 1.0, "T2", None),
    ]
}

fn text_at(plan: &SheetPlan, row: u32, col: u16) -> String {
    match plan.cell_at(row, col).map(|c| &c.value) {
        Some(CellValue::Text(s) | CellValue::Formula(s) | CellValue::Link(s)) => s.clone(),
        other => panic!("no text at row {row} col {col}: {other:?}"),
    }
}

fn split_address(address: &str) -> (u32, u16) {
    let address = address.replace('$', "");
    let split = address.find(|c: char| c.is_ascii_digit()).expect("row number");
    let (letters, digits) = address.split_at(split);
    (digits.parse().expect("row"), column_index(letters).expect("column"))
}

/// Evaluate the small formula subset the financial report uses:
/// literal numbers, `=ADDR` references and `=A*B*C` products.
fn evaluate(plan: &SheetPlan, row: u32, col: u16) -> f64 {
    match &plan.cell_at(row, col).expect("cell").value {
        CellValue::Number(n) => *n,
        CellValue::Formula(f) => f
            .trim_start_matches('=')
            .split('*')
            .map(|operand| {
                let (r, c) = split_address(operand);
                evaluate(plan, r, c)
            })
            .product(),
        other => panic!("cannot evaluate {other:?}"),
    }
}

// =============================================================================
// Financial report
// =============================================================================

#[test]
fn scenario_a_financial() {
    let report = ReportWriter::new()
        .financial(&scenario_rows(), &FinancialOptions::new(50, 41.0))
        .unwrap();
    let plan = &report.plan;

    assert_eq!(report.file_stem, "financial_february_report");

    // One project block: title then both entries
    assert_eq!(text_at(plan, 2, 1), "Alpha");
    assert_eq!(text_at(plan, 3, 1), "T1");
    assert_eq!(text_at(plan, 4, 1), "T2");
    assert_eq!(text_at(plan, 3, 2), "https://avada.teamwork.com/#tasks/T1");
    assert_eq!(text_at(plan, 4, 8), "20.02.2024");

    // Both rows point at the same shared input cells
    for r in [3, 4] {
        assert_eq!(text_at(plan, r, 5), "=$G$8");
        assert_eq!(text_at(plan, r, 6), "=$G$9");
        assert_eq!(text_at(plan, r, 7), format!("=D{r}*E{r}*F{r}"));
    }
    assert_eq!(plan.cell_at(8, 7).unwrap().value, CellValue::Number(50.0));
    assert_eq!(plan.cell_at(9, 7).unwrap().value, CellValue::Number(41.0));

    // Totals span exactly the entry rows
    assert_eq!(report.layout.first_data_row, 3);
    assert_eq!(report.layout.last_data_row, 4);
    assert_eq!(text_at(plan, 9, 4), "=SUM(D3:D4)");
    assert_eq!(text_at(plan, 10, 4), "=SUM(G3:G4)");
    assert_eq!(text_at(plan, 11, 4), "=SUM(G3:G4)/$G$9");
    assert_eq!(report.layout.rate_cell_address.as_deref(), Some("$G$8"));
    assert_eq!(report.layout.exchange_cell_address.as_deref(), Some("$G$9"));
}

#[test]
fn cost_formula_evaluates_to_hours_times_rate_times_exchange() {
    let rows = vec![
        row("2024-05-02", "Alpha", "a", 2.5, "1", None),
        row("2024-05-03", "Beta", "b", 0.75, "2", None),
        row("2024-05-09", "Alpha", "c", 4.0, "3", None),
    ];
    let report = ReportWriter::new()
        .financial(&rows, &FinancialOptions::new(35, 39.5))
        .unwrap();

    // Alpha: rows 3-4, Beta: row 9
    let expected = [(3, 2.5), (4, 4.0), (9, 0.75)];
    for (r, hours) in expected {
        let cost = evaluate(&report.plan, r, 7);
        assert!((cost - hours * 35.0 * 39.5).abs() < 1e-9, "row {r}: {cost}");
    }
}

#[test]
fn totals_range_matches_data_rows_for_one_and_three_projects() {
    let one = vec![row("2024-01-02", "Solo", "x", 1.0, "1", None)];
    let report = ReportWriter::new().financial(&one, &FinancialOptions::new(10, 40.0)).unwrap();
    assert_eq!((report.layout.first_data_row, report.layout.last_data_row), (3, 3));
    // Title 2, entry 3, three gap rows, one blank row, totals from 8
    assert_eq!(text_at(&report.plan, 8, 4), "=SUM(D3:D3)");

    let three = vec![
        row("2024-01-02", "A", "x", 1.0, "1", None),
        row("2024-01-03", "B", "x", 1.0, "2", None),
        row("2024-01-04", "B", "x", 1.0, "3", None),
        row("2024-01-05", "B", "x", 1.0, "4", None),
        row("2024-01-06", "C", "x", 1.0, "5", None),
        row("2024-01-07", "C", "x", 1.0, "6", None),
    ];
    let report = ReportWriter::new().financial(&three, &FinancialOptions::new(10, 40.0)).unwrap();
    // A: title 2, row 3 | B: title 7, rows 8-10 | C: title 14, rows 15-16
    assert_eq!(text_at(&report.plan, 14, 1), "C");
    assert_eq!((report.layout.first_data_row, report.layout.last_data_row), (3, 16));
    assert_eq!(text_at(&report.plan, 21, 4), "=SUM(D3:D16)");
    assert_eq!(text_at(&report.plan, 22, 4), "=SUM(G3:G16)");
    assert_eq!(text_at(&report.plan, 20, 6), "Рейт");
    assert_eq!(text_at(&report.plan, 21, 6), "Курс");
    assert_eq!(text_at(&report.plan, 16, 5), "=$G$20");
}

#[test]
fn snapshot_usd_total_divides_by_literal_rate() {
    let options = FinancialOptions::new(50, 41.5).usd_total(UsdTotalMode::Snapshot);
    let report = ReportWriter::new().financial(&scenario_rows(), &options).unwrap();
    assert_eq!(text_at(&report.plan, 11, 4), "=SUM(G3:G4)/41.5");
}

#[test]
fn totals_block_is_filled() {
    let report = ReportWriter::new()
        .financial(&scenario_rows(), &FinancialOptions::new(50, 41.0))
        .unwrap();
    for r in 9..=11 {
        let styles: Vec<CellStyle> = (2..=5).map(|c| report.plan.cell_at(r, c).unwrap().style).collect();
        assert_eq!(
            styles,
            vec![CellStyle::SummaryLabel, CellStyle::SummaryFill, CellStyle::SummaryValue, CellStyle::SummaryUnit]
        );
    }
    assert_eq!(text_at(&report.plan, 11, 5), "$");
}

// =============================================================================
// Project report
// =============================================================================

#[test]
fn scenario_b_split_half() {
    let report = ReportWriter::new()
        .project(&scenario_rows(), GroupingMode::SplitHalf)
        .unwrap();
    let plan = &report.plan;

    assert_eq!(report.file_stem, "split_half_project_february_report");
    assert_eq!(text_at(plan, 1, 1), "Task name");

    // 01–15: banner, Alpha title, T1 row
    assert_eq!(text_at(plan, 2, 1), "Period: 01.02.2024 – 15.02.2024");
    assert_eq!(plan.cell_at(2, 1).unwrap().style, CellStyle::PeriodBanner);
    assert_eq!(text_at(plan, 3, 1), "Alpha");
    assert_eq!(text_at(plan, 4, 1), "t1");
    assert_eq!(text_at(plan, 4, 2), "https://avada.teamwork.com/#tasks/T1");

    // 16–end: banner after 2 project + 2 period blank rows
    assert_eq!(text_at(plan, 9, 1), "Period: 16.02.2024 – 29.02.2024");
    assert_eq!(text_at(plan, 10, 1), "Alpha");
    assert_eq!(text_at(plan, 11, 1), "t2");
    assert_eq!(plan.cell_at(11, 4).unwrap().value, CellValue::Number(1.0));
}

#[test]
fn split_half_banner_uses_true_month_length() {
    let cases = [
        ("2024-02-16", "Period: 16.02.2024 – 29.02.2024"),
        ("2023-02-16", "Period: 16.02.2023 – 28.02.2023"),
        ("2024-04-16", "Period: 16.04.2024 – 30.04.2024"),
        ("2024-07-16", "Period: 16.07.2024 – 31.07.2024"),
    ];
    for (date, banner) in cases {
        let rows = vec![row(date, "P", "t", 1.0, "1", None)];
        let report = ReportWriter::new().project(&rows, GroupingMode::SplitHalf).unwrap();
        // Empty first bucket: banner 2, gap to 5
        assert_eq!(text_at(&report.plan, 5, 1), banner, "{date}");
    }
}

#[test]
fn day_fifteen_and_sixteen_land_in_different_buckets() {
    let rows = vec![
        row("2024-03-15", "P", "fifteen", 1.0, "15", None),
        row("2024-03-16", "P", "sixteen", 1.0, "16", None),
    ];
    let ingested = ingest(&rows).unwrap();
    let periods = group_by_period(&ingested.rows);
    let first: Vec<&str> = periods.first_half.iter().flat_map(|(_, r)| r.iter().map(|e| e.task_id.as_str())).collect();
    let second: Vec<&str> = periods.second_half.iter().flat_map(|(_, r)| r.iter().map(|e| e.task_id.as_str())).collect();
    assert_eq!(first, vec!["15"]);
    assert_eq!(second, vec!["16"]);
}

#[test]
fn full_month_rollup() {
    let rows = vec![
        row("2024-06-03", "Shop", "Cart", 1.0, "C1", Some(6.0)),
        row("2024-06-04", "Blog", "Post", 2.0, "B1", None),
        row("2024-06-05", "Shop", "Cart v2", 1.5, "C1", Some(9.0)),
        row("2024-06-20", "Shop", "Checkout", 0.5, "C2", None),
    ];
    let report = ReportWriter::new().project(&rows, GroupingMode::FullMonth).unwrap();
    let plan = &report.plan;

    assert_eq!(report.file_stem, "full_month_project_june_report");
    assert_eq!(text_at(plan, 2, 1), "Shop");
    assert_eq!(text_at(plan, 3, 1), "Cart v2");
    assert_eq!(plan.cell_at(3, 3).unwrap().value, CellValue::Number(6.0));
    assert_eq!(plan.cell_at(3, 4).unwrap().value, CellValue::Number(2.5));
    assert_eq!(text_at(plan, 4, 1), "Checkout");
    assert_eq!(text_at(plan, 7, 1), "Blog");
    assert_eq!(text_at(plan, 8, 1), "Post");
    assert_eq!(report.summary.projects, 2);
    assert_eq!(report.summary.total_hours, 5.0);
}

// =============================================================================
// Properties
// =============================================================================

fn mixed_rows() -> Vec<RawRow> {
    let dates = ["2024-03-28", "2024-03-02", "2024-03-15", "2024-03-16", "2024-03-02", "2024-03-31", "2024-03-09"];
    let projects = ["Beta", "Alpha", "Gamma", "Alpha", "Beta", "Gamma", "Alpha"];
    dates
        .iter()
        .zip(projects)
        .enumerate()
        .map(|(i, (date, project))| {
            let hours = 0.25 * (i as f64 + 1.0);
            row(date, project, "task", hours, &format!("T{}", i % 3), None)
        })
        .collect()
}

#[test]
fn groups_preserve_date_order() {
    let ingested = ingest(&mixed_rows()).unwrap();
    for (_, entries) in group_by_project(&ingested.rows).iter() {
        assert!(entries.windows(2).all(|w| w[0].date <= w[1].date));
    }
    let periods = group_by_period(&ingested.rows);
    for (_, groups) in periods.iter() {
        for (_, entries) in groups.iter() {
            assert!(entries.windows(2).all(|w| w[0].date <= w[1].date));
        }
    }
}

#[test]
fn aggregated_hours_are_conserved_per_project() {
    let ingested = ingest(&mixed_rows()).unwrap();
    for (project, entries) in group_by_project(&ingested.rows).iter() {
        let raw: f64 = entries.iter().map(|e| e.hours).sum();
        let rolled: f64 = aggregate_tasks(entries.iter().copied()).iter().map(|t| t.hours).sum();
        assert!((raw - rolled).abs() < 1e-9, "{project}: {raw} vs {rolled}");
    }
}

#[test]
fn first_seen_project_order() {
    let ingested = ingest(&mixed_rows()).unwrap();
    let groups = group_by_project(&ingested.rows);
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    // Sorted dates: 03-02 Alpha, 03-02 Beta, 03-09 Alpha, 03-15 Gamma, ...
    assert_eq!(keys, vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn empty_dataset_fails_fast() {
    let writer = ReportWriter::new();
    assert!(matches!(
        writer.financial(&[], &FinancialOptions::new(50, 41.0)),
        Err(ReportError::EmptyDataset)
    ));
    assert!(matches!(writer.project(&[], GroupingMode::SplitHalf), Err(ReportError::EmptyDataset)));
}
