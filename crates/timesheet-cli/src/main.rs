//! timesheet CLI - Financial and project reports from time-tracking exports
//!
//! Reads a Teamwork export (xlsx/xls/ods, or pre-pruned JSON rows) and writes
//! the requested report as `<output-dir>/<report>_<month>_report.xlsx`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use timesheet_core::{FinancialOptions, GroupingMode, ReportRequest, ReportTheme, UsdTotalMode};
use timesheet_engine::ReportWriter;
use timesheet_render::{load_rows, XlsxWriter};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "timesheet")]
#[command(author, version, about = "Financial and project reports from time-tracking exports", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-project cost report with live rate and exchange-rate inputs
    Financial {
        /// Export file (.xlsx, .xls, .ods or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Hourly rate in USD
        #[arg(long, env = "TIMESHEET_RATE")]
        rate: u32,

        /// UAH per USD
        #[arg(long, env = "TIMESHEET_EXCHANGE_RATE")]
        exchange_rate: f64,

        /// USD total: live formula on the exchange-rate cell, or a snapshot of today's rate
        #[arg(long, default_value = "live")]
        usd_total: UsdTotalMode,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Per-task hour and estimate rollup
    Project {
        /// Export file (.xlsx, .xls, .ods or .json)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Grouping mode (full_month, split_half)
        #[arg(short, long, default_value = "full_month")]
        grouping: GroupingMode,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Directory the report is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// TOML file overriding fonts, fills and number formats
    #[arg(long, value_name = "FILE")]
    theme: Option<PathBuf>,

    /// Print a JSON summary of the generated report
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (file, request, output) = match cli.command {
        Commands::Financial {
            file,
            rate,
            exchange_rate,
            usd_total,
            output,
        } => {
            let options = FinancialOptions::new(rate, exchange_rate).usd_total(usd_total);
            (file, ReportRequest::Financial(options), output)
        }
        Commands::Project { file, grouping, output } => (file, ReportRequest::Project { grouping }, output),
    };

    run(&file, &request, &output)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(file: &Path, request: &ReportRequest, output: &OutputArgs) -> Result<()> {
    let theme = match &output.theme {
        Some(path) => load_theme(path)?,
        None => ReportTheme::default(),
    };

    let rows = load_rows(file, request.keeps_estimate())
        .with_context(|| format!("Failed to read export {}", file.display()))?;

    let report = ReportWriter::with_theme(theme)
        .generate(&rows, request)
        .with_context(|| format!("Failed to build {} report", request.report_type()))?;

    fs::create_dir_all(&output.output_dir)
        .with_context(|| format!("Failed to create {}", output.output_dir.display()))?;
    let path = output.output_dir.join(report.file_name());
    XlsxWriter::new()
        .save(&report.plan, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "report written");

    if output.summary {
        let summary = json!({
            "file": path,
            "summary": report.summary,
            "layout": report.layout,
            "warnings": report.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn load_theme(path: &Path) -> Result<ReportTheme> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read theme {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid theme {}", path.display()))
}
