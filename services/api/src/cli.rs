use crate::infra::{build_service, parse_date};
use crate::server;
use absence_log::absences::{local_now, AbsenceReport};
use absence_log::config::AppConfig;
use absence_log::error::AppError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Absence Log",
    about = "Record daily staff absences and produce the department-ordered report",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the ordered absence report for a day
    Report(ReportArgs),
    /// Write the absence report for a day as a .docx file
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Report date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Override the configured absence log path
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Destination of the generated document
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Report date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Override the configured absence log path
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Export(args) => run_export(args),
    }
}

fn report_moment(date: Option<NaiveDate>) -> NaiveDateTime {
    match date {
        Some(date) => date.and_time(NaiveTime::default()),
        None => local_now(),
    }
}

fn load_config(log: Option<PathBuf>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = log {
        config.storage.absence_log = path;
    }
    Ok(config)
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = load_config(args.log)?;
    let service = build_service(&config)?;
    let report = service.today_report(report_moment(args.date))?;
    print!("{}", render_report(&report));
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = load_config(args.log)?;
    let service = build_service(&config)?;
    let document = service.export_today(report_moment(args.date))?;
    std::fs::write(&args.output, &document.bytes)?;
    info!(path = %args.output.display(), "wrote absence report");
    println!("Wrote {}", args.output.display());
    Ok(())
}

pub(crate) fn render_report(report: &AbsenceReport) -> String {
    let mut output = format!("Список відсутніх за {}\n", report.day);
    if report.is_empty() {
        output.push_str("Відсутніх немає.\n");
        return output;
    }
    for row in &report.rows {
        output.push_str(&format!(
            "{}. {} | {} | {}\n",
            row.index, row.department, row.details, row.timestamp
        ));
    }
    output
}
