use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vendas_core::{run_job, JobConfig, JobContext, RunReport, StageOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds star-schema CSV tables from a sales file", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build every enabled dimension and the sales fact table
    Run(RunArgs),
    /// Load the config and input file and report what a run would see
    Check(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Path to the TOML job configuration
    #[arg(long, env = "VENDAS_CONFIG", default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Date stamped on snapshot file names (defaults to today)
    #[arg(long)]
    run_date: Option<NaiveDate>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Check(args) => handle_check(args),
    }
}

fn load_context(config_path: &Path, run_date: NaiveDate) -> Result<JobContext> {
    let config = JobConfig::load(config_path)
        .with_context(|| format!("failed to load configuration {}", config_path.display()))?;
    JobContext::open(config, run_date).context("failed to load transaction file")
}

fn handle_run(args: RunArgs) -> Result<()> {
    let run_date = args.run_date.unwrap_or_else(|| Local::now().date_naive());
    let ctx = load_context(&args.config.config, run_date)?;

    let report = run_job(&ctx);
    print_report(&report);

    if report.is_success() {
        info!("run finished");
        return Ok(());
    }

    let failed: Vec<String> = report
        .failures()
        .map(|(entity, message)| format!("{entity}: {message}"))
        .collect();
    bail!("{} stage(s) failed: {}", failed.len(), failed.join("; "))
}

fn handle_check(args: ConfigArgs) -> Result<()> {
    let ctx = load_context(&args.config, Local::now().date_naive())?;
    let summary = ctx.summary()?;

    let mut table = Table::new();
    table.set_header(vec!["input", "rows", "first date", "last date"]);
    let (first, last) = match summary.date_range {
        Some((start, end)) => (start.to_string(), end.to_string()),
        None => {
            warn!("input has no dates; the calendar stage would fail");
            ("-".to_string(), "-".to_string())
        }
    };
    table.add_row(vec![
        ctx.config.input_path().display().to_string(),
        summary.rows.to_string(),
        first,
        last,
    ]);
    println!("{table}");

    Ok(())
}

fn print_report(report: &RunReport) {
    let mut table = Table::new();
    table.set_header(vec!["table", "status", "rows", "latest"]);

    for stage in &report.stages {
        let row = match &stage.outcome {
            StageOutcome::Written(written) => vec![
                stage.entity.to_string(),
                "written".to_string(),
                written.rows.to_string(),
                written.latest.display().to_string(),
            ],
            StageOutcome::Skipped => vec![
                stage.entity.to_string(),
                "skipped".to_string(),
                String::new(),
                String::new(),
            ],
            StageOutcome::Failed(message) => vec![
                stage.entity.to_string(),
                "failed".to_string(),
                String::new(),
                message.clone(),
            ],
        };
        table.add_row(row);
    }

    println!("{table}");
}
