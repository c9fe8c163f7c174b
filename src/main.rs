//! Verdict: test report renderer CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use verdict::app::ReportApp;
use verdict::prefs::{PreferenceStore, QueryParams, SessionStore};
use verdict::render::html;
use verdict::Outcome;

/// Verdict: interactive HTML report for test results
#[derive(Parser, Debug)]
#[command(name = "verdict")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a report JSON blob to a self-contained HTML document
    Render(RenderArgs),

    /// Print a per-outcome summary of a report JSON blob
    Summary {
        /// Path to the report JSON file
        report: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Path to the report JSON file
    report: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Comma-separated outcomes to show (same syntax as the `visible` URL
    /// parameter; omit to show everything)
    #[arg(long)]
    visible: Option<String>,

    /// Sort column: result, name, duration, or original
    #[arg(long)]
    sort: Option<String>,

    /// Sort direction (omit for the column default)
    #[arg(long)]
    ascending: Option<bool>,

    /// Comma-separated collapsed outcome categories, or "all"
    #[arg(long)]
    collapsed: Option<String>,

    /// Session state file to restore and persist (sort direction, collapsed
    /// record ids)
    #[arg(long)]
    state_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    match args.command {
        Commands::Render(render) => render_report(&render),
        Commands::Summary { report } => summarize(&report),
    }
}

fn render_report(args: &RenderArgs) -> Result<ExitCode> {
    let blob = fs::read_to_string(&args.report)
        .with_context(|| format!("Failed to read report: {}", args.report.display()))?;

    let mut query = QueryParams::new();
    if let Some(visible) = &args.visible {
        query.set("visible", visible);
    }
    if let Some(sort) = &args.sort {
        query.set("sort", sort);
    }
    if let Some(collapsed) = &args.collapsed {
        query.set("collapsed", collapsed);
    }

    let session = match &args.state_file {
        Some(path) if path.exists() => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            SessionStore::from_json(&json)
        }
        _ => SessionStore::new(),
    };
    let mut prefs = PreferenceStore::from_parts(query, session);
    if let Some(ascending) = args.ascending {
        prefs.set_sort_ascending(ascending);
    }

    let app = ReportApp::from_json_with_prefs(&blob, prefs)
        .with_context(|| format!("Invalid report data: {}", args.report.display()))?;
    let document = html::render_document(&app.page(), Some(&blob));

    match &args.output {
        Some(path) => {
            fs::write(path, document)
                .with_context(|| format!("Failed to write: {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{document}"),
    }

    if let Some(path) = &args.state_file {
        fs::write(path, app.session_json())
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;
    }

    Ok(ExitCode::SUCCESS)
}

fn summarize(report: &Path) -> Result<ExitCode> {
    let blob = fs::read_to_string(report)
        .with_context(|| format!("Failed to read report: {}", report.display()))?;
    let app = ReportApp::from_json(&blob)
        .with_context(|| format!("Invalid report data: {}", report.display()))?;
    let page = app.page();

    println!("{}", app.model().title().bold());
    println!("{}", page.progress);
    let mut failures = 0usize;
    for control in &page.filters {
        if control.count == 0 {
            continue;
        }
        let line = format!("{:>5}  {}", control.count, control.label);
        let colored_line = match control.outcome {
            Outcome::Passed => line.green(),
            Outcome::Failed | Outcome::Error => line.red(),
            Outcome::Skipped | Outcome::Rerun => line.yellow(),
            Outcome::XFailed | Outcome::XPassed => line.cyan(),
        };
        println!("{colored_line}");
        if matches!(control.outcome, Outcome::Failed | Outcome::Error) {
            failures += control.count;
        }
    }

    if failures > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
