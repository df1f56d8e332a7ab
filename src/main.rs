use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use clover_md::{aggregate, clover, discovery, PackageResolver, ReportAssembler};

const DEFAULT_SUMMARY_PATH: &str = "code-coverage-summary.md";
const DEFAULT_DETAILS_PATH: &str = "code-coverage-details.md";

#[derive(Parser)]
#[command(name = "clover-md")]
#[command(about = "Turn Clover coverage XML into Markdown summary and detail tables")]
#[command(version)]
struct Cli {
    /// Glob pattern matching Clover XML reports
    #[arg(long, env = "INPUT_FILENAME", default_value = "clover.xml")]
    filename: String,

    /// Output path for the per-package summary document
    #[arg(long, default_value = DEFAULT_SUMMARY_PATH)]
    summary_path: PathBuf,

    /// Output path for the per-class details document
    #[arg(long, default_value = DEFAULT_DETAILS_PATH)]
    details_path: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut assembler = ReportAssembler::new();

    // A failing report aborts the loop, but whatever was assembled up to
    // that point is still written before the failure is reported.
    let outcome = process_reports(cli, &mut assembler);

    fs::write(&cli.summary_path, assembler.summary_document())
        .with_context(|| format!("Failed to write {}", cli.summary_path.display()))?;
    fs::write(&cli.details_path, assembler.details_document())
        .with_context(|| format!("Failed to write {}", cli.details_path.display()))?;

    outcome?;

    println!(
        "{} {} and {}",
        "Wrote".green(),
        cli.summary_path.display().to_string().cyan(),
        cli.details_path.display().to_string().cyan()
    );

    Ok(())
}

fn process_reports(cli: &Cli, assembler: &mut ReportAssembler) -> Result<()> {
    let reports = discovery::find_reports(&cli.filename)?;
    let mut resolver = PackageResolver::new();

    for path in &reports {
        let doc = clover::parse_clover(path)?;
        let agg = aggregate(&doc, &mut resolver);
        assembler.push_report(&agg);
        println!(
            "{} {} ({} packages)",
            "✓".green(),
            path.display(),
            agg.packages.len()
        );
    }

    Ok(())
}
