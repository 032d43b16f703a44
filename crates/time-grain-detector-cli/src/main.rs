//! `detect-grain`: print the time grain a list of timestamps is aligned to.

mod input;
mod logging;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use time_grain_detector::{explain_grain, GrainReport};

use crate::input::{parse_document, read_source, InputFormat, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable, e.g. `1 month`.
    Text,
    /// `{"unit":"month","count":1}`.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "detect-grain",
    version,
    about = "Detect the coarsest time grain a list of timestamps is aligned to"
)]
struct Cli {
    /// Timestamps to classify. When omitted they are read from --input or stdin.
    timestamps: Vec<String>,

    /// Read timestamps from this file instead of stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Layout of the file or stdin document.
    #[arg(long, value_enum, default_value_t = InputFormat::Lines)]
    input_format: InputFormat,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Also print every catalog check and the mismatch indices.
    #[arg(long)]
    explain: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level)?;

    let points = if cli.timestamps.is_empty() {
        let source = read_source(cli.input.as_deref())?;
        parse_document(&source, cli.input_format)?
    } else {
        cli.timestamps.into_iter().map(Point::Text).collect()
    };
    if points.is_empty() {
        bail!("no timestamps provided");
    }
    tracing::info!(points = points.len(), "classifying timestamps");

    let report = explain_grain(points.iter().map(Point::as_timestamp))?;
    println!("{}", render(&report, cli.output, cli.explain)?);
    Ok(())
}

fn render(report: &GrainReport, output: OutputFormat, explain: bool) -> Result<String> {
    Ok(match (output, explain) {
        (OutputFormat::Text, false) => report.grain.to_string(),
        (OutputFormat::Text, true) => render_explained(report),
        (OutputFormat::Json, false) => serde_json::to_string(&report.grain)?,
        (OutputFormat::Json, true) => serde_json::to_string_pretty(report)?,
    })
}

fn render_explained(report: &GrainReport) -> String {
    let label = |index: usize| {
        report
            .checks
            .get(index)
            .and_then(|c| c.grain)
            .map_or_else(|| "end".to_string(), |g| g.to_string())
    };

    let mut lines = vec![
        format!("grain: {}", report.grain),
        format!(
            "first mismatch: {} ({})",
            report.first_mismatch,
            label(report.first_mismatch)
        ),
        format!(
            "first mismatch with skips: {} ({})",
            report.first_mismatch_with_skips,
            label(report.first_mismatch_with_skips)
        ),
        "checks:".to_string(),
    ];
    for (index, check) in report.checks.iter().enumerate() {
        let mark = if check.aligned { "x" } else { " " };
        let skippable = if check.skippable { " (skippable)" } else { "" };
        lines.push(format!("  [{mark}] {}{skippable}", label(index)));
    }
    lines.join("\n")
}
