// Output formatting — plain lines, a terminal chart, or JSON.

pub mod terminal;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::pipeline::processor::CloudReport;

/// How the finished cloud is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `term count` pair per line
    #[default]
    Plain,
    /// Colored bar chart
    Pretty,
    /// The full report as JSON
    Json,
}

/// Write a report to stdout in the chosen format.
pub fn emit(report: &CloudReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            terminal::print_entries(&report.entries).context("Failed to write word cloud")?
        }
        OutputFormat::Pretty => terminal::display_cloud(report),
        OutputFormat::Json => println!("{}", to_json(report)?),
    }
    Ok(())
}

/// Serialize a report as pretty-printed JSON.
pub fn to_json(report: &CloudReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize cloud report")
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Counts characters, not bytes, so multi-byte words never split mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}
