// Terminal output for finished clouds.
//
// `print_entries` is the plain, pipe-friendly form. `display_cloud` draws a
// bar chart scaled to the most frequent word.

use std::io::{self, Write};

use colored::Colorize;

use crate::cloud::frequency::FrequencyEntry;
use crate::pipeline::processor::CloudReport;

const BAR_WIDTH: usize = 30;
const TERM_WIDTH: usize = 24;

/// Print each entry on its own line, in rank order.
pub fn print_entries(entries: &[FrequencyEntry]) -> io::Result<()> {
    write_entries(&mut io::stdout().lock(), entries)
}

/// Write `term count` lines, in rank order.
pub fn write_entries<W: Write>(out: &mut W, entries: &[FrequencyEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{entry}")?;
    }
    out.flush()
}

/// Draw the cloud as a ranked, colored bar chart.
pub fn display_cloud(report: &CloudReport) {
    println!(
        "\n{}",
        format!(
            "=== Word cloud for \"{}\" ({} documents, {} words) ===",
            report.term, report.documents, report.total_tokens
        )
        .bold()
    );
    println!();

    if report.entries.is_empty() {
        println!("  No words met the threshold. Try a lower --min-count or a deeper crawl.");
        return;
    }

    let max = report.entries.first().map(|e| e.count).unwrap_or(1).max(1);

    for (i, entry) in report.entries.iter().enumerate() {
        let filled = bar_len(entry.count, max);
        let bar = format!("{}{}", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled));
        let share = entry.count as f64 / max as f64;

        let colored_bar = if share >= 0.66 {
            bar.bright_green()
        } else if share >= 0.33 {
            bar.bright_yellow()
        } else {
            bar.bright_blue()
        };

        println!(
            "  {:>3}. {:<width$} [{}] {}",
            i + 1,
            super::truncate_chars(&entry.term, TERM_WIDTH).bold(),
            colored_bar,
            entry.count.to_string().dimmed(),
            width = TERM_WIDTH + 3,
        );
    }
    println!();
}

/// Bar length for `count`, scaled so `max` fills the bar. Non-zero counts
/// always get at least one cell.
fn bar_len(count: u64, max: u64) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    let scaled = (count as f64 / max as f64 * BAR_WIDTH as f64).round() as usize;
    scaled.clamp(1, BAR_WIDTH)
}
