//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a batch run:
//! timing, concurrency counters, errors, and one table row per record.

use crate::harvest::BatchReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of a batch run to a file
///
/// # Arguments
///
/// * `report` - The batch report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &BatchReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a batch report as markdown
pub fn format_markdown_summary(report: &BatchReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Sumi-Harvest Batch Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!(
        "- **Started**: {}\n",
        stats.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Finished**: {}\n",
        stats.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        stats.elapsed.as_secs_f64()
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **URLs Submitted**: {}\n", stats.total_urls));
    md.push_str(&format!("- **Succeeded**: {}\n", stats.succeeded));
    md.push_str(&format!("- **Failed**: {}\n", stats.failed()));
    md.push_str(&format!("- **Cancelled**: {}\n", stats.cancelled));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    md.push_str("## Concurrency\n\n");
    md.push_str(&format!(
        "- **Concurrency Cap**: {}\n",
        stats.max_concurrent_fetches
    ));
    md.push_str(&format!("- **Peak In Flight**: {}\n", stats.peak_in_flight));
    md.push_str(&format!(
        "- **Admission Waits**: {}\n\n",
        stats.admission_waits
    ));

    if stats.failed() > 0 {
        md.push_str("## Errors\n\n");
        md.push_str("| Kind | Count |\n");
        md.push_str("|------|-------|\n");
        for (kind, count) in &stats.failures {
            md.push_str(&format!("| {} | {} |\n", kind, count));
        }
        if stats.panicked > 0 {
            md.push_str(&format!("| Panicked | {} |\n", stats.panicked));
        }
        md.push('\n');
    }

    md.push_str("## Sites\n\n");
    md.push_str("| # | URL | Scheme | Host | Port | Server | Content-Type | Body Bytes |\n");
    md.push_str("|---|-----|--------|------|------|--------|--------------|------------|\n");
    for (index, record) in report.records.iter().enumerate() {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            index + 1,
            escape_cell(&record.source_url),
            record.scheme,
            escape_cell(&record.host),
            record.port,
            escape_cell(&record.server_header),
            escape_cell(&record.content_type),
            record.body.len()
        ));
    }

    md
}

/// Keeps a value from breaking the table layout
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}
