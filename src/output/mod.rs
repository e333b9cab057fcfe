//! Output module for presenting batch results
//!
//! This module handles:
//! - Rendering records as text or JSON
//! - Batch statistics
//! - Markdown summaries of a batch run

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{format_statistics, print_statistics, BatchStatistics};

use crate::site::SiteRecord;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// How records are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One block of lines per record
    #[default]
    Text,

    /// A JSON array of records
    Json,
}

/// Record as exposed in JSON output; the body is only included on request
#[derive(Serialize)]
struct RecordView<'a> {
    source_url: &'a str,
    scheme: &'a str,
    host: &'a str,
    port: u16,
    server_header: &'a str,
    content_type: &'a str,
    body_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

impl<'a> RecordView<'a> {
    fn new(record: &'a SiteRecord, show_body: bool) -> Self {
        Self {
            source_url: &record.source_url,
            scheme: &record.scheme,
            host: &record.host,
            port: record.port,
            server_header: &record.server_header,
            content_type: &record.content_type,
            body_bytes: record.body.len(),
            body: show_body.then_some(record.body.as_str()),
        }
    }
}

/// Renders records in the requested format
///
/// # Arguments
///
/// * `records` - The records to render, in batch order
/// * `format` - Text or JSON
/// * `show_body` - Whether response bodies are included
pub fn render_records(
    records: &[SiteRecord],
    format: OutputFormat,
    show_body: bool,
) -> OutputResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(records, show_body)),
        OutputFormat::Json => render_json(records, show_body),
    }
}

fn render_text(records: &[SiteRecord], show_body: bool) -> String {
    let mut out = String::new();

    for (index, record) in records.iter().enumerate() {
        if record.is_placeholder() {
            let _ = writeln!(out, "[{}] {} (no data)", index + 1, record.source_url);
            continue;
        }

        let _ = writeln!(out, "[{}] {}", index + 1, record.source_url);
        let _ = writeln!(
            out,
            "    scheme: {}  host: {}  port: {}",
            record.scheme, record.host, record.port
        );
        if !record.server_header.is_empty() {
            let _ = writeln!(out, "    server: {}", record.server_header);
        }
        let _ = writeln!(out, "    content-type: {}", record.content_type);
        let _ = writeln!(out, "    body: {} bytes", record.body.len());
        if show_body && !record.body.is_empty() {
            let _ = writeln!(out, "{}", record.body);
        }
    }

    out
}

fn render_json(records: &[SiteRecord], show_body: bool) -> OutputResult<String> {
    let views: Vec<RecordView<'_>> = records
        .iter()
        .map(|record| RecordView::new(record, show_body))
        .collect();
    Ok(serde_json::to_string_pretty(&views)?)
}
