use metaclean_core::{HighlightedReport, MetadataReport};
use serde::Serialize;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count with two decimals: `1536` -> `"1.50 KB"`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}

/// Percentage of bytes saved by cleaning; negative when the file grew.
pub fn size_change_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0;
    }
    (before as f64 - after as f64) * 100.0 / before as f64
}

/// JSON view of a metadata report
#[derive(Debug, Serialize)]
pub struct ReportView<'a> {
    pub filename: &'a str,
    pub metadata: &'a str,
    pub size: String,
}

/// JSON view of a finished clean
#[derive(Debug, Serialize)]
pub struct CleanView<'a> {
    pub filename: &'a str,
    pub cleaned_path: String,
    pub before: &'a HighlightedReport,
    pub removed: usize,
    pub after: &'a str,
    pub size_before: String,
    pub size_after: String,
}

/// Plain-text rendering of a report, or the sentinel when it is empty.
pub fn render_report(report: &MetadataReport) -> String {
    report.as_wire_text().to_string()
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
