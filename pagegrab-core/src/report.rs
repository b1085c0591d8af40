// End-of-run summaries for a grab

use pagegrab_scanner::result::{ItemKind, ItemStatus, SpiderReport};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub saved: usize,
    pub missing: usize,
    pub failed: usize,
}

impl CategoryCounts {
    pub fn of(report: &SpiderReport, kind: ItemKind) -> Self {
        Self {
            saved: report.count(kind, ItemStatus::Saved),
            missing: report.count(kind, ItemStatus::Missing),
            failed: report.count(kind, ItemStatus::Failed),
        }
    }

    pub fn total(&self) -> usize {
        self.saved + self.missing + self.failed
    }
}

pub fn render_report(report: &SpiderReport, format: ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report)
            .map_err(|e| format!("Failed to serialize report: {}", e)),
    }
}

pub fn generate_text_report(report: &SpiderReport) -> String {
    let mut text = String::new();

    text.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    text.push_str("# Summary:\n");
    text.push_str(&format!("  Page:         {}\n", report.page_url));
    text.push_str(&format!("  Output:       {}\n", report.output_dir.display()));
    text.push_str(&format!("  Duration:     {:.2}s\n", report.elapsed.as_secs_f64()));
    text.push_str(&format!("  Bytes saved:  {}\n\n", report.bytes_written()));

    for (label, kind) in [
        ("Resources", ItemKind::Resource),
        ("API calls", ItemKind::ApiCall),
        ("Well-known", ItemKind::WellKnown),
    ] {
        let counts = CategoryCounts::of(report, kind);
        let mut line = format!(
            "  {:<12}  {} saved, {} failed",
            format!("{}:", label),
            counts.saved,
            counts.failed
        );
        if kind == ItemKind::WellKnown {
            line.push_str(&format!(", {} not found", counts.missing));
        }
        text.push_str(&line);
        text.push('\n');
    }

    let overwrites: Vec<_> = report.overwrites().collect();
    if !overwrites.is_empty() {
        text.push_str(&format!("\n## Overwritten files ({})\n", overwrites.len()));
        for outcome in overwrites {
            text.push_str(&format!(
                "  {}\n      replaced {}\n",
                outcome.url,
                outcome.replaces.as_deref().unwrap_or_default()
            ));
        }
    }

    let failed: Vec<_> = report.all_outcomes().filter(|o| o.is_failed()).collect();
    if !failed.is_empty() {
        text.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
        text.push_str(&format!("## Failed items ({})\n", failed.len()));
        for outcome in failed {
            text.push_str(&format!(
                "  [{}] {}\n      {}\n",
                outcome.kind.as_str(),
                outcome.url,
                outcome.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    text.push('\n');
    text
}

pub fn generate_json_report(report: &SpiderReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "pagegrab",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "page_url": report.page_url,
            "output_dir": report.output_dir,
            "page_bytes": report.page_bytes,
            "duration_seconds": report.elapsed.as_secs_f64(),
            "summary": {
                "resources": CategoryCounts::of(report, ItemKind::Resource),
                "api_calls": CategoryCounts::of(report, ItemKind::ApiCall),
                "well_known": CategoryCounts::of(report, ItemKind::WellKnown),
                "failed": report.failed_count(),
                "overwritten": report.overwrites().count(),
                "bytes_written": report.bytes_written()
            },
            "resources": report.resources,
            "api_calls": report.api_calls,
            "well_known": report.well_known
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
