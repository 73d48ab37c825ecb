//! Report formatter implementation
//! Author: kartik4091

use super::{CleanReport, ReportError, ReportFormat};

/// Formats a cleaning report for the terminal
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &CleanReport, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::PlainText => Ok(Self::to_text(report)),
            ReportFormat::Json => Self::to_json(report),
        }
    }

    fn to_text(report: &CleanReport) -> String {
        let last_line = if report.dry_run {
            format!("Dry run, nothing written (output would be: {})", report.output.display())
        } else {
            format!("Cleaned PDF saved to: {}", report.output.display())
        };

        format!(
            "Removed {} annotation(s) from {} page(s)\nRemoved {} image(s)\n{}",
            report.annotations_removed, report.page_count, report.images_removed, last_line
        )
    }

    fn to_json(report: &CleanReport) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
