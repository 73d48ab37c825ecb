//! Report module: what a cleaning run did and how to print it
//! Author: kartik4091
//! Created: 2026-10-19

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod formatter;

pub use formatter::ReportFormatter;

/// Summary output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Three human-readable lines (default)
    #[default]
    #[value(name = "text")]
    PlainText,
    /// Pretty-printed JSON object
    Json,
}

/// Outcome of one cleaning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Page count before save-time compaction
    pub page_count: usize,
    pub annotations_removed: usize,
    /// Image occurrences, a shared image counts once per use
    pub images_removed: usize,
    /// Nothing was written
    pub dry_run: bool,
    pub generated_at: String,
}

impl CleanReport {
    pub fn new(
        input: PathBuf,
        output: PathBuf,
        page_count: usize,
        annotations_removed: usize,
        images_removed: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            input,
            output,
            page_count,
            annotations_removed,
            images_removed,
            dry_run,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Report generation errors
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
