//! PDF Cleaner Implementation
//! Author: kartik4091
//! Strips annotations and image data from a document and writes a copy.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use super::annotation_cleaner::AnnotationCleaner;
use super::image_cleaner::ImageCleaner;
use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result};
use crate::pdf_document::{PdfDocument, SaveOptions};
use crate::report::{CleanReport, ReportFormat, ReportFormatter};
use crate::utils::io::{derive_output_path, ensure_input_exists, is_same_file};

#[derive(Debug, Default)]
pub struct PdfCleaner {
    config: CleanerConfig,
}

impl PdfCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CleanerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Output path used when none is given explicitly
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        derive_output_path(input, &self.config.output_suffix)
    }

    /// Cleans `input` and writes the result to `output`, or next to the
    /// input with the configured suffix.
    ///
    /// A missing input fails with [`crate::Error::NotFound`] before the file
    /// is opened. The input itself is never written.
    #[instrument(skip_all, fields(input = %input.display()))]
    pub fn clean(&self, input: &Path, output: Option<&Path>) -> Result<CleanReport> {
        ensure_input_exists(input)?;

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_path_for(input));
        if !self.config.dry_run && is_same_file(input, &output) {
            return Err(CleanerError::SameFile(output).into());
        }

        let mut document = PdfDocument::open(input)?;
        let mut annotations = AnnotationCleaner::new();
        let mut images = ImageCleaner::new();

        for page_id in document.page_ids() {
            if self.config.remove_annotations {
                annotations.clean_page(&mut document, page_id)?;
            }
            if self.config.remove_images {
                images.clean_page(&mut document, page_id)?;
            }
        }

        // Counted before save: pruning renumbers objects.
        let page_count = document.page_count();

        if self.config.dry_run {
            info!("Dry run, not writing {}", output.display());
        } else {
            document.save(&output, self.save_options())?;
            info!("Wrote {}", output.display());
        }
        document.close();

        Ok(CleanReport::new(
            input.to_path_buf(),
            output,
            page_count,
            annotations.total_removed(),
            images.total_removed(),
            self.config.dry_run,
        ))
    }

    fn save_options(&self) -> SaveOptions {
        SaveOptions {
            prune_unreferenced: self.config.prune_unreferenced,
            compress_streams: self.config.compress_streams,
        }
    }
}

/// Cleans `input` with the default configuration, prints the plain-text
/// summary and returns the path written.
pub fn clean_pdf(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let report = PdfCleaner::new().clean(input, output)?;
    println!("{}", ReportFormatter::format(&report, ReportFormat::PlainText)?);
    Ok(report.output)
}
