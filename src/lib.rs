//! Strips annotations and images from PDF files.
//!
//! The heavy lifting (parsing, object model, writing) is done by `lopdf`;
//! this crate walks the pages, deletes annotations, truncates image
//! streams and saves a copy.
//!
//! ```no_run
//! use std::path::Path;
//! use pdf_cleaner::PdfCleaner;
//!
//! let report = PdfCleaner::new().clean(Path::new("report.pdf"), None)?;
//! assert!(report.output.ends_with("report_cleaned.pdf"));
//! # Ok::<(), pdf_cleaner::Error>(())
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod pdf_document;
pub mod report;
pub mod utils;

pub use cleaner::{clean_pdf, AnnotationCleaner, ImageCleaner, PdfCleaner};
pub use config::CleanerConfig;
pub use error::{CleanerError, Error, Result};
pub use pdf_document::{Annotation, AnnotationRef, PdfDocument, SaveOptions};
pub use report::{CleanReport, ReportFormat, ReportFormatter};
