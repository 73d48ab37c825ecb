//! Error types and handling for the PDF cleaner
//! Created: 2026-10-19
//! Author: kartik4905
//!
//! Two tiers: a missing input is reported on its own, everything else the
//! PDF library or the filesystem throws at us is a processing error.

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

use crate::report::ReportError;

/// Custom result type for cleaner operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for cleaner operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Input path does not exist; raised before the PDF library is touched
    #[error("Input file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Error processing PDF: {0}")]
    Processing(#[from] CleanerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl Error {
    /// Wraps any library failure that occurred while loading a document
    pub(crate) fn load<E: std::fmt::Display>(e: E) -> Self {
        Error::Processing(CleanerError::Load(e.to_string()))
    }

    /// Wraps any library failure that occurred while writing a document
    pub(crate) fn save<E: std::fmt::Display>(e: E) -> Self {
        Error::Processing(CleanerError::Save(e.to_string()))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Processing(CleanerError::Io(err))
    }
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CleanerError {
    #[error("failed to load document: {0}")]
    Load(String),

    #[error("annotation removal failed: {0}")]
    Annotation(String),

    #[error("image removal failed: {0}")]
    Image(String),

    #[error("failed to save document: {0}")]
    Save(String),

    #[error("refusing to overwrite the input file: {}", .0.display())]
    SameFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
