//! Annotation Cleaner Implementation
//! Author: kartik4091
//! Deletes comments, markup and other annotations page by page.

use lopdf::ObjectId;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::pdf_document::PdfDocument;

#[derive(Debug, Default)]
pub struct AnnotationCleaner {
    removed: usize,
}

impl AnnotationCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deletes every annotation the page carries right now and returns how
    /// many were removed.
    #[instrument(level = "debug", skip(self, document))]
    pub fn clean_page(&mut self, document: &mut PdfDocument, page_id: ObjectId) -> Result<usize> {
        let annotations = document.annotations(page_id)?;

        let mut removed = 0;
        for annotation in &annotations {
            document.delete_annotation(page_id, annotation)?;
            removed += 1;
        }

        if removed > 0 {
            debug!("Removed {} annotation(s) from page {:?}", removed, page_id);
        }
        self.removed += removed;
        Ok(removed)
    }

    /// Running total across all pages cleaned by this instance
    pub fn total_removed(&self) -> usize {
        self.removed
    }
}
