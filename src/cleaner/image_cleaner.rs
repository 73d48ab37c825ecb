//! Image Cleaner Implementation
//! Author: kartik4091
//! Created: 2026-10-19
//!
//! Images are not deleted. Their stream is truncated to nothing and the
//! `/Length` and `/Filter` entries are reset, so the object and every
//! reference to it stay in place while the pixel data is gone.

use std::collections::HashSet;

use lopdf::{Object, ObjectId};
use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::pdf_document::PdfDocument;

#[derive(Debug, Default)]
pub struct ImageCleaner {
    /// Streams truncated by this instance; repeat encounters still count.
    zeroed: HashSet<ObjectId>,
    removed: usize,
}

impl ImageCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates every image the page uses and returns the number of image
    /// occurrences handled.
    ///
    /// Images that were already empty before this run are not counted, so
    /// cleaning a cleaned file reports nothing.
    #[instrument(level = "debug", skip(self, document))]
    pub fn clean_page(&mut self, document: &mut PdfDocument, page_id: ObjectId) -> Result<usize> {
        let mut removed = 0;

        for id in document.images(page_id)? {
            if !self.zeroed.contains(&id) && document.is_empty_stream(id)? {
                trace!("Image {:?} is already empty", id);
                continue;
            }

            strip_image(document, id)?;
            self.zeroed.insert(id);
            removed += 1;
        }

        if removed > 0 {
            debug!("Removed {} image(s) from page {:?}", removed, page_id);
        }
        self.removed += removed;
        Ok(removed)
    }

    pub fn total_removed(&self) -> usize {
        self.removed
    }

    /// Distinct image objects truncated so far
    pub fn distinct_removed(&self) -> usize {
        self.zeroed.len()
    }
}

fn strip_image(document: &mut PdfDocument, id: ObjectId) -> Result<()> {
    document.set_key(id, "Length", Object::Integer(0))?;
    document.set_key(id, "Filter", Object::Null)?;
    document.replace_stream(id, Vec::new())
}
