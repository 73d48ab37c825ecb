//! PDF Document abstraction
//! Author: kartik4905
//! Created: 2026-10-19
//!
//! A narrow view over `lopdf::Document` exposing only what the cleaner
//! needs: page enumeration, annotation listing and deletion, image
//! listing, raw key/stream edits and saving. Documents protected by the
//! standard security handler with an empty user password are decrypted on
//! open and written back unencrypted. The handle owns the parsed document,
//! so it is released on every exit path when it goes out of scope.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use lopdf::encryption::{self, DecryptionError};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument, trace, warn};

use crate::error::{CleanerError, Error, Result};

/// Annotation subtypes that are never listed on their own: links and form
/// widgets are structural, popups belong to their parent annotation.
const UNLISTED_SUBTYPES: [&str; 3] = ["Link", "Widget", "Popup"];

/// Guards resource walks against malformed, self-referencing form XObjects.
const MAX_FORM_DEPTH: usize = 32;

/// Where an annotation is stored
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationRef {
    /// Indirect object referenced from `/Annots`
    Object(ObjectId),
    /// Dictionary written directly into the `/Annots` array
    Inline(Dictionary),
}

/// Annotation attached to a page
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub target: AnnotationRef,
    pub subtype: Option<String>,
    /// Popup annotation owned by this one, deleted along with it
    pub popup: Option<ObjectId>,
}

/// Options applied when writing the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Drop objects unreachable from the trailer and renumber the rest
    pub prune_unreferenced: bool,
    /// Deflate streams that allow compression
    pub compress_streams: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            prune_unreferenced: true,
            compress_streams: true,
        }
    }
}

/// Open PDF document handle
#[derive(Debug)]
pub struct PdfDocument {
    inner: Document,
    path: PathBuf,
}

impl PdfDocument {
    /// Loads and parses a PDF file into memory.
    #[instrument(level = "debug")]
    pub fn open(path: &Path) -> Result<Self> {
        let inner = Document::load(path).map_err(Error::load)?;
        debug!(
            "Opened {} (PDF {}, {} objects)",
            path.display(),
            inner.version,
            inner.objects.len()
        );
        let mut document = Self {
            inner,
            path: path.to_path_buf(),
        };
        document.decrypt()?;
        Ok(document)
    }

    /// Wraps an already parsed document.
    pub fn from_document(inner: Document, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Page object ids in document order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().into_values().collect()
    }

    /// Snapshot of the annotations currently attached to a page.
    ///
    /// Both indirect and inline `/Annots` entries are listed; links, widgets
    /// and popups are skipped.
    pub fn annotations(&self, page_id: ObjectId) -> Result<Vec<Annotation>> {
        let Some(entries) = self.annots_array(page_id)? else {
            return Ok(Vec::new());
        };

        let mut annotations = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for entry in entries {
            let (target, dict) = match entry {
                Object::Reference(id) => {
                    let Ok(dict) = self.inner.get_dictionary(*id) else {
                        debug!("Skipping dangling annotation reference {:?}", id);
                        continue;
                    };
                    if !seen.insert(*id) {
                        continue;
                    }
                    (AnnotationRef::Object(*id), dict)
                }
                Object::Dictionary(dict) => (AnnotationRef::Inline(dict.clone()), dict),
                other => {
                    warn!("Skipping malformed /Annots entry {:?} on page {:?}", other, page_id);
                    continue;
                }
            };

            let subtype = name_of(dict, b"Subtype");
            if subtype
                .as_deref()
                .is_some_and(|s| UNLISTED_SUBTYPES.contains(&s))
            {
                continue;
            }

            annotations.push(Annotation {
                target,
                subtype,
                popup: dict.get(b"Popup").and_then(|p| p.as_reference()).ok(),
            });
        }
        Ok(annotations)
    }

    /// Detaches an annotation (and its popup) from the page and deletes the
    /// objects.
    pub fn delete_annotation(&mut self, page_id: ObjectId, annotation: &Annotation) -> Result<()> {
        let mut doomed: Vec<ObjectId> = annotation.popup.into_iter().collect();
        if let AnnotationRef::Object(id) = &annotation.target {
            doomed.push(*id);
        }

        let entries = self.annots_array_mut(page_id)?.ok_or_else(|| {
            CleanerError::Annotation(format!("page {:?} has no /Annots array", page_id))
        })?;
        let attached = match &annotation.target {
            AnnotationRef::Object(id) => entries
                .iter()
                .any(|entry| entry.as_reference().ok() == Some(*id)),
            AnnotationRef::Inline(dict) => match entries
                .iter()
                .position(|entry| matches!(entry, Object::Dictionary(d) if d == dict))
            {
                Some(index) => {
                    entries.remove(index);
                    true
                }
                None => false,
            },
        };
        if !attached {
            return Err(CleanerError::Annotation(format!(
                "annotation {:?} is not attached to page {:?}",
                annotation.target, page_id
            ))
            .into());
        }
        entries.retain(|entry| !matches!(entry.as_reference(), Ok(id) if doomed.contains(&id)));

        // Other references to these objects are left dangling and read as null.
        for id in doomed {
            self.inner.objects.remove(&id);
        }
        trace!("Deleted annotation {:?} from page {:?}", annotation.target, page_id);
        Ok(())
    }

    /// Image XObjects used by a page, in "full" listing mode: resources
    /// inherited from the page tree count, images inside form XObjects
    /// count, and an image reachable several ways is listed every time.
    pub fn images(&self, page_id: ObjectId) -> Result<Vec<ObjectId>> {
        let mut images = Vec::new();
        if let Some(resources) = self.page_resources(page_id)? {
            let mut forms = HashSet::new();
            self.collect_images(resources, &mut forms, 0, &mut images);
        }
        Ok(images)
    }

    /// Sets `key` on the dictionary of object `id` (or of its stream).
    pub fn set_key(&mut self, id: ObjectId, key: &str, value: Object) -> Result<()> {
        match self.inner.get_object_mut(id).map_err(|e| object_error(id, e))? {
            Object::Dictionary(dict) => dict.set(key, value),
            Object::Stream(stream) => stream.dict.set(key, value),
            _ => {
                return Err(CleanerError::Image(format!(
                    "object {:?} has no dictionary to set /{} on",
                    id, key
                ))
                .into())
            }
        }
        Ok(())
    }

    /// Replaces the raw bytes of stream `id`. The bytes are stored exactly
    /// as given and excluded from save-time compression.
    pub fn replace_stream(&mut self, id: ObjectId, content: Vec<u8>) -> Result<()> {
        let stream = self
            .inner
            .get_object_mut(id)
            .and_then(Object::as_stream_mut)
            .map_err(|e| object_error(id, e))?;
        stream.set_content(content);
        stream.allows_compression = false;
        Ok(())
    }

    /// Whether stream `id` currently holds no bytes
    pub fn is_empty_stream(&self, id: ObjectId) -> Result<bool> {
        let stream = self
            .inner
            .get_object(id)
            .and_then(Object::as_stream)
            .map_err(|e| object_error(id, e))?;
        Ok(stream.content.is_empty())
    }

    /// Writes the document to `path`, overwriting any existing file.
    #[instrument(level = "debug", skip(self))]
    pub fn save(&mut self, path: &Path, options: SaveOptions) -> Result<()> {
        if options.prune_unreferenced {
            let pruned = self.inner.prune_objects();
            self.inner.renumber_objects();
            debug!("Pruned {} unreferenced objects", pruned.len());
        }
        if options.compress_streams {
            self.inner.compress();
        }

        self.inner.save(path).map_err(Error::save)?;
        debug!("Saved {}", path.display());
        Ok(())
    }

    /// Releases the document.
    pub fn close(self) {
        debug!("Closing {}", self.path.display());
    }

    /// Decrypts every string and stream in place when the document uses the
    /// standard security handler, trying the empty user password. The
    /// `/Encrypt` entry is dropped so the document saves unencrypted.
    fn decrypt(&mut self) -> Result<()> {
        let Ok(entry) = self.inner.trailer.get(b"Encrypt") else {
            return Ok(());
        };
        let encrypt_id = entry
            .as_reference()
            .map_err(|_| CleanerError::Load("unsupported inline /Encrypt dictionary".into()))?;

        let key = encryption::get_encryption_key(&self.inner, "", true)
            .map_err(|e| CleanerError::Load(format!("cannot decrypt document: {}", e)))?;

        let mut decrypted = 0;
        for (&id, object) in self.inner.objects.iter_mut() {
            if id == encrypt_id {
                continue;
            }
            if let Object::Stream(stream) = &*object {
                if stream.dict.type_is(b"XRef") {
                    continue;
                }
            }
            decrypt_in_place(&key, id, object)
                .map_err(|e| CleanerError::Load(format!("cannot decrypt object {:?}: {}", id, e)))?;
            decrypted += 1;
        }

        self.inner.trailer.remove(b"Encrypt");
        self.inner.objects.remove(&encrypt_id);
        debug!("Decrypted {} objects", decrypted);
        Ok(())
    }

    fn annots_array(&self, page_id: ObjectId) -> Result<Option<&Vec<Object>>> {
        let page = self.page_dict(page_id)?;
        let Ok(annots) = page.get(b"Annots") else {
            return Ok(None);
        };
        let (_, annots) = self.inner.dereference(annots).map_err(Error::load)?;
        Ok(annots.as_array().ok())
    }

    fn annots_array_mut(&mut self, page_id: ObjectId) -> Result<Option<&mut Vec<Object>>> {
        let holder = match self.page_dict(page_id)?.get(b"Annots") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => return Ok(None),
        };

        let annots = match holder {
            Some(id) => self.inner.get_object_mut(id),
            None => self
                .inner
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .and_then(|page| page.get_mut(b"Annots")),
        }
        .map_err(|e| CleanerError::Annotation(e.to_string()))?;

        Ok(annots.as_array_mut().ok())
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary> {
        self.inner
            .get_dictionary(page_id)
            .map_err(|e| CleanerError::Load(format!("page {:?}: {}", page_id, e)).into())
    }

    /// Resources of a page, walking up the page tree when the page itself
    /// carries none.
    fn page_resources(&self, page_id: ObjectId) -> Result<Option<&Dictionary>> {
        let mut node = self.page_dict(page_id)?;
        let mut visited = HashSet::from([page_id]);

        loop {
            if let Ok(resources) = node.get(b"Resources") {
                return Ok(self.resolve_dict(resources));
            }
            let Ok(parent_id) = node.get(b"Parent").and_then(|p| p.as_reference()) else {
                return Ok(None);
            };
            if !visited.insert(parent_id) {
                warn!("Page tree cycle at {:?}", parent_id);
                return Ok(None);
            }
            match self.inner.get_dictionary(parent_id) {
                Ok(parent) => node = parent,
                Err(_) => return Ok(None),
            }
        }
    }

    fn collect_images(
        &self,
        resources: &Dictionary,
        forms: &mut HashSet<ObjectId>,
        depth: usize,
        images: &mut Vec<ObjectId>,
    ) {
        let Some(xobjects) = resources.get(b"XObject").ok().and_then(|x| self.resolve_dict(x)) else {
            return;
        };

        for (_, value) in xobjects.iter() {
            let Ok(id) = value.as_reference() else {
                continue;
            };
            let Ok(stream) = self.inner.get_object(id).and_then(Object::as_stream) else {
                continue;
            };

            match name_of(&stream.dict, b"Subtype").as_deref() {
                Some("Image") => images.push(id),
                Some("Form") => {
                    if depth >= MAX_FORM_DEPTH || !forms.insert(id) {
                        continue;
                    }
                    if let Some(nested) = stream
                        .dict
                        .get(b"Resources")
                        .ok()
                        .and_then(|r| self.resolve_dict(r))
                    {
                        self.collect_images(nested, forms, depth + 1, images);
                    }
                    forms.remove(&id);
                }
                _ => {}
            }
        }
    }

    fn resolve_dict<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        self.inner
            .dereference(object)
            .ok()
            .and_then(|(_, object)| object.as_dict().ok())
    }
}

impl Drop for PdfDocument {
    fn drop(&mut self) {
        trace!("Released document handle for {}", self.path.display());
    }
}

fn name_of(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .and_then(|v| v.as_name())
        .ok()
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

/// Decrypts all strings nested anywhere in `object`, and the data of a
/// stream, with the per-object key derived from `key` and `id`.
fn decrypt_in_place(key: &[u8], id: ObjectId, object: &mut Object) -> StdResult<(), DecryptionError> {
    match object {
        Object::String(content, _) => {
            let cipher = Object::string_literal(std::mem::take(content));
            *content = encryption::decrypt_object(key, id, &cipher)?;
        }
        Object::Array(items) => {
            for item in items.iter_mut() {
                decrypt_in_place(key, id, item)?;
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                decrypt_in_place(key, id, value)?;
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                decrypt_in_place(key, id, value)?;
            }
            let cipher = Object::string_literal(std::mem::take(&mut stream.content));
            stream.set_content(encryption::decrypt_object(key, id, &cipher)?);
        }
        _ => {}
    }
    Ok(())
}

fn object_error(id: ObjectId, e: lopdf::Error) -> Error {
    CleanerError::Image(format!("object {:?}: {}", id, e)).into()
}
