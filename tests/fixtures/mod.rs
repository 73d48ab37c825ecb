//! Shared fixtures: small PDFs built with lopdf and helpers to inspect the
//! cleaned output.
//! Author: kartik4091

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::encryption;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use pdf_cleaner::PdfDocument;

/// Layout of one fixture page
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
    /// Annotation subtypes attached to the page. "Text" notes get a popup.
    pub annotations: Vec<&'static str>,
    /// Annotation subtypes written inline into `/Annots`
    pub inline_annotations: Vec<&'static str>,
    /// Number of distinct images drawn on the page
    pub images: usize,
    /// Also draw the document-wide shared image
    pub shared_image: bool,
}

impl FixturePage {
    pub fn new(annotations: &[&'static str], images: usize) -> Self {
        Self {
            annotations: annotations.to_vec(),
            inline_annotations: Vec::new(),
            images,
            shared_image: false,
        }
    }

    pub fn with_shared_image(mut self) -> Self {
        self.shared_image = true;
        self
    }

    pub fn with_inline(mut self, annotations: &[&'static str]) -> Self {
        self.inline_annotations = annotations.to_vec();
        self
    }
}

fn gray_image(doc: &mut Document, shade: u8) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 8,
            "Height" => 8,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![shade; 64],
    ))
}

pub fn build_pdf(pages: &[FixturePage]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let shared = if pages.iter().any(|p| p.shared_image) {
        Some(gray_image(&mut doc, 0x40))
    } else {
        None
    };

    let mut kids: Vec<Object> = Vec::new();
    for (index, page) in pages.iter().enumerate() {
        let mut xobjects = Dictionary::new();
        let mut content = String::new();
        for i in 0..page.images {
            let image = gray_image(&mut doc, (index * 16 + i) as u8);
            xobjects.set(format!("Im{}", i), image);
            content.push_str(&format!("q 50 0 0 50 {} 600 cm /Im{} Do Q\n", 60 * i + 20, i));
        }
        if let (true, Some(shared)) = (page.shared_image, shared) {
            xobjects.set("Shared", shared);
            content.push_str("q 50 0 0 50 20 500 cm /Shared Do Q\n");
        }

        let contents = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.new_object_id();

        let mut annots: Vec<Object> = Vec::new();
        for subtype in &page.annotations {
            let mut annot = dictionary! {
                "Type" => "Annot",
                "Subtype" => *subtype,
                "Rect" => vec![100.into(), 100.into(), 200.into(), 150.into()],
                "P" => page_id,
                "Contents" => Object::string_literal(format!("{} on page {}", subtype, index + 1)),
            };
            if *subtype == "Text" {
                let popup = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Popup",
                    "Rect" => vec![200.into(), 100.into(), 300.into(), 200.into()],
                });
                annot.set("Popup", popup);
                annots.push(doc.add_object(annot).into());
                annots.push(popup.into());
            } else {
                annots.push(doc.add_object(annot).into());
            }
        }

        for subtype in &page.inline_annotations {
            annots.push(Object::Dictionary(dictionary! {
                "Type" => "Annot",
                "Subtype" => *subtype,
                "Rect" => vec![300.into(), 100.into(), 400.into(), 150.into()],
            }));
        }

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => contents,
            "Resources" => dictionary! { "XObject" => xobjects },
        };
        if !annots.is_empty() {
            page_dict.set("Annots", annots);
        }
        doc.objects.insert(page_id, Object::Dictionary(page_dict));
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog);
    let info = doc.add_object(dictionary! {
        "Title" => Object::string_literal(FIXTURE_TITLE),
    });
    doc.trailer.set("Info", info);
    doc
}

pub const FIXTURE_TITLE: &str = "Quarterly report";

const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: [u8; 256] = [0; 256];
    for (i, slot) in s.iter_mut().enumerate() {
        *slot = i as u8;
    }

    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }

    let mut output = Vec::with_capacity(data.len());
    let mut i = 0u8;
    let mut j = 0u8;
    for &byte in data {
        i = i.wrapping_add(1);
        j = j.wrapping_add(s[i as usize]);
        s.swap(i as usize, j as usize);
        output.push(byte ^ s[(s[i as usize].wrapping_add(s[j as usize])) as usize]);
    }
    output
}

/// Per-object RC4 pass. RC4 is symmetric, so lopdf's object decryption
/// routine encrypts plaintext just as well.
fn encrypt_in_place(key: &[u8], id: ObjectId, object: &mut Object) {
    match object {
        Object::String(content, format) => {
            let plain = Object::string_literal(std::mem::take(content));
            *content = encryption::decrypt_object(key, id, &plain).unwrap();
            *format = StringFormat::Hexadecimal;
        }
        Object::Array(items) => items.iter_mut().for_each(|item| encrypt_in_place(key, id, item)),
        Object::Dictionary(dict) => dict.iter_mut().for_each(|(_, v)| encrypt_in_place(key, id, v)),
        Object::Stream(stream) => {
            stream.dict.iter_mut().for_each(|(_, v)| encrypt_in_place(key, id, v));
            let plain = Object::string_literal(std::mem::take(&mut stream.content));
            stream.set_content(encryption::decrypt_object(key, id, &plain).unwrap());
        }
        _ => {}
    }
}

/// Encrypts `doc` with the standard security handler, 40-bit RC4
/// (revision 2), under `user_password`.
pub fn encrypt_rc4(doc: &mut Document, user_password: &str) {
    let file_id = Object::String(b"pdf-cleaner-fix1".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
        "P" => -44,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let key = encryption::get_encryption_key(&*doc, user_password, false).unwrap();
    doc.get_object_mut(encrypt_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set(
            "U",
            Object::String(rc4(&key, &PASSWORD_PAD), StringFormat::Hexadecimal),
        );

    for (&id, object) in doc.objects.iter_mut() {
        if id != encrypt_id {
            encrypt_in_place(&key, id, object);
        }
    }
}

pub fn write_encrypted_pdf(
    dir: &Path,
    name: &str,
    pages: &[FixturePage],
    user_password: &str,
) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_pdf(pages);
    encrypt_rc4(&mut doc, user_password);
    doc.save(&path).unwrap();
    path
}

pub fn write_pdf(dir: &Path, name: &str, pages: &[FixturePage]) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_pdf(pages);
    doc.save(&path).unwrap();
    path
}

pub fn page_count(path: &Path) -> usize {
    PdfDocument::open(path).unwrap().page_count()
}

/// Annotations still listed on all pages of the file
pub fn annotation_count(path: &Path) -> usize {
    let pdf = PdfDocument::open(path).unwrap();
    pdf.page_ids()
        .into_iter()
        .map(|page| pdf.annotations(page).unwrap().len())
        .sum()
}

/// Image occurrences whose stream still carries data
pub fn nonempty_image_count(path: &Path) -> usize {
    let pdf = PdfDocument::open(path).unwrap();
    pdf.page_ids()
        .into_iter()
        .flat_map(|page| pdf.images(page).unwrap())
        .filter(|id| !pdf.is_empty_stream(*id).unwrap())
        .count()
}

/// Link annotations left on all pages, indirect or inline
pub fn link_count(path: &Path) -> usize {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .filter_map(|id| doc.get_dictionary(*id).ok())
        .filter_map(|page| page.get(b"Annots").ok())
        .filter_map(|annots| doc.dereference(annots).ok())
        .filter_map(|(_, annots)| annots.as_array().ok().cloned())
        .flatten()
        .filter_map(|entry| match entry {
            Object::Dictionary(dict) => Some(dict),
            Object::Reference(id) => doc.get_dictionary(id).ok().cloned(),
            _ => None,
        })
        .filter(|annot| {
            matches!(annot.get(b"Subtype").and_then(|s| s.as_name()), Ok(name) if name == b"Link")
        })
        .count()
}

/// Raw `/Annots` entries left on all pages
pub fn annots_entry_count(path: &Path) -> usize {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .filter_map(|id| doc.get_dictionary(*id).ok())
        .filter_map(|page| page.get(b"Annots").ok())
        .filter_map(|annots| doc.dereference(annots).ok())
        .filter_map(|(_, annots)| annots.as_array().ok().map(Vec::len))
        .sum()
}

/// Decoded content of the first page
pub fn first_page_content(doc: &Document) -> Vec<u8> {
    let first = *doc.get_pages().values().next().unwrap();
    doc.get_page_content(first).unwrap()
}

/// Title string from the document information dictionary
pub fn info_title(doc: &Document) -> Vec<u8> {
    let info = doc.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
    doc.get_dictionary(info)
        .and_then(|info| info.get(b"Title"))
        .and_then(Object::as_str)
        .unwrap()
        .to_vec()
}
