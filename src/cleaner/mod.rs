//! Cleaner modules for stripping annotations and images

pub mod annotation_cleaner;
pub mod image_cleaner;
pub mod pdf_cleaner;

pub use annotation_cleaner::AnnotationCleaner;
pub use image_cleaner::ImageCleaner;
pub use pdf_cleaner::{clean_pdf, PdfCleaner};
