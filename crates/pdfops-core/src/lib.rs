//! PDF capability layer for the claims document engines
//!
//! Page-sequence merging with destructive overwrite of the target, per-page
//! text extraction with whitespace normalization, the merge-idempotence
//! check, a positioned-word model for scanning report PDFs, and highlight
//! annotation output. Built on lopdf; pdf-extract is kept as a
//! whole-document fallback for files lopdf yields no text from.

pub mod annot;
pub mod error;
pub mod merge;
pub mod text;
pub mod words;

pub use annot::{write_annotated_copy, Highlight, Rgb};
pub use error::PdfOpsError;
pub use merge::{merge_into, merge_sequence};
pub use text::{already_merged, document_text, normalize_whitespace, MIN_CHARS, PAGES_TO_CHECK};
pub use words::{document_words, layout_words, page_words, Word, WordBox};

use std::path::Path;

/// Number of pages in the document at `path`.
pub fn page_count(path: &Path) -> Result<u32, PdfOpsError> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| PdfOpsError::Parse(format!("{}: {}", path.display(), e)))?;
    Ok(doc.get_pages().len() as u32)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn page_count_counts_generated_pages() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        testpdf::write_pdf(&path, &["uno", "dos", "tres"]);
        assert_eq!(page_count(&path).unwrap(), 3);
    }

    #[test]
    fn page_count_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("not_a_pdf.pdf");
        std::fs::write(&path, b"plain text").unwrap();
        assert!(page_count(&path).is_err());
    }
}
