//! Text extraction and the merge-idempotence check
//!
//! Merges re-encode pages, so "already merged" can never be a byte
//! comparison; it is a normalized-text containment check instead. The check
//! fails open: any extraction problem is reported as "not merged" so a
//! needed merge is never silently skipped.

use crate::error::PdfOpsError;
use lopdf::Document;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

/// How many leading pages of the source are probed for containment.
pub const PAGES_TO_CHECK: usize = 2;
/// Minimum normalized length for a page text to count as evidence.
pub const MIN_CHARS: usize = 50;

/// Collapse every run of whitespace to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of one page, empty when that page yields none. Extraction problems
/// on a single page are not distinguishable from a blank page here; callers
/// that care operate on the whole document.
fn page_text(doc: &Document, page_number: u32) -> String {
    doc.extract_text(&[page_number]).unwrap_or_default()
}

/// Normalized text of the whole document: per-page extraction first, then a
/// whole-file pdf-extract pass for documents lopdf yields nothing from.
pub fn document_text(path: &Path) -> Result<String, PdfOpsError> {
    let doc = Document::load(path)
        .map_err(|e| PdfOpsError::Parse(format!("{}: {}", path.display(), e)))?;

    let joined = doc
        .get_pages()
        .keys()
        .map(|&number| normalize_whitespace(&page_text(&doc, number)))
        .collect::<Vec<_>>()
        .join(" ");
    if !joined.trim().is_empty() {
        return Ok(joined);
    }

    fallback_text(path)
}

/// Whole-document extraction via pdf-extract. Its font handling can panic
/// on malformed glyph tables, so the call is isolated.
fn fallback_text(path: &Path) -> Result<String, PdfOpsError> {
    let bytes = std::fs::read(path)?;
    match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    })) {
        Ok(Ok(text)) => Ok(normalize_whitespace(&text)),
        Ok(Err(e)) => Err(PdfOpsError::Extraction(e.to_string())),
        Err(_) => Err(PdfOpsError::Extraction(format!(
            "extractor panicked on {}",
            path.display()
        ))),
    }
}

/// Does the content of `source` already appear inside `target`?
///
/// Extracts and normalizes the full text of `target`, then checks whether
/// any of the first `pages_to_check` pages of `source` (with more than
/// `min_chars` of text) is a substring of it. A target with no extractable
/// text answers `false` without reading the source. Extraction failures on
/// either file answer `false` too, logged as degraded so operators can tell
/// the two cases apart.
pub fn already_merged(
    target: &Path,
    source: &Path,
    pages_to_check: usize,
    min_chars: usize,
) -> bool {
    match source_contained_in_target(target, source, pages_to_check, min_chars) {
        Ok(contained) => contained,
        Err(e) => {
            tracing::warn!(
                degraded = true,
                target_pdf = %target.display(),
                source_pdf = %source.display(),
                error = %e,
                "content check failed, assuming not merged"
            );
            false
        }
    }
}

fn source_contained_in_target(
    target: &Path,
    source: &Path,
    pages_to_check: usize,
    min_chars: usize,
) -> Result<bool, PdfOpsError> {
    let target_text = document_text(target)?;
    if target_text.trim().is_empty() {
        return Ok(false);
    }

    let source_doc = Document::load(source)
        .map_err(|e| PdfOpsError::Parse(format!("{}: {}", source.display(), e)))?;
    for (&number, _) in source_doc.get_pages().iter().take(pages_to_check) {
        let page = normalize_whitespace(&page_text(&source_doc, number));
        if page.chars().count() > min_chars && target_text.contains(&page) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::merge_into;
    use crate::testpdf::write_pdf;
    use tempfile::tempdir;

    const LONG_A: &str = "La carta glosa describe las observaciones del pagador sobre la factura radicada y detalla cada concepto objetado.";
    const LONG_B: &str = "Texto completamente distinto que no guarda relacion alguna con la carta original del expediente en tramite.";

    #[test]
    fn normalize_collapses_runs_of_whitespace() {
        assert_eq!(
            normalize_whitespace("uno  dos\n\ttres \r\n cuatro"),
            "uno dos tres cuatro"
        );
    }

    #[test]
    fn merge_then_check_reports_already_merged() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("respuesta.pdf");
        let source = dir.path().join("carta.pdf");
        write_pdf(&target, &[LONG_B]);
        write_pdf(&source, &[LONG_A]);

        assert!(!already_merged(&target, &source, PAGES_TO_CHECK, MIN_CHARS));
        merge_into(&target, &[source.clone()]).unwrap();
        assert!(already_merged(&target, &source, PAGES_TO_CHECK, MIN_CHARS));
    }

    #[test]
    fn unrelated_documents_are_not_merged() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("t.pdf");
        let source = dir.path().join("s.pdf");
        write_pdf(&target, &[LONG_A]);
        write_pdf(&source, &[LONG_B]);

        assert!(!already_merged(&target, &source, PAGES_TO_CHECK, MIN_CHARS));
    }

    #[test]
    fn short_pages_are_not_evidence() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("t.pdf");
        let source = dir.path().join("s.pdf");
        // Contained, but under the minimum length.
        write_pdf(&target, &["corto y contenido"]);
        write_pdf(&source, &["corto y contenido"]);

        assert!(!already_merged(&target, &source, PAGES_TO_CHECK, MIN_CHARS));
    }

    #[test]
    fn only_leading_source_pages_are_probed() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("t.pdf");
        let source = dir.path().join("s.pdf");
        write_pdf(&target, &[LONG_A]);
        // The matching page sits third; with pages_to_check = 2 it is never
        // reached.
        write_pdf(&source, &[LONG_B, LONG_B, LONG_A]);

        assert!(!already_merged(&target, &source, 2, MIN_CHARS));
        assert!(already_merged(&target, &source, 3, MIN_CHARS));
    }

    #[test]
    fn unreadable_target_fails_open() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("broken.pdf");
        let source = dir.path().join("s.pdf");
        std::fs::write(&target, b"not a pdf").unwrap();
        write_pdf(&source, &[LONG_A]);

        assert!(!already_merged(&target, &source, PAGES_TO_CHECK, MIN_CHARS));
    }
}
