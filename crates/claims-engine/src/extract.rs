//! Invoice/code extraction from file and folder names
//!
//! Thin typed layer over the patterns: every function returns an
//! `InvoiceCode` (series uppercased, number verbatim) or nothing.

use crate::patterns;
use shared_types::{DocumentRole, InvoiceCode};

/// Base name with the last extension stripped.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name,
    }
}

fn has_extension(file_name: &str, extension: &str) -> bool {
    file_name.to_lowercase().ends_with(extension)
}

pub fn is_pdf(file_name: &str) -> bool {
    has_extension(file_name, ".pdf")
}

pub fn is_xml(file_name: &str) -> bool {
    has_extension(file_name, ".xml")
}

/// Code of an invoice document (`0001_FECR200_FACTURA.pdf`).
pub fn invoice_code(file_name: &str) -> Option<InvoiceCode> {
    patterns::INVOICE
        .captures(file_name)
        .map(|caps| InvoiceCode::new(&caps[1], &caps[2]))
}

/// Code of a loose known-series file (`FECR200.pdf`); the digits must
/// follow the series directly. With `anchored_end` the base name must be
/// exactly the code.
pub fn known_series_code(file_name: &str, anchored_end: bool) -> Option<InvoiceCode> {
    let base = base_name(file_name);
    let pattern = if anchored_end {
        &*patterns::KNOWN_SERIES_EXACT
    } else {
        &*patterns::KNOWN_SERIES_PREFIX
    };
    pattern
        .captures(base)
        .map(|caps| InvoiceCode::new(&caps[1], &caps[2]))
}

/// Code inside an XML export name; the code may be decorated on both sides.
pub fn xml_code(file_name: &str) -> Option<InvoiceCode> {
    if !is_xml(file_name) {
        return None;
    }
    patterns::KNOWN_SERIES_ANYWHERE
        .captures(base_name(file_name))
        .map(|caps| InvoiceCode::new(&caps[1], &caps[2]))
}

/// Role of a loose file in a reconciliation pool: an invoice document or a
/// known-series response/support. Everything else plays no role.
pub fn loose_file_role(file_name: &str) -> Option<DocumentRole> {
    if let Some(code) = invoice_code(file_name) {
        return Some(DocumentRole::Invoice(code));
    }
    known_series_code(file_name, false).map(DocumentRole::ResponseVerifiable)
}

/// Canonical name a response file gets when placed into its claim folder:
/// `SERIESNUMBER.pdf` when the name parses, otherwise the original name
/// with spaces removed and dot runs collapsed.
pub fn canonical_response_name(file_name: &str) -> String {
    if let Some(code) = known_series_code(file_name, false) {
        return format!("{}{}.pdf", code.series, code.number);
    }
    let cleaned = file_name.replace(' ', "");
    patterns::DOT_RUNS.replace_all(&cleaned, ".").into_owned()
}

/// Series of the folder's reference document, for branch relocation. Tries
/// the current naming first, then the legacy one.
pub fn reference_series(file_name: &str) -> Option<String> {
    patterns::SERIES_REFERENCE_NEW
        .captures(file_name)
        .or_else(|| patterns::SERIES_REFERENCE_LEGACY.captures(file_name))
        .map(|caps| caps[1].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn invoice_code_uppercases_series_and_keeps_number() {
        let code = invoice_code("0001_fecr0200_FACTURA.pdf").unwrap();
        assert_eq!(code, InvoiceCode::new("FECR", "0200"));
        assert_eq!(code.key(), "FECR_0200");
    }

    #[test]
    fn known_series_rejects_foreign_series() {
        assert!(known_series_code("FECR200.pdf", false).is_some());
        assert!(known_series_code("ABCD200.pdf", false).is_none());
    }

    #[test]
    fn anchored_variant_rejects_decorated_names() {
        assert!(known_series_code("FECR200-copia.pdf", false).is_some());
        assert!(known_series_code("FECR200-copia.pdf", true).is_none());
    }

    #[test]
    fn xml_code_found_anywhere_in_the_base_name() {
        let code = xml_code("ad09_FECR200_respuesta.xml").unwrap();
        assert_eq!(code.key(), "FECR_200");
        assert!(xml_code("FECR200.pdf").is_none());
    }

    #[test]
    fn loose_role_prefers_invoice_over_response() {
        match loose_file_role("12345_COEX8_FACTURA.pdf") {
            Some(DocumentRole::Invoice(code)) => assert_eq!(code.key(), "COEX_8"),
            other => panic!("unexpected role: {other:?}"),
        }
        match loose_file_role("COEX8.pdf") {
            Some(DocumentRole::ResponseVerifiable(code)) => assert_eq!(code.key(), "COEX_8"),
            other => panic!("unexpected role: {other:?}"),
        }
        assert!(loose_file_role("listado.pdf").is_none());
    }

    #[test]
    fn canonical_name_normalizes_parseable_responses() {
        assert_eq!(canonical_response_name("fecr0158.PDF"), "FECR0158.pdf");
        assert_eq!(canonical_response_name("FERD158.pdf"), "FERD158.pdf");
    }

    #[test]
    fn canonical_name_cleans_unparseable_responses() {
        assert_eq!(
            canonical_response_name("respuesta final..2024 .pdf"),
            "respuestafinal.2024.pdf"
        );
    }

    #[test]
    fn reference_series_tries_both_namings() {
        assert_eq!(
            reference_series("0001_COEX10_FACTURA.pdf").as_deref(),
            Some("COEX")
        );
        assert_eq!(
            reference_series("0001_COEX10_EPICRISIS.pdf").as_deref(),
            Some("COEX")
        );
        assert_eq!(
            reference_series("0001_FERD_158.pdf").as_deref(),
            Some("FERD")
        );
        assert_eq!(reference_series("soporte.pdf"), None);
    }
}
