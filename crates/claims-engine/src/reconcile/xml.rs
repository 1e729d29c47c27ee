//! organize-loose-XML-by-invoice
//!
//! Billing XML exports are matched to claim folders through the invoice
//! code and renamed to the invoice document's base name, so the pair sits
//! together. A folder that already holds any XML is left alone; several
//! XMLs for one code are ambiguity, not a guess.

use super::{reconcile, KeyCardinality, ReconcileRules, TransferAction};
use crate::extract::{base_name, invoice_code, is_xml, xml_code};
use crate::fs_scan::{files_in, pdf_files_in};
use shared_types::{CancelToken, FolderFailure, FolderSuccess, InvoiceCode, ProgressSink, XmlResult};
use std::path::Path;

struct XmlRules;

impl XmlRules {
    fn invoice_file(folder: &Path) -> Option<String> {
        pdf_files_in(folder)
            .into_iter()
            .find(|name| invoice_code(name).is_some())
    }
}

impl ReconcileRules for XmlRules {
    fn source_key(&self, file_name: &str) -> Option<InvoiceCode> {
        xml_code(file_name)
    }

    fn anchor_key(&self, folder: &Path) -> Option<InvoiceCode> {
        Self::invoice_file(folder).and_then(|name| invoice_code(&name))
    }

    fn already_satisfied(&self, folder: &Path) -> bool {
        files_in(folder).iter().any(|name| is_xml(name))
    }

    fn cardinality(&self) -> KeyCardinality {
        KeyCardinality::One
    }

    fn destination_name(&self, source_name: &str, folder: &Path) -> String {
        match Self::invoice_file(folder) {
            Some(invoice) => format!("{}.xml", base_name(&invoice)),
            None => source_name.to_string(),
        }
    }
}

/// Place every loose XML under `source_dir` next to its invoice under
/// `root`.
pub fn organize_xml(
    root: &Path,
    source_dir: &Path,
    action: TransferAction,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> XmlResult {
    let outcome = reconcile(root, source_dir, &XmlRules, action, progress, cancel);

    let mut result = XmlResult {
        succeeded: outcome
            .matched
            .into_iter()
            .map(|record| FolderSuccess {
                folder: record.folder,
                detail: record.files.join(", "),
            })
            .collect(),
        already_had_xml: outcome.already_satisfied,
        failed: outcome.no_anchor,
        without_xml: outcome.unmatched_destinations,
        surplus: outcome
            .surplus
            .into_iter()
            .map(|(code, files)| (code, files.join(", ")))
            .collect(),
        ambiguous: outcome.ambiguous,
    };
    for failure in outcome.failed {
        result
            .failed
            .push(FolderFailure::new(failure.folder, failure.reason));
    }
    result
}
