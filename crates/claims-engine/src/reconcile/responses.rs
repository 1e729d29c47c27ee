//! organize-loose-responses-by-invoice
//!
//! Loose response PDFs named exactly by their carrier code are placed into
//! the claim folder whose invoice carries the same code, under the
//! canonical `SERIESNUMBER.pdf` name. Folders that already hold a response
//! are left alone.

use super::{reconcile, KeyCardinality, ReconcileRules, TransferAction};
use crate::extract::{canonical_response_name, invoice_code, known_series_code};
use crate::fs_scan::{files_in, pdf_files_in};
use shared_types::{
    CancelToken, FolderFailure, FolderSuccess, InvoiceCode, ProgressSink, ResponsesResult,
};
use std::path::Path;

struct ResponseRules;

impl ReconcileRules for ResponseRules {
    fn source_key(&self, file_name: &str) -> Option<InvoiceCode> {
        known_series_code(file_name, true)
    }

    fn anchor_key(&self, folder: &Path) -> Option<InvoiceCode> {
        pdf_files_in(folder)
            .iter()
            .find_map(|name| invoice_code(name))
    }

    fn already_satisfied(&self, folder: &Path) -> bool {
        files_in(folder)
            .iter()
            .any(|name| known_series_code(name, false).is_some() && invoice_code(name).is_none())
    }

    fn cardinality(&self) -> KeyCardinality {
        KeyCardinality::One
    }

    fn destination_name(&self, source_name: &str, _folder: &Path) -> String {
        canonical_response_name(source_name)
    }
}

/// Place every loose response under `source_dir` into its claim folder
/// under `root`.
pub fn organize_responses(
    root: &Path,
    source_dir: &Path,
    action: TransferAction,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ResponsesResult {
    let outcome = reconcile(root, source_dir, &ResponseRules, action, progress, cancel);

    let mut result = ResponsesResult {
        succeeded: outcome
            .matched
            .into_iter()
            .map(|record| FolderSuccess {
                folder: record.folder,
                detail: record.files.join(", "),
            })
            .collect(),
        already_had_response: outcome.already_satisfied,
        failed: outcome.no_anchor,
        without_response: outcome.unmatched_destinations,
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
