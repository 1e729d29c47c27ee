//! bring-supports-to-invoice-folders
//!
//! Loose support files named by carrier code are brought into the claim
//! folder whose invoice document carries the same code. A key's supports
//! travel together; whatever finds no folder stays behind as surplus.

use super::{reconcile, KeyCardinality, ReconcileRules, TransferAction};
use crate::extract::loose_file_role;
use crate::fs_scan::pdf_files_in;
use shared_types::{
    CancelToken, DocumentRole, FolderFailure, InvoiceCode, ProgressSink, SupportsResult,
};
use std::path::Path;

struct SupportRules;

impl ReconcileRules for SupportRules {
    fn source_key(&self, file_name: &str) -> Option<InvoiceCode> {
        match loose_file_role(file_name) {
            Some(DocumentRole::ResponseVerifiable(code)) => Some(code),
            _ => None,
        }
    }

    fn anchor_key(&self, folder: &Path) -> Option<InvoiceCode> {
        pdf_files_in(folder)
            .iter()
            .find_map(|name| match loose_file_role(name) {
                Some(DocumentRole::Invoice(code)) => Some(code),
                _ => None,
            })
    }

    fn cardinality(&self) -> KeyCardinality {
        KeyCardinality::Many
    }
}

/// Bring every loose support under `source_dir` into its claim folder under
/// `root`.
pub fn bring_supports(
    root: &Path,
    source_dir: &Path,
    action: TransferAction,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> SupportsResult {
    let outcome = reconcile(root, source_dir, &SupportRules, action, progress, cancel);

    let mut result = SupportsResult {
        succeeded: outcome.matched,
        failed: outcome.no_anchor,
        without_supports: outcome.unmatched_destinations,
        surplus: outcome.surplus,
        ambiguous: outcome.ambiguous,
    };
    for failure in outcome.failed {
        result
            .failed
            .push(FolderFailure::new(failure.folder, failure.reason));
    }
    result
}
