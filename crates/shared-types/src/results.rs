//! Result aggregates, one per batch operation.
//!
//! Each engine run returns exactly one of these by value; per-item problems
//! are captured as entries instead of being propagated, so a batch always
//! finishes and always reports. Ordered collections keep reports
//! reproducible across runs.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// A folder that completed an operation, with the operator-facing detail
/// line ("se anexó la Carta Glosa y 3 soporte(s)", ...).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FolderSuccess {
    pub folder: String,
    pub detail: String,
}

/// A folder that could not be processed, with the reason string shown to
/// the operator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FolderFailure {
    pub folder: String,
    pub reason: String,
}

impl FolderFailure {
    pub fn new(folder: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            reason: reason.into(),
        }
    }

    /// Failure outside any per-folder scope; the batch still finishes.
    pub fn general(reason: impl Into<String>) -> Self {
        Self::new("General", reason)
    }
}

/// A single file transfer that failed inside an otherwise processable
/// folder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemFailure {
    pub folder: String,
    pub item: String,
    pub reason: String,
}

/// Outcome of the folder merge batch ("unir soportes"), either mode.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MergeRunResult {
    pub succeeded: Vec<FolderSuccess>,
    pub failed: Vec<FolderFailure>,
}

/// One reconciled key: the destination folder and the source files that
/// were transferred into it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatchRecord {
    pub code: String,
    pub folder: String,
    pub files: Vec<String>,
}

/// Full partition produced by the generalized reconciliation engine. Every
/// destination folder lands in exactly one of `matched`,
/// `already_satisfied`, `no_anchor`, `unmatched_destinations` or
/// `ambiguous`; every source item in exactly one of `matched`, `surplus` or
/// `ambiguous`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReconciliationResult {
    pub matched: Vec<MatchRecord>,
    /// Folders skipped because they already hold the item kind being placed.
    pub already_satisfied: Vec<String>,
    /// Folders with no valid anchor document.
    pub no_anchor: Vec<FolderFailure>,
    /// Folders whose anchor key had no source item.
    pub unmatched_destinations: Vec<String>,
    /// Source items left unconsumed, keyed by code.
    pub surplus: BTreeMap<String, Vec<String>>,
    /// Keys with conflicting candidates (several sources for a singleton
    /// slot, or several folders claiming one key); skipped, never guessed.
    pub ambiguous: BTreeMap<String, Vec<String>>,
    /// Per-file transfer errors.
    pub failed: Vec<ItemFailure>,
}

/// bring-supports-to-invoice-folders.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SupportsResult {
    pub succeeded: Vec<MatchRecord>,
    pub failed: Vec<FolderFailure>,
    pub without_supports: Vec<String>,
    pub surplus: BTreeMap<String, Vec<String>>,
    pub ambiguous: BTreeMap<String, Vec<String>>,
}

/// organize-loose-XML-by-invoice.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct XmlResult {
    pub succeeded: Vec<FolderSuccess>,
    pub already_had_xml: Vec<String>,
    pub failed: Vec<FolderFailure>,
    pub without_xml: Vec<String>,
    pub surplus: BTreeMap<String, String>,
    pub ambiguous: BTreeMap<String, Vec<String>>,
}

/// organize-loose-responses-by-invoice.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponsesResult {
    pub succeeded: Vec<FolderSuccess>,
    pub already_had_response: Vec<String>,
    pub failed: Vec<FolderFailure>,
    pub without_response: Vec<String>,
    pub surplus: BTreeMap<String, String>,
    pub ambiguous: BTreeMap<String, Vec<String>>,
}

/// search-codes-and-copy-folders.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchCopyResult {
    /// Every folder found per requested code, in walk order.
    pub found: BTreeMap<String, Vec<String>>,
    pub copied: BTreeSet<String>,
    pub not_found: BTreeSet<String>,
    /// Codes that matched more than one folder; the first was used.
    pub duplicates: BTreeMap<String, Vec<String>>,
    pub failed: Vec<ItemFailure>,
}

/// One folder relocated between branch offices.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BranchMove {
    pub folder: String,
    pub from_branch: String,
    pub to_branch: String,
    pub series: String,
}

/// relocate-folders-by-branch-rule.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RelocateResult {
    pub moves: Vec<BranchMove>,
    pub errors: Vec<FolderFailure>,
}

/// Counters shown at the top of the audit report.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditSummary {
    pub report_name: String,
    pub total_occurrences: usize,
    pub unique_codes: usize,
    pub folders_on_disk: usize,
    pub codes_with_folder: usize,
    pub missing: usize,
    pub surplus: usize,
}

/// Outcome of auditing a report PDF against a folder population.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AuditReport {
    pub summary: AuditSummary,
    /// `CODE | STATUS` lines for codes in the PDF with no folder on disk.
    pub missing_codes: Vec<String>,
    /// Numeric prefix -> folder name, for folders with no code in the PDF.
    pub surplus_folders: BTreeMap<String, String>,
    /// Annotated copy of the input, when one was written.
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
    /// Unix timestamp, stamped when the audit finishes.
    pub finished_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_failure_uses_reserved_folder_name() {
        let failure = FolderFailure::general("Error crítico durante la ejecución");
        assert_eq!(failure.folder, "General");
    }

    #[test]
    fn aggregates_serialize_for_the_presentation_layer() {
        let mut result = MergeRunResult::default();
        result.succeeded.push(FolderSuccess {
            folder: "200_CLINICA".into(),
            detail: "¡Unión exitosa! Se anexó la Carta Glosa y 2 soporte(s).".into(),
        });
        result
            .failed
            .push(FolderFailure::new("201_CLINICA", "No se encontró la Carta Glosa."));

        let json = serde_json::to_string(&result).unwrap();
        let back: MergeRunResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
