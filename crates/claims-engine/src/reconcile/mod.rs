//! Generalized reconciliation engine
//!
//! One engine behind the file-to-folder variants: index a pool of loose
//! source files by extracted code, resolve each destination folder's anchor
//! code, transfer everything under matching keys, and report the full
//! partition (matched, already satisfied, no anchor, no match, surplus,
//! ambiguous, per-item failures). The engine never guesses: conflicting
//! candidates for one key are recorded and skipped.

pub mod branch;
pub mod responses;
pub mod search;
pub mod supports;
pub mod xml;

use crate::fs_scan::{files_in, folder_label, list_subdirectories};
use shared_types::{
    CancelToken, FolderFailure, InvoiceCode, ItemFailure, MatchRecord, ProgressSink,
    ReconciliationResult,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Whether matched source files leave the pool or are duplicated into the
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferAction {
    Move,
    Copy,
}

impl TransferAction {
    fn verb(self) -> &'static str {
        match self {
            TransferAction::Move => "mover",
            TransferAction::Copy => "copiar",
        }
    }
}

/// How many source files one key may legitimately hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCardinality {
    /// Exactly one; more is ambiguity and is skipped.
    One,
    /// Any number; all of them transfer together.
    Many,
}

/// One reconciliation variant: what counts as a source item, how a
/// destination folder anchors itself, and how transferred files are named.
pub trait ReconcileRules {
    /// Key of a loose source file, or `None` when the file plays no role.
    fn source_key(&self, file_name: &str) -> Option<InvoiceCode>;

    /// Anchor key of a destination folder, from its contents.
    fn anchor_key(&self, folder: &Path) -> Option<InvoiceCode>;

    /// Folder already holds what this variant distributes; skipped without
    /// consuming anything from the pool.
    fn already_satisfied(&self, _folder: &Path) -> bool {
        false
    }

    fn cardinality(&self) -> KeyCardinality;

    /// Name the file gets inside the destination folder.
    fn destination_name(&self, source_name: &str, _folder: &Path) -> String {
        source_name.to_string()
    }
}

/// Reconcile the loose files of `source_dir` against the subfolders of
/// `root` under the given variant rules.
pub fn reconcile(
    root: &Path,
    source_dir: &Path,
    rules: &dyn ReconcileRules,
    action: TransferAction,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> ReconciliationResult {
    let mut result = ReconciliationResult::default();

    if !root.is_dir() || !source_dir.is_dir() {
        result.failed.push(ItemFailure {
            folder: "General".to_string(),
            item: String::new(),
            reason: "Error crítico durante la ejecución: carpeta raíz u origen inválida."
                .to_string(),
        });
        return result;
    }

    // Source pool, keyed by code. Sorted enumeration keeps every run's
    // report identical.
    let mut pool: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in files_in(source_dir) {
        if let Some(code) = rules.source_key(&name) {
            pool.entry(code.key()).or_default().push(name);
        }
    }

    let folders = list_subdirectories(root);
    let anchors: Vec<Option<InvoiceCode>> =
        folders.iter().map(|f| rules.anchor_key(f)).collect();

    // Keys claimed by more than one destination folder are ambiguous as a
    // whole; none of those folders takes part in the transfer.
    let mut anchor_counts: BTreeMap<String, usize> = BTreeMap::new();
    for code in anchors.iter().flatten() {
        *anchor_counts.entry(code.key()).or_default() += 1;
    }

    tracing::info!(
        root = %root.display(),
        source = %source_dir.display(),
        folders = folders.len(),
        pool = pool.len(),
        "reconciliation started"
    );

    let total = folders.len();
    for (index, (folder, anchor)) in folders.iter().zip(&anchors).enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let name = folder_label(folder);
        let percent = (index + 1) as f32 / total.max(1) as f32 * 100.0;
        progress.progress(&format!("Procesando carpeta {}...", name), percent);

        let Some(anchor) = anchor else {
            result.no_anchor.push(FolderFailure::new(
                name,
                "No se encontró archivo de Factura con formato válido.",
            ));
            continue;
        };
        let key = anchor.key();

        if anchor_counts.get(&key).copied().unwrap_or(0) > 1 {
            result
                .ambiguous
                .entry(key)
                .or_default()
                .push(folder.display().to_string());
            continue;
        }

        if rules.already_satisfied(folder) {
            result.already_satisfied.push(name);
            continue;
        }

        let Some(items) = pool.remove(&key) else {
            result.unmatched_destinations.push(name);
            continue;
        };

        if rules.cardinality() == KeyCardinality::One && items.len() > 1 {
            result.ambiguous.insert(key, items);
            continue;
        }

        let mut transferred = Vec::new();
        for item in items {
            let destination = folder.join(rules.destination_name(&item, folder));
            match transfer(&source_dir.join(&item), &destination, action) {
                Ok(()) => transferred.push(item),
                Err(e) => result.failed.push(ItemFailure {
                    folder: name.clone(),
                    item: item.clone(),
                    reason: format!("Error al {} '{}': {}", action.verb(), item, e),
                }),
            }
        }
        if transferred.is_empty() {
            // Everything under the key failed to transfer; the folder is
            // still unmatched and the failures above say why.
            result.unmatched_destinations.push(name);
        } else {
            result.matched.push(MatchRecord {
                code: key,
                folder: name,
                files: transferred,
            });
        }
    }

    // Whatever the loop did not consume is surplus for manual review.
    result.surplus = pool;

    tracing::info!(
        matched = result.matched.len(),
        surplus = result.surplus.len(),
        ambiguous = result.ambiguous.len(),
        "reconciliation finished"
    );
    result
}

/// Folder-name prefix match with the digit-boundary guard: the name must
/// start with the key, and the first character after the prefix (if any)
/// must not be a digit, so key `123` never claims folder `1234_X`.
pub fn prefix_matches(folder_name: &str, key: &str) -> bool {
    match folder_name.strip_prefix(key) {
        Some(rest) => !rest.chars().next().is_some_and(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Move or copy one file. Moves fall back to copy-and-remove so they
/// survive crossing filesystems.
fn transfer(source: &Path, destination: &Path, action: TransferAction) -> std::io::Result<()> {
    match action {
        TransferAction::Copy => std::fs::copy(source, destination).map(|_| ()),
        TransferAction::Move => std::fs::rename(source, destination).or_else(|_| {
            std::fs::copy(source, destination)?;
            std::fs::remove_file(source)
        }),
    }
}

/// Recursive directory copy for the folder-level variants.
fn copy_dir_recursive(source: &Path, destination: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(destination)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
