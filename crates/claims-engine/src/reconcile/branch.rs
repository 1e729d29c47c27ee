//! relocate-folders-by-branch-rule
//!
//! Claim folders live under two branch offices, `sede 1` and `sede 2`. The
//! series of each folder's reference document decides where it belongs
//! (`COEX` claims are branch 2 business, everything else branch 1);
//! misplaced folders are moved across, name conflicts are reported instead
//! of overwritten.

use crate::extract::reference_series;
use crate::fs_scan::{folder_label, list_subdirectories, pdf_files_in};
use shared_types::{BranchMove, CancelToken, FolderFailure, ProgressSink, RelocateResult};
use std::path::Path;

const BRANCH_ONE: &str = "sede 1";
const BRANCH_TWO: &str = "sede 2";

/// Series whose claims are handled by branch 2.
const BRANCH_TWO_SERIES: &str = "COEX";

/// Move every misplaced claim folder under `root` to its correct branch.
pub fn relocate_by_branch(
    root: &Path,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> RelocateResult {
    let mut result = RelocateResult::default();

    let branch_one = root.join(BRANCH_ONE);
    let branch_two = root.join(BRANCH_TWO);
    if !branch_one.is_dir() || !branch_two.is_dir() {
        result.errors.push(FolderFailure::general(
            "No se encontraron las carpetas 'sede 1' y 'sede 2' dentro de la ruta raíz.",
        ));
        return result;
    }

    let mut claim_folders = Vec::new();
    for (branch, path) in [(BRANCH_ONE, &branch_one), (BRANCH_TWO, &branch_two)] {
        for folder in list_subdirectories(path) {
            claim_folders.push((branch, folder));
        }
    }

    let total = claim_folders.len();
    for (index, (current_branch, folder)) in claim_folders.iter().enumerate() {
        if cancel.is_cancelled() {
            return result;
        }
        let name = folder_label(folder);
        let percent = (index + 1) as f32 / total.max(1) as f32 * 100.0;
        progress.progress(&format!("Analizando '{}'...", name), percent);

        let series = pdf_files_in(folder)
            .iter()
            .find_map(|file| reference_series(file));
        let Some(series) = series else {
            result.errors.push(FolderFailure::new(
                name,
                "No se encontró archivo de referencia válido.",
            ));
            continue;
        };

        let correct_branch = if series == BRANCH_TWO_SERIES {
            BRANCH_TWO
        } else {
            BRANCH_ONE
        };
        if *current_branch == correct_branch {
            continue;
        }

        let destination = root.join(correct_branch).join(&name);
        if destination.exists() {
            result.errors.push(FolderFailure::new(
                name,
                format!(
                    "Conflicto de nombre en la sede de destino ({}).",
                    correct_branch
                ),
            ));
            continue;
        }

        match std::fs::rename(folder, &destination) {
            Ok(()) => result.moves.push(BranchMove {
                folder: name,
                from_branch: current_branch.to_string(),
                to_branch: correct_branch.to_string(),
                series,
            }),
            Err(e) => result.errors.push(FolderFailure::new(
                name,
                format!("Error del sistema al mover: {}", e),
            )),
        }
    }

    progress.progress("Reorganización completada.", 100.0);
    result
}
