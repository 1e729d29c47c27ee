//! search-codes-and-copy-folders
//!
//! The operator pastes a list of claim codes; the tree under the search
//! root is walked for folders whose name starts with a code (with the
//! digit-boundary guard), and the first match per code is copied under the
//! destination root. Extra matches are reported as duplicates, never
//! merged.

use super::{copy_dir_recursive, prefix_matches};
use shared_types::{CancelToken, ItemFailure, ProgressSink, SearchCopyResult};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Find the folders for `codes` under `search_root` and copy the first
/// match per code into `dest_root`.
pub fn search_and_copy(
    codes: &BTreeSet<String>,
    search_root: &Path,
    dest_root: &Path,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> SearchCopyResult {
    let mut result = SearchCopyResult::default();

    if !search_root.is_dir() {
        result.failed.push(ItemFailure {
            folder: "General".to_string(),
            item: search_root.display().to_string(),
            reason: "Error crítico durante la ejecución: la carpeta de búsqueda no existe."
                .to_string(),
        });
        result.not_found = codes.clone();
        return result;
    }

    progress.progress("Iniciando búsqueda...", 0.0);

    for entry in WalkDir::new(search_root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
    {
        if cancel.is_cancelled() {
            return result;
        }
        let name = entry.file_name().to_string_lossy();
        for code in codes {
            if prefix_matches(&name, code) {
                result
                    .found
                    .entry(code.clone())
                    .or_default()
                    .push(entry.path().display().to_string());
            }
        }
    }

    progress.progress("Copiando carpetas...", 50.0);
    if let Err(e) = std::fs::create_dir_all(dest_root) {
        result.failed.push(ItemFailure {
            folder: "General".to_string(),
            item: dest_root.display().to_string(),
            reason: format!("Error al crear la carpeta de destino: {}", e),
        });
        result.not_found = codes
            .iter()
            .filter(|code| !result.found.contains_key(*code))
            .cloned()
            .collect();
        return result;
    }

    let found = result.found.clone();
    let total_found = found.len();
    for (index, (code, paths)) in found.iter().enumerate() {
        if cancel.is_cancelled() {
            return result;
        }
        let percent = 50.0 + (index + 1) as f32 / total_found.max(1) as f32 * 50.0;
        progress.progress(&format!("Copiando carpeta para código {}...", code), percent);

        let source = Path::new(&paths[0]);
        let folder_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| code.clone());
        let destination = dest_root.join(&folder_name);

        if destination.exists() {
            // A previous (possibly interrupted) run already brought it.
            result.copied.insert(code.clone());
            continue;
        }
        match copy_dir_recursive(source, &destination) {
            Ok(()) => {
                result.copied.insert(code.clone());
            }
            Err(e) => result.failed.push(ItemFailure {
                folder: code.clone(),
                item: paths[0].clone(),
                reason: format!("Error al copiar '{}': {}", folder_name, e),
            }),
        }
    }

    result.not_found = codes
        .iter()
        .filter(|code| !result.found.contains_key(*code))
        .cloned()
        .collect();
    result.duplicates = result
        .found
        .iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(code, paths)| (code.clone(), paths.clone()))
        .collect();

    progress.progress("Búsqueda completada.", 100.0);
    result
}
