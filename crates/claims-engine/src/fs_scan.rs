//! Directory enumeration
//!
//! Listings are sorted so every batch walks its population in the same
//! order on every run. Unreadable directories enumerate as empty; the
//! engines report the absence of work, not the read error.

use crate::extract::is_pdf;
use crate::patterns::FIRST_NUMBER;
use std::path::{Path, PathBuf};

/// Immediate subdirectories of `root`, full paths, sorted by name.
pub fn list_subdirectories(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = read_dir_entries(root)
        .into_iter()
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Names of the plain files directly under `dir`, sorted.
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = read_dir_entries(dir)
        .into_iter()
        .filter(|path| path.is_file())
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}

/// Names of the PDF files directly under `dir`, sorted.
pub fn pdf_files_in(dir: &Path) -> Vec<String> {
    let mut names = files_in(dir);
    names.retain(|name| is_pdf(name));
    names
}

fn read_dir_entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// First run of digits in `name`, for numeric-prefix-aware ordering.
/// Names without a number sort last.
pub fn first_embedded_number(name: &str) -> u64 {
    FIRST_NUMBER
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(u64::MAX)
}

/// Order folder paths by the first number embedded in their names.
pub fn sort_by_embedded_number(paths: &mut [PathBuf]) {
    paths.sort_by_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (first_embedded_number(&name), name)
    });
}

/// Folder name of `path` as shown to the operator.
pub fn folder_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn listings_are_sorted_and_typed() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("b_carpeta")).unwrap();
        std::fs::create_dir(dir.path().join("a_carpeta")).unwrap();
        std::fs::write(dir.path().join("suelto.PDF"), b"x").unwrap();
        std::fs::write(dir.path().join("notas.txt"), b"x").unwrap();

        let dirs = list_subdirectories(dir.path());
        assert_eq!(
            dirs,
            vec![dir.path().join("a_carpeta"), dir.path().join("b_carpeta")]
        );
        assert_eq!(pdf_files_in(dir.path()), vec!["suelto.PDF".to_string()]);
        assert_eq!(
            files_in(dir.path()),
            vec!["notas.txt".to_string(), "suelto.PDF".to_string()]
        );
    }

    #[test]
    fn missing_directories_enumerate_empty() {
        assert!(list_subdirectories(Path::new("/no/existe")).is_empty());
        assert!(pdf_files_in(Path::new("/no/existe")).is_empty());
    }

    #[test]
    fn numeric_sort_puts_numberless_names_last() {
        let mut paths = vec![
            PathBuf::from("/r/sin_numero"),
            PathBuf::from("/r/10_clinica"),
            PathBuf::from("/r/2_clinica"),
            PathBuf::from("/r/factura_7"),
        ];
        sort_by_embedded_number(&mut paths);
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/r/2_clinica"),
                PathBuf::from("/r/factura_7"),
                PathBuf::from("/r/10_clinica"),
                PathBuf::from("/r/sin_numero"),
            ]
        );
    }

    #[test]
    fn embedded_number_reads_the_first_run_of_digits() {
        assert_eq!(first_embedded_number("200_CLINICA_3"), 200);
        assert_eq!(first_embedded_number("carta"), u64::MAX);
    }
}
