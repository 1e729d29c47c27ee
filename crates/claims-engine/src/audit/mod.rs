//! Invoice audit of an objection report PDF against the claim folders
//!
//! A linear scan over the report's positioned words finds every claim code
//! (joining split tokens on the same line and picking up the status token),
//! collapses duplicate renderings by position, cross-references the codes
//! against the numeric folder prefixes on disk, writes a highlighted
//! `_auditado` copy, and reports the missing/surplus sets. Deleting surplus
//! folders is a separate, explicitly confirmed operation.

use crate::fs_scan::folder_label;
use crate::patterns;
use pdfops_core::{document_words, write_annotated_copy, Highlight, Rgb, Word};
use shared_types::{AuditReport, AuditSummary, CancelToken, ProgressSink};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Light green: the code appears once in the report and has its folder.
pub const HIGHLIGHT_UNIQUE_FOUND: Rgb = (0.7, 1.0, 0.7);
/// Light yellow: the code is repeated in the report and has its folder.
pub const HIGHLIGHT_REPEATED_FOUND: Rgb = (1.0, 1.0, 0.6);

/// How many tokens after a code are searched for its status.
const STATUS_LOOKAHEAD: usize = 7;

/// One claim code found in the report text.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// Full code as printed, e.g. `240-FECR-500`.
    pub id: String,
    /// Numeric suffix, the part folder names start with.
    pub number: String,
    /// Two-character status on the same line, or `N/A`.
    pub status: String,
    /// 1-based page.
    pub page_number: u32,
    pub bbox: pdfops_core::WordBox,
}

/// Scan the pages' words for claim codes. A code may be split across two
/// tokens; the continuation must sit on the same visual line. The status is
/// the first status-shaped token within the lookahead window on that line.
pub fn scan_occurrences(pages: &[Vec<Word>]) -> Vec<Occurrence> {
    let mut occurrences = Vec::new();

    for (page_index, words) in pages.iter().enumerate() {
        for (index, word) in words.iter().enumerate() {
            if !word.text.starts_with(patterns::AUDIT_CODE_PREFIX) {
                continue;
            }

            let mut candidate = word.text.clone();
            let mut bbox = word.bbox;
            if !patterns::AUDIT_CODE.is_match(&candidate) {
                if let Some(next) = words.get(index + 1) {
                    if next.line == word.line {
                        candidate.push_str(&next.text);
                        bbox = bbox.union(&next.bbox);
                    }
                }
            }

            let Some(code) = patterns::AUDIT_CODE_SEARCH.find(&candidate) else {
                continue;
            };
            let id = code.as_str().to_string();

            let mut status = "N/A".to_string();
            for next in words
                .iter()
                .skip(index + 1)
                .take(STATUS_LOOKAHEAD)
                .filter(|w| w.line == word.line)
            {
                if patterns::AUDIT_STATUS.is_match(&next.text) {
                    status = next.text.clone();
                    break;
                }
            }

            let number = id.rsplit('-').next().unwrap_or_default().to_string();
            occurrences.push(Occurrence {
                id,
                number,
                status,
                page_number: page_index as u32 + 1,
                bbox,
            });
        }
    }

    occurrences
}

/// Collapse occurrences rendered at the same position on the same page;
/// first seen wins. Overlapping extraction passes count a token twice, the
/// report must not.
pub fn dedupe_by_position(occurrences: Vec<Occurrence>) -> Vec<Occurrence> {
    let mut seen = HashSet::new();
    occurrences
        .into_iter()
        .filter(|occurrence| {
            let (x, y) = occurrence.bbox.signature();
            seen.insert((occurrence.page_number, x, y))
        })
        .collect()
}

/// Numeric-prefix map of the claim folders on disk: prefix -> folder name.
/// `None` when the path is not a directory. Two folders sharing a prefix
/// keep the later one, matching how the population was always read.
pub fn folder_population(path: &Path) -> Option<BTreeMap<String, String>> {
    if !path.is_dir() {
        return None;
    }
    let mut population = BTreeMap::new();
    for folder in crate::fs_scan::list_subdirectories(path) {
        let name = folder_label(&folder);
        if let Some(prefix) = patterns::FOLDER_NUMBER_PREFIX.find(&name) {
            population.insert(prefix.as_str().to_string(), name.clone());
        }
    }
    Some(population)
}

/// Audit `pdf_path` against the folders under `folders_path`.
pub fn run_audit(
    pdf_path: &Path,
    folders_path: &Path,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> AuditReport {
    let mut report = AuditReport::default();
    progress.progress("Iniciando auditoría...", 0.0);

    let Some(population) = folder_population(folders_path) else {
        report.error = Some(format!(
            "La ruta de carpetas no se encontró o es inválida: {}",
            folders_path.display()
        ));
        return stamped(report);
    };
    let folder_numbers: BTreeSet<&String> = population.keys().collect();

    let pages: Vec<Vec<Word>> = match document_words(pdf_path) {
        Ok(pages) => pages,
        Err(e) => {
            report.error = Some(format!("No se pudo leer el PDF: {}", e));
            return stamped(report);
        }
    };

    let occurrences = dedupe_by_position(scan_occurrences(&pages));
    if occurrences.is_empty() {
        report.error = Some(
            "No se encontró ninguna factura con el formato esperado en el PDF.".to_string(),
        );
        return stamped(report);
    }

    // First occurrence per code carries its status into the report.
    let mut unique: BTreeMap<String, &Occurrence> = BTreeMap::new();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for occurrence in &occurrences {
        unique.entry(occurrence.id.clone()).or_insert(occurrence);
        *counts.entry(occurrence.id.as_str()).or_default() += 1;
    }
    let repeated: BTreeSet<&str> = counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(&id, _)| id)
        .collect();

    progress.progress("Auditando contra carpetas y resaltando...", 50.0);

    let mut highlighted: BTreeSet<&str> = BTreeSet::new();
    let mut highlights = Vec::new();
    for occurrence in &occurrences {
        if cancel.is_cancelled() {
            return stamped(report);
        }
        if folder_numbers.contains(&occurrence.number) {
            highlighted.insert(occurrence.id.as_str());
            highlights.push(Highlight {
                page_number: occurrence.page_number,
                bbox: occurrence.bbox,
                color: if repeated.contains(occurrence.id.as_str()) {
                    HIGHLIGHT_REPEATED_FOUND
                } else {
                    HIGHLIGHT_UNIQUE_FOUND
                },
            });
        }
    }

    let output_path = audited_copy_path(pdf_path);
    if let Err(e) = write_annotated_copy(pdf_path, &output_path, &highlights) {
        report.error = Some(format!("No se pudo guardar la copia auditada: {}", e));
        return stamped(report);
    }

    let numbers_in_pdf: BTreeSet<&str> = unique
        .values()
        .map(|occurrence| occurrence.number.as_str())
        .collect();
    let missing: BTreeSet<&String> = unique
        .keys()
        .filter(|id| !highlighted.contains(id.as_str()))
        .collect();
    let surplus: BTreeMap<String, String> = population
        .iter()
        .filter(|(number, _)| !numbers_in_pdf.contains(number.as_str()))
        .map(|(number, name)| (number.clone(), name.clone()))
        .collect();

    report.summary = AuditSummary {
        report_name: folder_label(pdf_path),
        total_occurrences: occurrences.len(),
        unique_codes: unique.len(),
        folders_on_disk: folder_numbers.len(),
        codes_with_folder: highlighted.len(),
        missing: missing.len(),
        surplus: surplus.len(),
    };
    report.missing_codes = missing
        .iter()
        .map(|id| {
            let status = unique
                .get(*id)
                .map(|occurrence| occurrence.status.as_str())
                .unwrap_or("N/A");
            let compact = id
                .replace(patterns::AUDIT_CODE_PREFIX, "")
                .replace('-', "")
                .to_uppercase();
            format!("{} | {}", compact, status)
        })
        .collect();
    report.missing_codes.sort();
    report.surplus_folders = surplus;
    report.output_path = Some(output_path);

    progress.progress("Auditoría completada.", 100.0);
    stamped(report)
}

/// Delete the surplus folders found by an audit. Irreversible; callers gate
/// it behind an explicit confirmation. Returns the deleted count and the
/// per-folder failure strings.
pub fn delete_surplus_folders(
    folders_root: &Path,
    surplus: &BTreeMap<String, String>,
) -> (usize, Vec<String>) {
    let mut deleted = 0;
    let mut failures = Vec::new();
    for name in surplus.values() {
        match std::fs::remove_dir_all(folders_root.join(name)) {
            Ok(()) => deleted += 1,
            Err(e) => failures.push(format!("'{}': {}", name, e)),
        }
    }
    (deleted, failures)
}

fn audited_copy_path(pdf_path: &Path) -> PathBuf {
    let name = folder_label(pdf_path);
    let audited = if name.to_lowercase().ends_with(".pdf") {
        format!("{}_auditado.pdf", &name[..name.len() - 4])
    } else {
        format!("{}_auditado.pdf", name)
    };
    pdf_path.with_file_name(audited)
}

fn stamped(mut report: AuditReport) -> AuditReport {
    report.finished_at = chrono::Utc::now().timestamp() as u64;
    report
}
