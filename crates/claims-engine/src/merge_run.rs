//! Folder merge batch ("unir soportes")
//!
//! Walks the claim folders in numeric order, classifies each one, verifies
//! the merge has not already happened, and concatenates the folder's
//! documents into its response (Aseguradoras) or epicrisis (ADRES). Every
//! problem becomes a per-folder failure entry; the batch always finishes.

use crate::classify::{classify_adres, classify_insurer};
use crate::fs_scan::{folder_label, list_subdirectories, pdf_files_in, sort_by_embedded_number};
use pdfops_core::{already_merged, merge_into, merge_sequence, MIN_CHARS, PAGES_TO_CHECK};
use shared_types::{CancelToken, FolderFailure, FolderSuccess, MergeRunResult, Mode, ProgressSink};
use std::path::{Path, PathBuf};

/// Run the merge batch over every subfolder of `root`.
pub fn run_merge_batch(
    root: &Path,
    mode: Mode,
    progress: &dyn ProgressSink,
    cancel: &CancelToken,
) -> MergeRunResult {
    let mut result = MergeRunResult::default();

    let mut folders = list_subdirectories(root);
    sort_by_embedded_number(&mut folders);
    if folders.is_empty() {
        result.failed.push(FolderFailure::new(
            "Raíz",
            "No se encontraron subcarpetas para procesar.",
        ));
        return result;
    }

    tracing::info!(root = %root.display(), folders = folders.len(), ?mode, "merge batch started");

    let total = folders.len();
    for (index, folder) in folders.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let name = folder_label(folder);
        let percent = (index + 1) as f32 / total as f32 * 100.0;
        progress.progress(&name, percent);

        let outcome = match mode {
            Mode::Aseguradoras => process_insurer_folder(folder, &name),
            Mode::Adres => process_adres_folder(folder, &name),
        };
        match outcome {
            Ok(Some(success)) => result.succeeded.push(success),
            Ok(None) => {} // no PDFs, nothing to report
            Err(failure) => result.failed.push(failure),
        }
    }

    tracing::info!(
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        "merge batch finished"
    );
    result
}

fn process_insurer_folder(
    folder: &Path,
    name: &str,
) -> Result<Option<FolderSuccess>, FolderFailure> {
    let pdf_names = pdf_files_in(folder);
    if pdf_names.is_empty() {
        return Ok(None);
    }

    let documents = classify_insurer(&pdf_names, folder);
    let Some(cover) = documents.cover_letter else {
        return Err(FolderFailure::new(name, "No se encontró la Carta Glosa."));
    };
    let Some(response) = documents.response else {
        return Err(FolderFailure::new(name, "No se encontró la Respuesta Glosa."));
    };

    if let Some(code) = response.code() {
        // A verifiable response must agree with the cover letter.
        if *code != cover.code {
            return Err(FolderFailure::new(
                name,
                format!(
                    "Discrepancia Serie/Número. Carta: {}-{}, Respuesta: {}-{}",
                    cover.code.series, cover.code.number, code.series, code.number
                ),
            ));
        }
    }

    if already_merged(response.path(), &cover.path, PAGES_TO_CHECK, MIN_CHARS) {
        return Ok(Some(FolderSuccess {
            folder: name.to_string(),
            detail: "Validación de contenido correcta. La Carta Glosa ya está unida.".to_string(),
        }));
    }

    let mut sources: Vec<PathBuf> = Vec::with_capacity(documents.supports.len() + 1);
    sources.push(cover.path.clone());
    sources.extend(documents.supports.iter().cloned());
    sources.sort();
    let support_count = documents.supports.len();

    match merge_into(response.path(), &sources) {
        Ok(()) => Ok(Some(FolderSuccess {
            folder: name.to_string(),
            detail: format!(
                "¡Unión exitosa! Se anexó la Carta Glosa y {} soporte(s).",
                support_count
            ),
        })),
        Err(e) => Err(FolderFailure::new(
            name,
            format!("Error crítico al intentar unir los PDFs: {}", e),
        )),
    }
}

fn process_adres_folder(folder: &Path, name: &str) -> Result<Option<FolderSuccess>, FolderFailure> {
    let pdf_names = pdf_files_in(folder);
    if pdf_names.is_empty() {
        return Ok(None);
    }

    let documents = classify_adres(&pdf_names, folder);
    let Some(epicrisis) = documents.epicrisis else {
        return Err(FolderFailure::new(
            name,
            "Modo ADRES: No se encontró el archivo de Epicrisis.",
        ));
    };
    let Some(response) = documents.response else {
        return Err(FolderFailure::new(
            name,
            "Modo ADRES: No se encontró el archivo de Respuesta Glosa.",
        ));
    };

    if already_merged(&epicrisis, &response, PAGES_TO_CHECK, MIN_CHARS) {
        return Ok(Some(FolderSuccess {
            folder: name.to_string(),
            detail: "Validación correcta. La Respuesta Glosa ya parece estar unida a la Epicrisis."
                .to_string(),
        }));
    }

    // ADRES ordering: response first, then the epicrisis, then the sorted
    // supports; the combined document overwrites the epicrisis file.
    let mut supports = documents.supports.clone();
    supports.sort();
    let mut inputs = Vec::with_capacity(supports.len() + 2);
    inputs.push(response.clone());
    inputs.push(epicrisis.clone());
    inputs.extend(supports.iter().cloned());

    match merge_sequence(&epicrisis, &inputs) {
        Ok(()) => Ok(Some(FolderSuccess {
            folder: name.to_string(),
            detail: format!(
                "¡Unión ADRES exitosa! Se unió Respuesta + Epicrisis + {} soporte(s) en '{}'.",
                supports.len(),
                folder_label(&epicrisis)
            ),
        })),
        Err(e) => Err(FolderFailure::new(
            name,
            format!("Error crítico al intentar unir los PDFs en modo ADRES: {}", e),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::write_pdf;
    use pdfops_core::page_count;
    use shared_types::NullProgress;
    use std::sync::Mutex;
    use tempfile::tempdir;

    const CARTA: &str = "Carta de glosa numero doscientos emitida por la aseguradora con el detalle de los conceptos objetados en la factura.";
    const RESPUESTA: &str = "Respuesta radicada por la clinica frente a la glosa notificada, con sus argumentos y anexos correspondientes.";
    const EPICRISIS: &str = "Epicrisis del paciente con resumen de atencion, diagnostico de egreso y plan de manejo ambulatorio posterior.";

    #[test]
    fn insurer_folder_without_cover_letter_fails_without_merging() {
        let dir = tempdir().unwrap();
        let claim = dir.path().join("0001");
        std::fs::create_dir(&claim).unwrap();
        write_pdf(&claim.join("0001_COEX10_FACTURA.pdf"), &[CARTA]);
        write_pdf(&claim.join("COEX10.pdf"), &[RESPUESTA]);

        let result = run_merge_batch(
            dir.path(),
            Mode::Aseguradoras,
            &NullProgress,
            &CancelToken::new(),
        );

        assert!(result.succeeded.is_empty());
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].reason, "No se encontró la Carta Glosa.");
        // No merge happened: the response still has its single page.
        assert_eq!(page_count(&claim.join("COEX10.pdf")).unwrap(), 1);
    }

    #[test]
    fn insurer_merge_appends_cover_and_supports_to_the_response() {
        let dir = tempdir().unwrap();
        let claim = dir.path().join("200_CLINICA");
        std::fs::create_dir(&claim).unwrap();
        write_pdf(&claim.join("GL_FECR_200_carta.pdf"), &[CARTA]);
        write_pdf(&claim.join("FECR200.pdf"), &[RESPUESTA]);
        write_pdf(&claim.join("historia.pdf"), &["historia clinica"]);

        let result = run_merge_batch(
            dir.path(),
            Mode::Aseguradoras,
            &NullProgress,
            &CancelToken::new(),
        );

        assert_eq!(result.failed, vec![]);
        assert_eq!(result.succeeded.len(), 1);
        assert!(result.succeeded[0].detail.contains("1 soporte(s)"));
        assert_eq!(page_count(&claim.join("FECR200.pdf")).unwrap(), 3);
    }

    #[test]
    fn rerunning_the_batch_is_idempotent() {
        let dir = tempdir().unwrap();
        let claim = dir.path().join("200");
        std::fs::create_dir(&claim).unwrap();
        write_pdf(&claim.join("GL_FECR_200_carta.pdf"), &[CARTA]);
        write_pdf(&claim.join("FECR200.pdf"), &[RESPUESTA]);

        let first = run_merge_batch(
            dir.path(),
            Mode::Aseguradoras,
            &NullProgress,
            &CancelToken::new(),
        );
        assert_eq!(first.succeeded.len(), 1);
        let pages_after_first = page_count(&claim.join("FECR200.pdf")).unwrap();

        let second = run_merge_batch(
            dir.path(),
            Mode::Aseguradoras,
            &NullProgress,
            &CancelToken::new(),
        );
        assert_eq!(second.succeeded.len(), 1);
        assert!(second.succeeded[0].detail.contains("ya está unida"));
        assert_eq!(
            page_count(&claim.join("FECR200.pdf")).unwrap(),
            pages_after_first
        );
    }

    #[test]
    fn verifiable_response_must_agree_with_the_cover_letter() {
        let dir = tempdir().unwrap();
        let claim = dir.path().join("7");
        std::fs::create_dir(&claim).unwrap();
        write_pdf(&claim.join("GL_FECR_200_carta.pdf"), &[CARTA]);
        write_pdf(&claim.join("FECR300.pdf"), &[RESPUESTA]);

        let result = run_merge_batch(
            dir.path(),
            Mode::Aseguradoras,
            &NullProgress,
            &CancelToken::new(),
        );

        assert_eq!(result.failed.len(), 1);
        assert!(result.failed[0].reason.starts_with("Discrepancia Serie/Número."));
        assert_eq!(page_count(&claim.join("FECR300.pdf")).unwrap(), 1);
    }

    #[test]
    fn adres_merge_puts_response_pages_first() {
        let dir = tempdir().unwrap();
        let claim = dir.path().join("10");
        std::fs::create_dir(&claim).unwrap();
        let epicrisis = claim.join("10_COEX5_EPICRISIS.pdf");
        write_pdf(&epicrisis, &[EPICRISIS]);
        write_pdf(&claim.join("COEX5.pdf"), &[RESPUESTA]);
        write_pdf(&claim.join("laboratorio.pdf"), &["laboratorio"]);
        // Present but never merged.
        write_pdf(&claim.join("10_COEX5_FACTURA.pdf"), &["factura"]);

        let result = run_merge_batch(dir.path(), Mode::Adres, &NullProgress, &CancelToken::new());

        assert_eq!(result.failed, vec![]);
        assert_eq!(result.succeeded.len(), 1);
        assert_eq!(page_count(&epicrisis).unwrap(), 3);
        let doc = lopdf::Document::load(&epicrisis).unwrap();
        assert!(doc.extract_text(&[1]).unwrap().contains("Respuesta"));
    }

    #[test]
    fn empty_root_reports_against_the_pseudo_folder() {
        let dir = tempdir().unwrap();
        let result = run_merge_batch(
            dir.path(),
            Mode::Aseguradoras,
            &NullProgress,
            &CancelToken::new(),
        );
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].folder, "Raíz");
    }

    #[test]
    fn folders_without_pdfs_are_skipped_silently() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vacia")).unwrap();
        let result = run_merge_batch(
            dir.path(),
            Mode::Aseguradoras,
            &NullProgress,
            &CancelToken::new(),
        );
        assert!(result.succeeded.is_empty());
        assert!(result.failed.is_empty());
    }

    #[test]
    fn progress_walks_folders_in_numeric_order() {
        let dir = tempdir().unwrap();
        for name in ["10_b", "2_a", "sin_numero"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let seen = Mutex::new(Vec::new());
        let sink = |message: &str, _percent: f32| {
            seen.lock().unwrap().push(message.to_string());
        };

        run_merge_batch(dir.path(), Mode::Aseguradoras, &sink, &CancelToken::new());

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["2_a".to_string(), "10_b".to_string(), "sin_numero".to_string()]
        );
    }

    #[test]
    fn cancellation_stops_between_folders() {
        let dir = tempdir().unwrap();
        for name in ["1", "2", "3"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = run_merge_batch(dir.path(), Mode::Aseguradoras, &NullProgress, &cancel);
        assert!(result.succeeded.is_empty());
        assert!(result.failed.is_empty());
    }
}
