//! Document classification for one claim folder
//!
//! Ordered pattern rules with first-match-wins and claim tracking: a file
//! claimed by one rule is never reconsidered by a later one, and each
//! singleton slot (cover letter, response, epicrisis) is filled at most
//! once. Whatever remains unclaimed is a support document.

use crate::extract::is_pdf;
use crate::patterns;
use shared_types::{AdresFolder, CoverLetter, InsurerFolder, InvoiceCode, Response};
use std::collections::HashSet;
use std::path::Path;

/// Classify a folder's PDF names under the Aseguradoras rules.
///
/// Two ordered passes: the cover letter is identified first so the response
/// rules never mistake it for a reply, then the response slot is filled
/// from the remaining names.
pub fn classify_insurer(file_names: &[String], folder: &Path) -> InsurerFolder {
    let mut result = InsurerFolder::default();
    let mut claimed: HashSet<&str> = HashSet::new();

    for name in file_names {
        if claimed.contains(name.as_str()) {
            continue;
        }
        let Some(caps) = patterns::COVER_LETTER.captures(name) else {
            continue;
        };
        // The number must also appear delimited elsewhere in the name;
        // guards against short accidental matches inside longer tokens.
        let number = &caps[2];
        if !name.contains(&format!("_{number}_")) && !name.contains(&format!("-{number}-")) {
            continue;
        }
        if result.cover_letter.is_none() {
            result.cover_letter = Some(CoverLetter {
                path: folder.join(name),
                code: InvoiceCode::new(&caps[1], number),
            });
            claimed.insert(name);
        }
    }

    for name in file_names {
        if claimed.contains(name.as_str()) {
            continue;
        }
        // Rule order decides ties: fixed literal, verifiable, glosa-rep.
        let response = if patterns::RESPONSE_GLOSA_NEW.is_match(name) {
            Some(Response::GlosaNew {
                path: folder.join(name),
            })
        } else if let Some(caps) = patterns::RESPONSE_VERIFIABLE.captures(name) {
            Some(Response::Verifiable {
                path: folder.join(name),
                code: InvoiceCode::new(&caps[1], &caps[2]),
            })
        } else if patterns::RESPONSE_GLOSA_REP.is_match(name) {
            Some(Response::GlosaRep {
                path: folder.join(name),
            })
        } else {
            None
        };
        if let Some(response) = response {
            result.response = Some(response);
            claimed.insert(name);
            break;
        }
    }

    for name in file_names {
        if is_pdf(name) && !claimed.contains(name.as_str()) {
            result.supports.push(folder.join(name));
        }
    }

    result
}

/// Classify a folder's PDF names under the ADRES rules.
///
/// Single pass; invoices and cost invoices go to the ignored set so they
/// are neither merged nor counted as supports.
pub fn classify_adres(file_names: &[String], folder: &Path) -> AdresFolder {
    let mut result = AdresFolder::default();
    let mut claimed: HashSet<&str> = HashSet::new();

    for name in file_names {
        if patterns::ADRES_EPICRISIS.is_match(name) && result.epicrisis.is_none() {
            result.epicrisis = Some(folder.join(name));
            claimed.insert(name);
        } else if (patterns::RESPONSE_VERIFIABLE.is_match(name)
            || patterns::RESPONSE_GLOSA_REP.is_match(name))
            && result.response.is_none()
        {
            result.response = Some(folder.join(name));
            claimed.insert(name);
        } else if patterns::ADRES_FACOSTE.is_match(name) || patterns::ADRES_FACTURA.is_match(name)
        {
            result.ignored.push(folder.join(name));
            claimed.insert(name);
        }
    }

    for name in file_names {
        if is_pdf(name) && !claimed.contains(name.as_str()) {
            result.supports.push(folder.join(name));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cover_letter_and_response_are_separated() {
        let folder = Path::new("/claims/200");
        let result = classify_insurer(
            &names(&["GL_FECR_200_carta.pdf", "FECR200.pdf", "historia.pdf"]),
            folder,
        );

        let cover = result.cover_letter.unwrap();
        assert_eq!(cover.code, InvoiceCode::new("FECR", "200"));
        match result.response.unwrap() {
            Response::Verifiable { code, .. } => assert_eq!(code, InvoiceCode::new("FECR", "200")),
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(result.supports, vec![PathBuf::from("/claims/200/historia.pdf")]);
    }

    #[test]
    fn cover_letter_requires_the_delimited_number() {
        // The number never appears delimited, so the first pass rejects the
        // name and it classifies as a plain support.
        let result = classify_insurer(&names(&["GL_FECR_200carta.pdf"]), Path::new("/c"));
        assert!(result.cover_letter.is_none());
        assert_eq!(result.supports.len(), 1);
    }

    #[test]
    fn fixed_literal_wins_over_later_rules() {
        let result = classify_insurer(
            &names(&["resp_glosa.pdf", "GLOSA_REP2.pdf"]),
            Path::new("/c"),
        );
        assert!(matches!(result.response, Some(Response::GlosaNew { .. })));
        // The loser stays a support.
        assert_eq!(result.supports.len(), 1);
    }

    #[test]
    fn glosa_rep_is_recognized_when_nothing_earlier_matches() {
        let result = classify_insurer(&names(&["GLOSA_REP.pdf"]), Path::new("/c"));
        assert!(matches!(result.response, Some(Response::GlosaRep { .. })));
    }

    #[test]
    fn missing_cover_letter_leaves_the_slot_empty() {
        // An invoice-named file plus its response: no cover letter shape.
        let result = classify_insurer(
            &names(&["0001_COEX10_FACTURA.pdf", "COEX10.pdf"]),
            Path::new("/c"),
        );
        assert!(result.cover_letter.is_none());
        assert!(result.response.is_some());
    }

    #[test]
    fn adres_pass_fills_each_slot_once_and_ignores_invoices() {
        let folder = Path::new("/adres/10");
        let result = classify_adres(
            &names(&[
                "10_COEX5_EPICRISIS.pdf",
                "11_COEX5_EPICRIS.pdf",
                "COEX5.pdf",
                "10_COEX5_FACTURA.pdf",
                "10_COEX5_FACOSTE.pdf",
                "laboratorio.pdf",
            ]),
            folder,
        );

        assert_eq!(
            result.epicrisis,
            Some(folder.join("10_COEX5_EPICRISIS.pdf"))
        );
        assert_eq!(result.response, Some(folder.join("COEX5.pdf")));
        assert_eq!(result.ignored.len(), 2);
        // The second epicrisis falls through to the support pool; the
        // ignored invoices never do.
        assert_eq!(
            result.supports,
            vec![
                folder.join("11_COEX5_EPICRIS.pdf"),
                folder.join("laboratorio.pdf"),
            ]
        );
    }

    #[test]
    fn adres_requires_both_key_documents_to_be_distinct_files() {
        let result = classify_adres(&names(&["COEX5.pdf"]), Path::new("/c"));
        assert!(result.epicrisis.is_none());
        assert!(result.response.is_some());
        assert!(result.supports.is_empty());
    }

    proptest! {
        /// However the folder's names are ordered, each singleton slot is
        /// filled at most once and every PDF lands in exactly one place.
        #[test]
        fn classification_partitions_the_name_set(order in Just(vec![
            "GL_FECR_200_carta.pdf".to_string(),
            "FECR200.pdf".to_string(),
            "GLOSA_REP1.pdf".to_string(),
            "historia.pdf".to_string(),
            "laboratorio.pdf".to_string(),
        ]).prop_shuffle()) {
            let folder = Path::new("/c");
            let result = classify_insurer(&order, folder);

            let cover = result.cover_letter.clone().map(|c| c.path);
            let response = result.response.clone().map(|r| r.path().to_path_buf());
            prop_assert!(cover.is_some());
            prop_assert!(response.is_some());

            let mut assigned: Vec<PathBuf> = result.supports.clone();
            assigned.extend(cover);
            assigned.extend(response);
            assigned.sort();
            assigned.dedup();
            // Five PDFs in, five distinct assignments out.
            prop_assert_eq!(assigned.len(), order.len());
        }
    }
}
