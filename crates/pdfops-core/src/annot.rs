//! Highlight annotations for the audited report copy

use crate::error::PdfOpsError;
use crate::words::WordBox;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;

/// Annotation color, 0..1 per channel.
pub type Rgb = (f32, f32, f32);

/// One highlight to paint: the page it sits on and the box to cover.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub page_number: u32,
    pub bbox: WordBox,
    pub color: Rgb,
}

/// Write a copy of `input` to `output` with one highlight annotation per
/// entry. Highlights on page numbers the document does not have are
/// silently dropped.
pub fn write_annotated_copy(
    input: &Path,
    output: &Path,
    highlights: &[Highlight],
) -> Result<(), PdfOpsError> {
    let mut doc = Document::load(input)
        .map_err(|e| PdfOpsError::Parse(format!("{}: {}", input.display(), e)))?;
    let pages = doc.get_pages();

    for highlight in highlights {
        let Some(&page_id) = pages.get(&highlight.page_number) else {
            continue;
        };
        let annot_id = doc.add_object(highlight_object(highlight));
        attach_annotation(&mut doc, page_id, annot_id)?;
    }

    doc.compress();
    doc.save(output)
        .map_err(|e| PdfOpsError::Operation(format!("failed to save annotated copy: {}", e)))?;
    Ok(())
}

fn highlight_object(highlight: &Highlight) -> Object {
    let WordBox { x0, y0, x1, y1 } = highlight.bbox;
    let (r, g, b) = highlight.color;

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Annot".to_vec()));
    dict.set("Subtype", Object::Name(b"Highlight".to_vec()));
    dict.set(
        "Rect",
        Object::Array(vec![
            Object::Real(x0.into()),
            Object::Real(y0.into()),
            Object::Real(x1.into()),
            Object::Real(y1.into()),
        ]),
    );
    // Quad order per the PDF spec: upper pair first.
    dict.set(
        "QuadPoints",
        Object::Array(vec![
            Object::Real(x0.into()),
            Object::Real(y1.into()),
            Object::Real(x1.into()),
            Object::Real(y1.into()),
            Object::Real(x0.into()),
            Object::Real(y0.into()),
            Object::Real(x1.into()),
            Object::Real(y0.into()),
        ]),
    );
    dict.set(
        "C",
        Object::Array(vec![
            Object::Real(r.into()),
            Object::Real(g.into()),
            Object::Real(b.into()),
        ]),
    );
    // Print flag, so the marks survive printing.
    dict.set("F", Object::Integer(4));
    Object::Dictionary(dict)
}

/// Append to the page's /Annots, whether it is inline, behind a reference,
/// or absent.
fn attach_annotation(
    doc: &mut Document,
    page_id: ObjectId,
    annot_id: ObjectId,
) -> Result<(), PdfOpsError> {
    let annots_ref = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .ok()
        .and_then(|page| match page.get(b"Annots") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        });

    if let Some(array_id) = annots_ref {
        return match doc.get_object_mut(array_id) {
            Ok(Object::Array(items)) => {
                items.push(Object::Reference(annot_id));
                Ok(())
            }
            _ => Err(PdfOpsError::Operation(
                "page /Annots reference is not an array".into(),
            )),
        };
    }

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| PdfOpsError::Operation(format!("page dictionary unavailable: {}", e)))?;
    match page.get_mut(b"Annots") {
        Ok(Object::Array(items)) => items.push(Object::Reference(annot_id)),
        _ => page.set("Annots", Object::Array(vec![Object::Reference(annot_id)])),
    }
    Ok(())
}
