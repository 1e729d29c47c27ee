//! Page-sequence merge with destructive overwrite
//!
//! The engine is order-agnostic: it concatenates whole documents in exactly
//! the order it is given and writes the result over the output path. Callers
//! decide the sequence (response-first for ADRES, target-first otherwise).

use crate::error::PdfOpsError;
use lopdf::{Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Concatenate `inputs` in order and write the result to `output`.
///
/// `output` may itself be one of the inputs: every document is fully loaded
/// before the output file is touched. No backup is kept.
pub fn merge_sequence(output: &Path, inputs: &[PathBuf]) -> Result<(), PdfOpsError> {
    if inputs.is_empty() {
        return Err(PdfOpsError::Operation("no documents to merge".into()));
    }

    let mut loaded = Vec::with_capacity(inputs.len());
    for path in inputs {
        let doc = Document::load(path)
            .map_err(|e| PdfOpsError::Parse(format!("{}: {}", path.display(), e)))?;
        loaded.push(doc);
    }

    let mut dest = loaded.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut page_refs = page_references(&dest);

    for source in loaded {
        let offset = dest_max_id;
        let source_pages = page_references(&source);

        // Shift every object of the source past the destination's id range,
        // fixing up internal references as we go.
        let mut shifted = BTreeMap::new();
        for (old_id, object) in source.objects.into_iter() {
            shifted.insert((old_id.0 + offset, old_id.1), shift_refs(object, offset));
        }
        dest.objects.append(&mut shifted);

        for old_ref in source_pages {
            page_refs.push((old_ref.0 + offset, old_ref.1));
        }

        dest_max_id = (source.max_id + offset).max(dest_max_id);
    }

    rebuild_page_tree(&mut dest, page_refs)?;
    dest.max_id = dest_max_id;
    dest.compress();

    dest.save(output)
        .map_err(|e| PdfOpsError::Operation(format!("failed to save merged PDF: {}", e)))?;
    Ok(())
}

/// Append the pages of every source, in order, after the current pages of
/// `target`, overwriting `target`.
pub fn merge_into(target: &Path, sources: &[PathBuf]) -> Result<(), PdfOpsError> {
    let mut inputs = Vec::with_capacity(sources.len() + 1);
    inputs.push(target.to_path_buf());
    inputs.extend(sources.iter().cloned());
    merge_sequence(target, &inputs)
}

fn page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

fn shift_refs(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(items) => {
            Object::Array(items.into_iter().map(|o| shift_refs(o, offset)).collect())
        }
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's page tree at the combined page list.
fn rebuild_page_tree(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<(), PdfOpsError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfOpsError::Operation("document has no Root reference".into()))?;

    let pages_id = doc
        .get_object(catalog_id)
        .and_then(Object::as_dict)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| PdfOpsError::Operation("catalog has no Pages reference".into()))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages_dict)) => {
            let count = page_refs.len() as i64;
            let kids = page_refs.into_iter().map(Object::Reference).collect();
            pages_dict.set("Kids", Object::Array(kids));
            pages_dict.set("Count", Object::Integer(count));
            Ok(())
        }
        _ => Err(PdfOpsError::Operation("invalid pages dictionary".into())),
    }
}
