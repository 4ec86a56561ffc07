//! Debug annotation: stroke the region rectangles onto a copy of a PDF.
//!
//! Appends a content stream drawing each frozen region as a red rectangle
//! on page 1, sandwiched in `q`/`Q` so the original page's graphics state
//! cannot skew the overlay (and vice versa). The output is a separate copy;
//! the input file is never modified.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use tracing::debug;

use boxtract_core::FrozenRegions;

use crate::error::SourceError;
use crate::lopdf_source::media_box;

/// Write a copy of `path` to `out_path` with `regions` stroked on page 1.
pub fn annotate_document(
    path: &Path,
    regions: &FrozenRegions,
    out_path: &Path,
) -> Result<(), SourceError> {
    let mut doc =
        lopdf::Document::load(path).map_err(|e| SourceError::Parse(format!("{e}")))?;
    if doc.is_encrypted() {
        return Err(SourceError::Encrypted);
    }
    let page_id = doc
        .get_pages()
        .into_values()
        .next()
        .ok_or(SourceError::NoPages)?;
    let bbox = media_box(&doc, page_id)?;

    let mut operations = vec![
        Operation::new("Q", vec![]),
        Operation::new("q", vec![]),
        Operation::new(
            "RG",
            vec![Object::Real(1.0), Object::Real(0.0), Object::Real(0.0)],
        ),
        Operation::new("w", vec![Object::Real(1.5)]),
    ];
    for (_, rect) in regions.iter() {
        let r = rect.offset(bbox.x0, bbox.y0);
        operations.push(Operation::new(
            "re",
            vec![
                Object::Real(r.x0 as f32),
                Object::Real(r.y0 as f32),
                Object::Real(r.width() as f32),
                Object::Real(r.height() as f32),
            ],
        ));
        operations.push(Operation::new("S", vec![]));
    }
    operations.push(Operation::new("Q", vec![]));

    let overlay = Content { operations }
        .encode()
        .map_err(|e| SourceError::Parse(format!("failed to encode overlay: {e}")))?;
    let overlay_id = doc.add_object(Stream::new(dictionary! {}, overlay));
    let guard = Content {
        operations: vec![Operation::new("q", vec![])],
    }
    .encode()
    .map_err(|e| SourceError::Parse(format!("failed to encode overlay: {e}")))?;
    let guard_id = doc.add_object(Stream::new(dictionary! {}, guard));

    prepend_append_contents(&mut doc, page_id, guard_id, overlay_id)?;

    let mut file = std::fs::File::create(out_path)?;
    doc.save_to(&mut file)
        .map_err(|e| SourceError::Parse(format!("failed to write annotated copy: {e}")))?;
    debug!(out = %out_path.display(), regions = regions.len(), "annotated copy written");
    Ok(())
}

/// Rewrite the page's /Contents to `[guard, existing..., overlay]`.
fn prepend_append_contents(
    doc: &mut lopdf::Document,
    page_id: lopdf::ObjectId,
    guard_id: lopdf::ObjectId,
    overlay_id: lopdf::ObjectId,
) -> Result<(), SourceError> {
    let page = doc
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| SourceError::Parse(format!("failed to get page dictionary: {e}")))?;

    let mut contents = vec![Object::Reference(guard_id)];
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => contents.push(Object::Reference(*id)),
        Ok(Object::Array(arr)) => contents.extend(arr.iter().cloned()),
        _ => {}
    }
    contents.push(Object::Reference(overlay_id));
    page.set("Contents", Object::Array(contents));
    Ok(())
}
