//! Document-access traits.
//!
//! The pipeline is generic over how documents are opened and queried so that
//! tests can substitute a fake backend and alternative PDF engines can be
//! plugged in. The contract mirrors what the extractor needs and nothing
//! more: a native first-page bounding box and text-within-a-rectangle.

use std::path::Path;

use boxtract_core::{PageBBox, Rect};

use crate::error::SourceError;

/// Opens documents. One source is shared (by reference) across all workers;
/// every worker opens its own document handle, so implementations only need
/// `Sync` for the source value itself, not for open documents.
pub trait DocumentSource {
    type Document: SourceDocument;

    fn open(&self, path: &Path) -> Result<Self::Document, SourceError>;
}

/// A single opened document.
pub trait SourceDocument {
    /// The native bounding box of the document's first page, in document
    /// units with whatever origin the document declares. Read fresh per
    /// document — never assume the reference page's box.
    fn page_bbox(&self) -> PageBBox;

    /// Text whose anchor point falls inside `rect` (same coordinate system
    /// as [`page_bbox`](Self::page_bbox)), reading order, with embedded
    /// line breaks normalized to single spaces. Empty when nothing matches.
    fn text_in_region(&self, rect: &Rect) -> String;
}
