//! lopdf-backed document source.
//!
//! Opens a PDF, interprets the first page's content stream once, and
//! answers region queries against the cached glyph list. Region membership
//! is decided by the glyph's anchor point (baseline origin), matching how
//! a user who drew a box around visible text expects it to behave.

use std::path::Path;

use tracing::debug;

use boxtract_core::{PageBBox, Rect};

use crate::error::SourceError;
use crate::interpreter::{collect_chars, resolve_inherited, TextChar};
use crate::source::{DocumentSource, SourceDocument};

/// Glyphs whose baselines differ by no more than this are one line, and a
/// horizontal gap wider than this between neighbors becomes a space. In
/// page units (points).
const LINE_TOLERANCE: f64 = 3.0;
const GAP_TOLERANCE: f64 = 3.0;

/// Opens PDFs with lopdf. Stateless; share one value across workers.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfSource;

impl DocumentSource for LopdfSource {
    type Document = LopdfDocument;

    fn open(&self, path: &Path) -> Result<LopdfDocument, SourceError> {
        let doc = lopdf::Document::load(path)
            .map_err(|e| SourceError::Parse(format!("{e}")))?;
        LopdfDocument::from_document(&doc)
    }
}

/// A parsed document, reduced to its first page's geometry and glyphs.
#[derive(Debug)]
pub struct LopdfDocument {
    page_bbox: PageBBox,
    chars: Vec<TextChar>,
}

impl LopdfDocument {
    /// Extract the first page from an already-loaded lopdf document.
    pub fn from_document(doc: &lopdf::Document) -> Result<Self, SourceError> {
        if doc.is_encrypted() {
            return Err(SourceError::Encrypted);
        }
        let page_id = doc
            .get_pages()
            .into_values()
            .next()
            .ok_or(SourceError::NoPages)?;
        let page_bbox = media_box(doc, page_id)?;
        let chars = collect_chars(doc, page_id)?;
        debug!(
            glyphs = chars.len(),
            width = page_bbox.width(),
            height = page_bbox.height(),
            "loaded document"
        );
        Ok(Self { page_bbox, chars })
    }

    /// Parse a document from in-memory bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SourceError> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| SourceError::Parse(format!("{e}")))?;
        Self::from_document(&doc)
    }
}

impl SourceDocument for LopdfDocument {
    fn page_bbox(&self) -> PageBBox {
        self.page_bbox
    }

    fn text_in_region(&self, rect: &Rect) -> String {
        let mut hits: Vec<&TextChar> = self
            .chars
            .iter()
            .filter(|c| rect.contains_point(c.x, c.y))
            .collect();
        if hits.is_empty() {
            return String::new();
        }

        // Cluster into lines by baseline y, top of page first.
        hits.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));
        let mut lines: Vec<Vec<&TextChar>> = Vec::new();
        for c in hits {
            match lines.last_mut() {
                Some(line) if (line[0].y - c.y).abs() <= LINE_TOLERANCE => line.push(c),
                _ => lines.push(vec![c]),
            }
        }

        let mut out = String::new();
        for line in &mut lines {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            if !out.is_empty() {
                out.push(' ');
            }
            let mut prev_end: Option<f64> = None;
            for c in line.iter() {
                if let Some(end) = prev_end {
                    if c.x - end > GAP_TOLERANCE {
                        out.push(' ');
                    }
                }
                out.push_str(&c.text);
                prev_end = Some(c.x + c.width);
            }
        }

        // Collapse runs of whitespace; line breaks become single spaces.
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Resolve the page's /MediaBox, inherited through the page tree.
pub(crate) fn media_box(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<PageBBox, SourceError> {
    let obj = resolve_inherited(doc, page_id, b"MediaBox")
        .ok_or_else(|| SourceError::Parse("page has no /MediaBox".to_string()))?;
    let obj = match obj {
        lopdf::Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|e| SourceError::Parse(format!("bad /MediaBox reference: {e}")))?,
        other => other,
    };
    let arr = obj
        .as_array()
        .map_err(|_| SourceError::Parse("/MediaBox is not an array".to_string()))?;
    if arr.len() != 4 {
        return Err(SourceError::Parse(format!(
            "/MediaBox has {} elements, expected 4",
            arr.len()
        )));
    }
    let mut v = [0.0f64; 4];
    for (i, obj) in arr.iter().enumerate() {
        v[i] = match obj {
            lopdf::Object::Integer(n) => *n as f64,
            lopdf::Object::Real(f) => *f as f64,
            _ => {
                return Err(SourceError::Parse(
                    "/MediaBox element is not a number".to_string(),
                ))
            }
        };
    }
    Ok(PageBBox::new(
        v[0].min(v[2]),
        v[1].min(v[3]),
        v[0].max(v[2]),
        v[1].max(v[3]),
    ))
}
