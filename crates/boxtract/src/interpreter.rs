//! Compact content-stream interpreter for positioned text.
//!
//! Walks a page's content stream tracking the graphics and text matrices
//! and emits one [`TextChar`] per decoded glyph, positioned in the page's
//! native (MediaBox) coordinate system. Only the operators that influence
//! text placement are interpreted; painting operators are ignored.

use std::collections::HashMap;

use tracing::debug;

use crate::error::SourceError;
use crate::font::Font;

/// A single positioned glyph in page coordinates (bottom-left origin).
#[derive(Debug, Clone)]
pub(crate) struct TextChar {
    pub text: String,
    /// Anchor point (glyph origin on the baseline).
    pub x: f64,
    pub y: f64,
    /// Horizontal advance in page units.
    pub width: f64,
}

/// 2D affine matrix in PDF row-vector convention:
/// `(x', y') = (x*a + y*c + e, x*b + y*d + f)`.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

const IDENTITY: Matrix = Matrix {
    a: 1.0,
    b: 0.0,
    c: 0.0,
    d: 1.0,
    e: 0.0,
    f: 0.0,
};

impl Matrix {
    fn translation(tx: f64, ty: f64) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..IDENTITY
        }
    }

    /// `self × other` (self applied first).
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}

/// Text-positioning state (PDF 9.3).
struct TextState {
    tm: Matrix,
    tlm: Matrix,
    font_key: Option<String>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    /// Tz value divided by 100.
    h_scale: f64,
    leading: f64,
    rise: f64,
}

impl TextState {
    fn new() -> Self {
        Self {
            tm: IDENTITY,
            tlm: IDENTITY,
            font_key: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translation(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }
}

fn num(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

fn operand(operands: &[lopdf::Object], idx: usize) -> f64 {
    operands.get(idx).and_then(num).unwrap_or(0.0)
}

/// Interpret a page's content and collect positioned glyphs.
pub(crate) fn collect_chars(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<Vec<TextChar>, SourceError> {
    let content_bytes = page_content_bytes(doc, page_id)?;
    let content = lopdf::content::Content::decode(&content_bytes)
        .map_err(|e| SourceError::Parse(format!("failed to decode content stream: {e}")))?;

    let fonts = page_fonts(doc, page_id);
    let mut font_cache: HashMap<String, Font> = HashMap::new();

    let mut chars = Vec::new();
    let mut ctm = IDENTITY;
    let mut ctm_stack: Vec<Matrix> = Vec::new();
    let mut ts = TextState::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let m = Matrix {
                        a: operand(&op.operands, 0),
                        b: operand(&op.operands, 1),
                        c: operand(&op.operands, 2),
                        d: operand(&op.operands, 3),
                        e: operand(&op.operands, 4),
                        f: operand(&op.operands, 5),
                    };
                    ctm = m.then(&ctm);
                }
            }

            "BT" => {
                ts.tm = IDENTITY;
                ts.tlm = IDENTITY;
            }
            "ET" => {}
            "Tf" => {
                if let Some(name) = op.operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|n| std::str::from_utf8(n).ok()) {
                    if !font_cache.contains_key(name) {
                        if let Some(dict) = fonts.get(name) {
                            font_cache.insert(name.to_string(), Font::load(doc, dict));
                        }
                    }
                    ts.font_key = Some(name.to_string());
                }
                ts.size = operand(&op.operands, 1);
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    ts.tm = Matrix {
                        a: operand(&op.operands, 0),
                        b: operand(&op.operands, 1),
                        c: operand(&op.operands, 2),
                        d: operand(&op.operands, 3),
                        e: operand(&op.operands, 4),
                        f: operand(&op.operands, 5),
                    };
                    ts.tlm = ts.tm;
                }
            }
            "Td" => ts.next_line(operand(&op.operands, 0), operand(&op.operands, 1)),
            "TD" => {
                ts.leading = -operand(&op.operands, 1);
                ts.next_line(operand(&op.operands, 0), operand(&op.operands, 1));
            }
            "T*" => ts.next_line(0.0, -ts.leading),
            "TL" => ts.leading = operand(&op.operands, 0),
            "Tc" => ts.char_spacing = operand(&op.operands, 0),
            "Tw" => ts.word_spacing = operand(&op.operands, 0),
            "Tz" => ts.h_scale = operand(&op.operands, 0) / 100.0,
            "Ts" => ts.rise = operand(&op.operands, 0),

            "Tj" => {
                if let Some(lopdf::Object::String(bytes, _)) = op.operands.first() {
                    show_text(bytes, &mut ts, &ctm, &font_cache, &mut chars);
                }
            }
            "'" => {
                ts.next_line(0.0, -ts.leading);
                if let Some(lopdf::Object::String(bytes, _)) = op.operands.first() {
                    show_text(bytes, &mut ts, &ctm, &font_cache, &mut chars);
                }
            }
            "\"" => {
                ts.word_spacing = operand(&op.operands, 0);
                ts.char_spacing = operand(&op.operands, 1);
                ts.next_line(0.0, -ts.leading);
                if let Some(lopdf::Object::String(bytes, _)) = op.operands.get(2) {
                    show_text(bytes, &mut ts, &ctm, &font_cache, &mut chars);
                }
            }
            "TJ" => {
                if let Some(lopdf::Object::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            lopdf::Object::String(bytes, _) => {
                                show_text(bytes, &mut ts, &ctm, &font_cache, &mut chars);
                            }
                            other => {
                                if let Some(adj) = num(other) {
                                    let tx = -adj / 1000.0 * ts.size * ts.h_scale;
                                    ts.tm = Matrix::translation(tx, 0.0).then(&ts.tm);
                                }
                            }
                        }
                    }
                }
            }

            // Painting, color, XObject, and marked-content operators do not
            // move text.
            _ => {}
        }
    }

    debug!(glyphs = chars.len(), "interpreted page content");
    Ok(chars)
}

fn show_text(
    bytes: &[u8],
    ts: &mut TextState,
    ctm: &Matrix,
    font_cache: &HashMap<String, Font>,
    out: &mut Vec<TextChar>,
) {
    let fallback = Font::default();
    let font = ts
        .font_key
        .as_ref()
        .and_then(|k| font_cache.get(k))
        .unwrap_or(&fallback);

    for (code, text) in font.decode(bytes) {
        let device = ts.tm.then(ctm);
        let (x, y) = device.apply(0.0, ts.rise);

        let w0 = font.width(code) / 1000.0;
        let mut advance = (w0 * ts.size + ts.char_spacing) * ts.h_scale;
        // Word spacing applies to single-byte code 32 only (PDF 9.3.3).
        if code == 32 && !font.is_two_byte() {
            advance += ts.word_spacing * ts.h_scale;
        }

        if !text.is_empty() {
            // Glyph width measured in device space so scaling CTMs are
            // reflected in reading-order gap detection.
            let (x_end, y_end) = device.apply(w0 * ts.size * ts.h_scale, ts.rise);
            out.push(TextChar {
                text,
                x,
                y,
                width: (x_end - x).hypot(y_end - y),
            });
        }

        ts.tm = Matrix::translation(advance, 0.0).then(&ts.tm);
    }
}

/// Resolve a page's content stream bytes, concatenating /Contents arrays
/// and decompressing filtered streams.
fn page_content_bytes(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<Vec<u8>, SourceError> {
    let page_dict = doc
        .get_object(page_id)
        .and_then(|o| o.as_dict())
        .map_err(|e| SourceError::Parse(format!("failed to get page dictionary: {e}")))?;

    let contents_obj = match page_dict.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()), // page with no content
    };

    match contents_obj {
        lopdf::Object::Reference(id) => {
            let stream = doc
                .get_object(*id)
                .and_then(|o| o.as_stream())
                .map_err(|e| SourceError::Parse(format!("/Contents is not a stream: {e}")))?;
            stream_bytes(stream)
        }
        lopdf::Object::Array(arr) => {
            let mut content = Vec::new();
            for item in arr {
                let id = item.as_reference().map_err(|e| {
                    SourceError::Parse(format!("/Contents array item is not a reference: {e}"))
                })?;
                let stream = doc.get_object(id).and_then(|o| o.as_stream()).map_err(|e| {
                    SourceError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                if !content.is_empty() {
                    content.push(b' ');
                }
                content.extend_from_slice(&stream_bytes(stream)?);
            }
            Ok(content)
        }
        _ => Err(SourceError::Parse(
            "/Contents is not a reference or array".to_string(),
        )),
    }
}

fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>, SourceError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| SourceError::Parse(format!("failed to decompress content stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Collect the page's /Font resource dictionaries by name, walking up the
/// page tree for inherited /Resources.
fn page_fonts(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> HashMap<String, lopdf::Dictionary> {
    let mut fonts = HashMap::new();
    let Some(resources) = resolve_inherited(doc, page_id, b"Resources") else {
        return fonts;
    };
    let resources = match resources {
        lopdf::Object::Reference(id) => match doc.get_object(*id) {
            Ok(obj) => obj,
            Err(_) => return fonts,
        },
        other => other,
    };
    let Ok(resources) = resources.as_dict() else {
        return fonts;
    };
    let Ok(font_dict) = resources.get(b"Font") else {
        return fonts;
    };
    let font_dict = match font_dict {
        lopdf::Object::Reference(id) => match doc.get_object(*id).and_then(|o| o.as_dict()) {
            Ok(d) => d,
            Err(_) => return fonts,
        },
        other => match other.as_dict() {
            Ok(d) => d,
            Err(_) => return fonts,
        },
    };
    for (name, obj) in font_dict.iter() {
        let dict = match obj {
            lopdf::Object::Reference(id) => doc.get_object(*id).and_then(|o| o.as_dict()).ok(),
            other => other.as_dict().ok(),
        };
        if let Some(dict) = dict {
            fonts.insert(String::from_utf8_lossy(name).into_owned(), dict.clone());
        }
    }
    fonts
}

/// Look up a key in the page dictionary, walking up the page tree via
/// /Parent if the key is not found on the page itself.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Option<&'a lopdf::Object> {
    let mut current_id = page_id;
    loop {
        let dict = doc.get_object(current_id).and_then(|o| o.as_dict()).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
}
