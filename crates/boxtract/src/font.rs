//! Minimal font model for positioned text extraction.
//!
//! Enough of a font to (a) decode shown string bytes into Unicode text and
//! (b) advance the text matrix by a plausible glyph width. Unicode mapping
//! prefers the font's embedded /ToUnicode CMap; simple fonts without one
//! fall back to WinAnsi (cp1252). Widths come from /Widths (simple fonts)
//! or /W + /DW (Type0), with a 500/1000ths fallback.

use std::collections::HashMap;

use encoding_rs::WINDOWS_1252;

/// Width used when a font declares nothing for a code, in 1000ths of an em.
const FALLBACK_WIDTH: f64 = 500.0;

#[derive(Debug)]
pub(crate) struct Font {
    /// Type0 fonts consume two bytes per code.
    two_byte: bool,
    to_unicode: Option<HashMap<u32, String>>,
    widths: HashMap<u32, f64>,
    default_width: f64,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            two_byte: false,
            to_unicode: None,
            widths: HashMap::new(),
            default_width: FALLBACK_WIDTH,
        }
    }
}

/// Follow an indirect reference, if any.
fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn as_f64(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(*f as f64),
        _ => None,
    }
}

impl Font {
    /// Build a font model from a /Font dictionary entry.
    pub(crate) fn load(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Self {
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .and_then(|n| std::str::from_utf8(n).ok())
            .unwrap_or("");

        let to_unicode = load_to_unicode(doc, dict);

        if subtype == "Type0" {
            let mut font = Font {
                two_byte: true,
                to_unicode,
                widths: HashMap::new(),
                default_width: 1000.0,
            };
            if let Some(descendant) = descendant_font(doc, dict) {
                if let Some(dw) = descendant.get(b"DW").ok().and_then(as_f64) {
                    font.default_width = dw;
                }
                if let Ok(w) = descendant.get(b"W") {
                    if let lopdf::Object::Array(arr) = resolve(doc, w) {
                        font.widths = parse_cid_widths(doc, arr);
                    }
                }
            }
            font
        } else {
            let mut font = Font {
                two_byte: false,
                to_unicode,
                widths: HashMap::new(),
                default_width: FALLBACK_WIDTH,
            };
            let first_char = dict
                .get(b"FirstChar")
                .ok()
                .and_then(as_f64)
                .unwrap_or(0.0) as u32;
            if let Ok(w) = dict.get(b"Widths") {
                if let lopdf::Object::Array(arr) = resolve(doc, w) {
                    for (i, obj) in arr.iter().enumerate() {
                        if let Some(width) = as_f64(resolve(doc, obj)) {
                            font.widths.insert(first_char + i as u32, width);
                        }
                    }
                }
            }
            font
        }
    }

    /// Decode shown string bytes into `(code, text)` pairs.
    ///
    /// Codes with no usable Unicode mapping yield empty text; the caller
    /// still advances the matrix by their width so following glyphs keep
    /// their positions.
    pub(crate) fn decode(&self, bytes: &[u8]) -> Vec<(u32, String)> {
        if self.two_byte {
            bytes
                .chunks(2)
                .filter(|c| c.len() == 2)
                .map(|c| {
                    let code = u32::from(u16::from_be_bytes([c[0], c[1]]));
                    (code, self.code_to_text(code))
                })
                .collect()
        } else {
            bytes
                .iter()
                .map(|&b| (u32::from(b), self.code_to_text(u32::from(b))))
                .collect()
        }
    }

    fn code_to_text(&self, code: u32) -> String {
        if let Some(map) = &self.to_unicode {
            if let Some(text) = map.get(&code) {
                return text.clone();
            }
        }
        if self.two_byte {
            // A raw CID is not a Unicode scalar; only pass through values
            // that happen to be printable.
            return char::from_u32(code)
                .filter(|c| !c.is_control())
                .map(String::from)
                .unwrap_or_default();
        }
        let byte = [code as u8];
        let (text, _, _) = WINDOWS_1252.decode(&byte);
        text.into_owned()
    }

    /// Whether shown strings consume two bytes per code.
    pub(crate) fn is_two_byte(&self) -> bool {
        self.two_byte
    }

    /// Glyph width for a code, in 1000ths of an em.
    pub(crate) fn width(&self, code: u32) -> f64 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }
}

/// Fetch and decompress the /ToUnicode CMap stream, if present.
fn load_to_unicode(doc: &lopdf::Document, dict: &lopdf::Dictionary) -> Option<HashMap<u32, String>> {
    let obj = resolve(doc, dict.get(b"ToUnicode").ok()?);
    let stream = obj.as_stream().ok()?;
    let data = if stream.dict.get(b"Filter").is_ok() {
        stream.decompressed_content().ok()?
    } else {
        stream.content.clone()
    };
    Some(parse_to_unicode(&data))
}

fn descendant_font<'a>(
    doc: &'a lopdf::Document,
    dict: &'a lopdf::Dictionary,
) -> Option<&'a lopdf::Dictionary> {
    let arr = match resolve(doc, dict.get(b"DescendantFonts").ok()?) {
        lopdf::Object::Array(arr) => arr,
        _ => return None,
    };
    resolve(doc, arr.first()?).as_dict().ok()
}

/// Parse a CIDFont /W array: `[c [w1 w2 ...]]` runs and `[c1 c2 w]` ranges.
fn parse_cid_widths(doc: &lopdf::Document, arr: &[lopdf::Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < arr.len() {
        let Some(start) = as_f64(resolve(doc, &arr[i])) else {
            break;
        };
        let start = start as u32;
        match resolve(doc, match arr.get(i + 1) {
            Some(obj) => obj,
            None => break,
        }) {
            lopdf::Object::Array(run) => {
                for (offset, w) in run.iter().enumerate() {
                    if let Some(w) = as_f64(resolve(doc, w)) {
                        widths.insert(start + offset as u32, w);
                    }
                }
                i += 2;
            }
            other => {
                let Some(end) = as_f64(other) else { break };
                let Some(w) = arr.get(i + 2).and_then(|o| as_f64(resolve(doc, o))) else {
                    break;
                };
                for code in start..=(end as u32) {
                    widths.insert(code, w);
                }
                i += 3;
            }
        }
    }
    widths
}

#[derive(Debug, PartialEq)]
enum Tok {
    Hex(Vec<u8>),
    Num(i64),
    Kw(String),
    ArrStart,
    ArrEnd,
}

/// Tokenize a CMap stream just enough for bfchar/bfrange sections.
fn lex_cmap(data: &[u8]) -> Vec<Tok> {
    let mut toks = Vec::new();
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'<' => {
                let mut hex = Vec::new();
                let mut nibbles = Vec::new();
                i += 1;
                while i < data.len() && data[i] != b'>' {
                    if data[i].is_ascii_hexdigit() {
                        nibbles.push(data[i]);
                    }
                    i += 1;
                }
                i += 1;
                for pair in nibbles.chunks(2) {
                    let hi = (pair[0] as char).to_digit(16).unwrap_or(0) as u8;
                    let lo = if pair.len() == 2 {
                        (pair[1] as char).to_digit(16).unwrap_or(0) as u8
                    } else {
                        0
                    };
                    hex.push(hi << 4 | lo);
                }
                toks.push(Tok::Hex(hex));
            }
            b'[' => {
                toks.push(Tok::ArrStart);
                i += 1;
            }
            b']' => {
                toks.push(Tok::ArrEnd);
                i += 1;
            }
            b'%' => {
                while i < data.len() && data[i] != b'\n' {
                    i += 1;
                }
            }
            c if c.is_ascii_digit() || c == b'-' => {
                let start = i;
                i += 1;
                while i < data.len() && (data[i].is_ascii_digit() || data[i] == b'.') {
                    i += 1;
                }
                if let Ok(text) = std::str::from_utf8(&data[start..i]) {
                    if let Ok(n) = text.parse::<i64>() {
                        toks.push(Tok::Num(n));
                    }
                }
            }
            c if c.is_ascii_alphabetic() => {
                let start = i;
                while i < data.len()
                    && (data[i].is_ascii_alphanumeric() || data[i] == b'*' || data[i] == b'_')
                {
                    i += 1;
                }
                toks.push(Tok::Kw(
                    String::from_utf8_lossy(&data[start..i]).into_owned(),
                ));
            }
            _ => i += 1,
        }
    }
    toks
}

fn hex_to_code(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| acc << 8 | u32::from(b))
}

fn hex_to_text(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| {
            if c.len() == 2 {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                u16::from(c[0])
            }
        })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Parse bfchar/bfrange mappings out of a /ToUnicode CMap.
fn parse_to_unicode(data: &[u8]) -> HashMap<u32, String> {
    let toks = lex_cmap(data);
    let mut map = HashMap::new();
    let mut i = 0;
    while i < toks.len() {
        match &toks[i] {
            Tok::Kw(kw) if kw == "beginbfchar" => {
                i += 1;
                while i + 1 < toks.len() {
                    match (&toks[i], &toks[i + 1]) {
                        (Tok::Hex(src), Tok::Hex(dst)) => {
                            map.insert(hex_to_code(src), hex_to_text(dst));
                            i += 2;
                        }
                        _ => break,
                    }
                }
            }
            Tok::Kw(kw) if kw == "beginbfrange" => {
                i += 1;
                loop {
                    match (toks.get(i), toks.get(i + 1), toks.get(i + 2)) {
                        (Some(Tok::Hex(lo)), Some(Tok::Hex(hi)), Some(Tok::Hex(dst))) => {
                            let (lo, hi) = (hex_to_code(lo), hex_to_code(hi));
                            let base = hex_to_code(dst);
                            for (offset, code) in (lo..=hi).enumerate() {
                                if let Some(c) = char::from_u32(base + offset as u32) {
                                    map.insert(code, c.to_string());
                                }
                            }
                            i += 3;
                        }
                        (Some(Tok::Hex(lo)), Some(Tok::Hex(_)), Some(Tok::ArrStart)) => {
                            let lo = hex_to_code(lo);
                            i += 3;
                            let mut offset = 0u32;
                            while let Some(Tok::Hex(dst)) = toks.get(i) {
                                map.insert(lo + offset, hex_to_text(dst));
                                offset += 1;
                                i += 1;
                            }
                            if let Some(Tok::ArrEnd) = toks.get(i) {
                                i += 1;
                            }
                        }
                        _ => break,
                    }
                }
            }
            _ => i += 1,
        }
    }
    map
}
