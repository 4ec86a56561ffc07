use std::cell::Cell;
use std::io::{self, IsTerminal, Write};

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Render a header and rows as CSV text, one line per row.
pub fn csv_lines(header: &[String], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        let line: Vec<String> = row.iter().map(|cell| csv_escape(cell)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// A progress reporter that prints "Processing document N/M..." to stderr,
/// but only when stderr is connected to a TTY (terminal).
pub struct ProgressReporter {
    total: usize,
    is_tty: bool,
    /// Width of the last line composed, so `finish` clears exactly that.
    last_width: Cell<usize>,
}

impl ProgressReporter {
    /// Create a new progress reporter for `total` documents.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            is_tty: io::stderr().is_terminal(),
            last_width: Cell::new(0),
        }
    }

    /// Report progress for document `current` (1-indexed).
    pub fn report(&self, current: usize) {
        let line = format!("Processing document {}/{}...", current, self.total);
        self.last_width.set(line.len());
        if self.is_tty {
            eprint!("\r{line}");
            let _ = io::stderr().flush();
        }
    }

    /// Clear the progress line (if TTY).
    pub fn finish(&self) {
        if self.is_tty && self.last_width.get() > 0 {
            eprint!("\r{}\r", " ".repeat(self.last_width.get()));
            let _ = io::stderr().flush();
        }
        self.last_width.set(0);
    }
}
