//! Serialize occurrences back into calendar text.

mod ical;
pub use ical::{OccurrenceExport, export_file_name};

/// Maximum length of one physical line in octets, without the line break.
const MAX_LINE_OCTETS: usize = 75;

pub trait Emitter {
    fn generate(&self) -> String;
}

impl<T: Emitter> Emitter for [T] {
    fn generate(&self) -> String {
        self.iter().map(Emitter::generate).collect()
    }
}

/// Escape a TEXT value.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Terminate `line` with CRLF, folding it into physical lines of at most 75 octets.
///
/// Continuation lines start with a space, folds never split a character.
pub fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3 + 2);
    let mut len = 0;
    for c in line.chars() {
        if len + c.len_utf8() > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            len = 1;
        }
        folded.push(c);
        len += c.len_utf8();
    }
    folded.push_str("\r\n");
    folded
}
