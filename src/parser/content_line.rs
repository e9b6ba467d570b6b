//! Split the lines of a `LineReader` into properties.
//!
//! A property line is `NAME[;PARAM=...]:VALUE`. Only the name and the value
//! are kept:
//! - The name is everything before the first `:`, cut at the first `;` and
//!   formatted in uppercase.
//! - The value is everything after the first `:`, untouched.
//!
//! Folded lines are passed through as `Token::Continuation`, lines without a
//! `:` are skipped.
//!
//! # Examples
//!
//! ```rust
//! let feed = "BEGIN:VEVENT\r\nDTSTART;TZID=America/New_York:20250101T100000\r\nEND:VEVENT\r\n";
//!
//! for token in calfeed::ContentLineParser::new(feed) {
//!     println!("{:?}", token);
//! }
//! ```

use std::fmt;

use super::{Line, LineReader};
use crate::{PARAM_DELIMITER, VALUE_DELIMITER};

/// A tokenized property line.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct ContentLine {
    /// Property name, without parameters.
    pub name: String,
    /// Raw property value.
    pub value: String,
}

impl ContentLine {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ContentLine {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Tokenize one unfolded, trimmed line.
    pub fn parse(line: &str) -> Option<Self> {
        let (key, value) = line.split_once(VALUE_DELIMITER)?;
        let name = key.split(PARAM_DELIMITER).next().unwrap_or(key);
        if name.is_empty() {
            return None;
        }
        Some(ContentLine {
            name: name.to_uppercase(),
            value: value.to_owned(),
        })
    }

    /// Whether this is the `BEGIN` or `END` marker of component `component`.
    #[inline]
    pub fn is_marker(&self, marker: &str, component: &str) -> bool {
        self.name == marker && self.value.trim().eq_ignore_ascii_case(component)
    }
}

impl fmt::Display for ContentLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "name: {}\nvalue: {:?}", self.name, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Property(ContentLine),
    /// A folded line, its text is the continuation after the leading whitespace.
    Continuation(Line<'a>),
}

#[derive(Debug, Clone)]
pub struct ContentLineParser<'a>(LineReader<'a>);

impl<'a> ContentLineParser<'a> {
    pub fn new(input: &'a str) -> Self {
        ContentLineParser(LineReader::new(input))
    }

    pub fn from_reader(line_reader: LineReader<'a>) -> Self {
        ContentLineParser(line_reader)
    }
}

impl<'a> Iterator for ContentLineParser<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.0.by_ref() {
            if line.is_continuation() {
                return Some(Token::Continuation(line));
            }
            match ContentLine::parse(line.as_str().trim()) {
                Some(content_line) => return Some(Token::Property(content_line)),
                None => tracing::trace!(line = line.number(), "skipping line without property"),
            }
        }
        None
    }
}
