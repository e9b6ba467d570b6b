//! Read the physical lines of a calendar feed.
//!
//! A line starting with a single space or tab continues the value of the
//! field opened before it. `LineReader` only classifies lines, the fold is
//! resolved by the assembler which knows which field is currently open.

use std::fmt;
use std::str::Lines;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[inline]
fn is_fold_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// A physical line of input, without its line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    number: usize,
    inner: &'a str,
}

impl<'a> Line<'a> {
    /// 1-based line number in the input.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn as_str(&self) -> &'a str {
        self.inner
    }

    pub fn is_continuation(&self) -> bool {
        self.inner.starts_with(is_fold_char)
    }

    /// The folded text with its single leading whitespace character removed.
    pub fn continuation(&self) -> Option<&'a str> {
        self.is_continuation().then(|| &self.inner[1..])
    }
}

impl fmt::Display for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

/// Iterate over the lines of a feed, accepting both `\r\n` and `\n`.
#[derive(Debug, Clone)]
pub struct LineReader<'a> {
    lines: Lines<'a>,
    number: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(input: &'a str) -> Self {
        LineReader {
            lines: input.strip_prefix(BYTE_ORDER_MARK).unwrap_or(input).lines(),
            number: 0,
        }
    }
}

impl<'a> Iterator for LineReader<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.lines.next()?;
        self.number += 1;
        Some(Line {
            number: self.number,
            inner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::LineReader;
    use itertools::Itertools;
    use rstest::rstest;

    #[rstest]
    #[case("A:1\r\nB:2\r\n")]
    #[case("A:1\nB:2\n")]
    #[case("\u{feff}A:1\r\nB:2")]
    fn line_endings(#[case] input: &str) {
        let lines = LineReader::new(input).map(|line| line.as_str()).collect_vec();
        assert_eq!(lines, vec!["A:1", "B:2"]);
    }

    #[test]
    fn continuations() {
        let input = "DESCRIPTION:first\r\n second\r\n\tthird \r\nSUMMARY:x";
        let lines = LineReader::new(input).collect_vec();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].continuation(), None);
        assert_eq!(lines[1].continuation(), Some("second"));
        assert_eq!(lines[2].continuation(), Some("third "));
        assert_eq!(lines[3].number(), 4);
    }

    #[test]
    fn only_first_whitespace_is_removed() {
        let line = LineReader::new("  two spaces").next().unwrap();
        assert_eq!(line.continuation(), Some(" two spaces"));
    }
}
