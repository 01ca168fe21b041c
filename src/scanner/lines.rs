//! Line splitting with byte offsets and indentation measurement.
//!
//! Every scanner pass works on the same [`Line`] view of the document so that
//! offsets reported for blocks always index into the original text.

use crate::constants::TAB_WIDTH;

/// One physical line of a document, without its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// Byte offset of the first character of the line.
    pub start: usize,
    /// Line text with `\n` / `\r\n` removed.
    pub text: &'a str,
}

impl<'a> Line<'a> {
    /// Indentation in columns, tabs counting [`TAB_WIDTH`].
    pub fn indent(&self) -> usize {
        indent_width(self.text)
    }

    /// Text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// Blank lines and `#` comments never influence block structure.
    pub fn is_blank_or_comment(&self) -> bool {
        let trimmed = self.trimmed();
        trimmed.is_empty() || trimmed.starts_with('#')
    }

    /// True when this line is exactly `key:` at column zero (trailing whitespace allowed).
    pub fn is_top_level_key(&self, key: &str) -> bool {
        self.text.trim_end().strip_suffix(':') == Some(key)
    }
}

/// Split `content` into lines, keeping the byte offset of each line start.
pub(crate) fn split_lines(content: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;

    for raw in content.split_inclusive('\n') {
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);
        lines.push(Line {
            start,
            text,
        });
        start += raw.len();
    }

    lines
}

/// Leading whitespace width of `line` in columns.
pub(crate) fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH,
            _ => break,
        }
    }
    width
}
