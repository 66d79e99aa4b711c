//! Immutable, rope-backed source snapshot.
//!
//! [`DdsDocument`] is what the core reads lines from and what [`crate::edit::EditSet`]s are
//! computed against. Applying edits produces a new snapshot; the old one stays valid.

use crate::edit::{EditError, EditSet};
use ropey::Rope;
use std::ops::Range;

/// Line break sequence used when the core inserts new lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Detect the line ending of a text: any CRLF selects [`LineEnding::Crlf`].
    pub fn detect_in_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// The line break characters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// Split text into lines the way the document counts them: `N` line feeds make `N + 1` lines,
/// and a trailing `\r` is not part of a line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// A read-only DDS source snapshot.
#[derive(Debug, Clone)]
pub struct DdsDocument {
    rope: Rope,
    line_ending: LineEnding,
    line_starts: Vec<usize>,
}

impl DdsDocument {
    /// Build a snapshot from text.
    pub fn new(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let mut line_starts = vec![0];
        let mut offset = 0;
        for ch in text.chars() {
            offset += 1;
            if ch == '\n' {
                line_starts.push(offset);
            }
        }
        Self {
            rope,
            line_ending: LineEnding::detect_in_text(text),
            line_starts,
        }
    }

    /// Full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines (an empty document has one empty line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Number of characters.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Detected line ending.
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Char offset where `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Char offset where the content of `line` ends (before `\r\n` / `\n`).
    pub fn line_end(&self, line: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let next = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or_else(|| self.char_count());
        let mut end = next;
        if end > start && self.rope.char(end - 1) == '\n' {
            end -= 1;
            if end > start && self.rope.char(end - 1) == '\r' {
                end -= 1;
            }
        }
        Some(end)
    }

    /// Content range of `line`, excluding its line break.
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        Some(self.line_start(line)?..self.line_end(line)?)
    }

    /// Text of `line` without its line break.
    pub fn line(&self, line: usize) -> Option<String> {
        let range = self.line_range(line)?;
        Some(self.rope.slice(range).to_string())
    }

    /// All lines without line breaks.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).filter_map(|i| self.line(i)).collect()
    }

    /// Lines `start..=end` joined with the document's line ending (no trailing break).
    pub fn block_text(&self, start: usize, end: usize) -> Option<String> {
        if start > end || end >= self.line_count() {
            return None;
        }
        let lines: Option<Vec<String>> = (start..=end).map(|i| self.line(i)).collect();
        Some(lines?.join(self.line_ending.as_str()))
    }

    /// Line index and character column of a char offset (clamped to the document).
    pub fn char_to_position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.char_count());
        let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
        (line, offset - self.line_starts[line])
    }

    /// Char offset of a line/column pair, with the column clamped to the line content.
    pub fn position_to_char(&self, line: usize, column: usize) -> Option<usize> {
        let range = self.line_range(line)?;
        Some((range.start + column).min(range.end))
    }

    /// Apply an edit set and return the resulting snapshot.
    pub fn apply(&self, edits: &EditSet) -> Result<DdsDocument, EditError> {
        edits.check_bounds(self.char_count())?;
        let mut rope = self.rope.clone();
        for edit in edits.application_order() {
            if !edit.range.is_empty() {
                rope.remove(edit.range.clone());
            }
            if !edit.new_text.is_empty() {
                rope.insert(edit.range.start, &edit.new_text);
            }
        }
        Ok(Self::new(&rope.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::TextEdit;

    #[test]
    fn test_line_offsets() {
        let doc = DdsDocument::new("AB\nCDE\nF");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_range(0), Some(0..2));
        assert_eq!(doc.line_range(1), Some(3..6));
        assert_eq!(doc.line_range(2), Some(7..8));
        assert_eq!(doc.line_range(3), None);
        assert_eq!(doc.char_to_position(4), (1, 1));
        assert_eq!(doc.position_to_char(1, 10), Some(6));
    }

    #[test]
    fn test_trailing_newline_makes_empty_last_line() {
        let doc = DdsDocument::new("A\nB\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(2).as_deref(), Some(""));
        assert_eq!(split_lines("A\nB\n").len(), 3);
    }

    #[test]
    fn test_crlf_lines() {
        let doc = DdsDocument::new("AB\r\nCD\r\n");
        assert_eq!(doc.line_ending(), LineEnding::Crlf);
        assert_eq!(doc.line(0).as_deref(), Some("AB"));
        assert_eq!(doc.line_range(1), Some(4..6));
        assert_eq!(doc.block_text(0, 1).as_deref(), Some("AB\r\nCD"));
    }

    #[test]
    fn test_apply_descending() {
        let doc = DdsDocument::new("one\ntwo\nthree");
        let edits = EditSet::from_edits([
            TextEdit::replace(0..3, "ONE"),
            TextEdit::delete(3..7),
            TextEdit::insert(13, "!"),
        ])
        .unwrap();
        let after = doc.apply(&edits).unwrap();
        assert_eq!(after.text(), "ONE\nthree!");
        assert_eq!(doc.text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_apply_out_of_bounds() {
        let doc = DdsDocument::new("abc");
        let edits = EditSet::single(TextEdit::delete(1..9));
        assert!(matches!(doc.apply(&edits), Err(EditError::OutOfBounds { .. })));
    }
}
