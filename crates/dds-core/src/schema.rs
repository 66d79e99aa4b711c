//! Column schema for DDS source lines.
//!
//! DDS documents every area of a specification line with **1-based, inclusive** column numbers
//! (the name field is "columns 19–28"). This crate works with **0-based, half-open** character
//! ranges (`18..28` for the same field). Each [`Column`] stores the 0-based range and can report
//! its DDS numbering through [`Column::dds_columns`].
//!
//! | Area                | DDS     | 0-based  |
//! |---------------------|---------|----------|
//! | sequence number     | 1–5     | `0..5`   |
//! | form type (`A`)     | 6       | `5..6`   |
//! | comment / AND-OR    | 7       | `6..7`   |
//! | indicator slots     | 8–16    | `7..16`  |
//! | name type (`R`/`H`) | 17      | `16..17` |
//! | name                | 19–28   | `18..28` |
//! | reference (`R`)     | 29      | `28..29` |
//! | length              | 30–34   | `29..34` |
//! | data type           | 35      | `34..35` |
//! | decimal positions   | 36–37   | `35..37` |
//! | usage               | 38      | `37..38` |
//! | row                 | 39–41   | `38..41` |
//! | column              | 42–44   | `41..44` |
//! | keyword area        | 45–79   | `44..79` |
//! | continuation marker | 80      | `79..80` |
//!
//! Reading goes through [`read`]; writing goes through [`SourceLine::write`]. The parser and the
//! reconstructor use the same constants, so a parse → edit → parse cycle always lines up.

use crate::model::Indicator;
use std::fmt;
use std::ops::Range;

/// A fixed character range of a DDS source line (0-based, half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    start: usize,
    end: usize,
}

impl Column {
    /// Create a column from a 0-based half-open range.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// First character index (0-based, inclusive).
    pub const fn start(self) -> usize {
        self.start
    }

    /// One past the last character index (0-based, exclusive).
    pub const fn end(self) -> usize {
        self.end
    }

    /// Number of characters in the column.
    pub const fn width(self) -> usize {
        self.end - self.start
    }

    /// The column as a 0-based character range.
    pub const fn range(self) -> Range<usize> {
        self.start..self.end
    }

    /// The column in DDS numbering: `(first, last)`, 1-based and inclusive.
    pub const fn dds_columns(self) -> (usize, usize) {
        (self.start + 1, self.end)
    }
}

/// Sequence number area.
pub const SEQUENCE: Column = Column::new(0, 5);
/// Form type; `A` for DDS.
pub const FORM_TYPE: Column = Column::new(5, 6);
/// Comment marker (`*`) or AND/OR condition (`A`/`O`).
pub const CONDITION: Column = Column::new(6, 7);
/// The three conditioning indicator slots, each `N` + two digits.
pub const INDICATOR_SLOTS: [Column; 3] = [Column::new(7, 10), Column::new(10, 13), Column::new(13, 16)];
/// All indicator slots as one area.
pub const INDICATORS: Column = Column::new(7, 16);
/// Name type: `R` for record formats, `H` for help specifications.
pub const NAME_TYPE: Column = Column::new(16, 17);
/// Record or field name.
pub const NAME: Column = Column::new(18, 28);
/// Reference flag (`R`).
pub const REFERENCE: Column = Column::new(28, 29);
/// Field length, right aligned.
pub const LENGTH: Column = Column::new(29, 34);
/// Data type / keyboard shift.
pub const DATA_TYPE: Column = Column::new(34, 35);
/// Decimal positions, right aligned.
pub const DECIMALS: Column = Column::new(35, 37);
/// Usage (`I`, `O`, `B`, `H`, `M`, `P`).
pub const USAGE: Column = Column::new(37, 38);
/// Screen row, right aligned.
pub const ROW: Column = Column::new(38, 41);
/// Screen column, right aligned.
pub const COL: Column = Column::new(41, 44);
/// Keyword (functions) area, excluding the continuation column.
pub const KEYWORDS: Column = Column::new(44, 79);
/// Continuation marker column.
pub const CONTINUATION: Column = Column::new(79, 80);

/// Index where keyword text starts.
pub const KEYWORD_START: usize = KEYWORDS.start();
/// Keyword characters that fit on one line next to a continuation marker.
pub const KEYWORD_CAPACITY: usize = KEYWORDS.width();
/// Longest name accepted by the name column.
pub const NAME_MAX: usize = NAME.width();
/// Marker written when a keyword continues on the next line.
pub const CONTINUATION_MARKER: char = '-';
/// Prefix of every rendered specification line.
pub const FORM_PREFIX: &str = "     A";

/// Horizontal alignment used when writing a value into a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Value starts at the first character of the column.
    Left,
    /// Value ends at the last character of the column.
    Right,
}

fn byte_offset(line: &str, char_index: usize) -> usize {
    line.char_indices()
        .nth(char_index)
        .map_or(line.len(), |(offset, _)| offset)
}

/// Slice `line` by character indices, clamping both ends to the line length.
pub fn char_slice(line: &str, start: usize, end: usize) -> &str {
    let from = byte_offset(line, start);
    let to = byte_offset(line, end.max(start));
    &line[from..to]
}

/// Read a column; characters past the end of the line read as missing.
pub fn read(line: &str, column: Column) -> &str {
    char_slice(line, column.start, column.end)
}

/// Read a column with surrounding blanks removed.
pub fn read_trimmed(line: &str, column: Column) -> &str {
    read(line, column).trim()
}

/// The character at a 0-based index, if the line is long enough.
pub fn char_at(line: &str, index: usize) -> Option<char> {
    line.chars().nth(index)
}

/// Read a single-character column, folding blanks and missing characters to `None`.
pub fn read_flag(line: &str, column: Column) -> Option<char> {
    char_at(line, column.start).filter(|ch| !ch.is_whitespace())
}

/// Read an unsigned number; blank or malformed values read as `None`.
pub fn read_number(line: &str, column: Column) -> Option<u32> {
    let text = read_trimmed(line, column);
    text.strip_prefix('+').unwrap_or(text).parse().ok()
}

/// Returns `true` if the column contains only blanks (or is past the end of the line).
pub fn is_blank(line: &str, column: Column) -> bool {
    read_trimmed(line, column).is_empty()
}

/// The continuation marker of a line, if column 80 holds `-` or `+`.
pub fn continuation_marker(line: &str) -> Option<char> {
    read_flag(line, CONTINUATION).filter(|ch| matches!(ch, '-' | '+'))
}

/// Returns `true` if the line continues onto the next one.
pub fn has_continuation(line: &str) -> bool {
    continuation_marker(line).is_some()
}

/// Keyword-area content of one physical line, without the continuation marker.
pub fn keyword_segment(line: &str) -> &str {
    if has_continuation(line) {
        read(line, KEYWORDS)
    } else {
        char_slice(line, KEYWORD_START, usize::MAX)
    }
}

/// Join the keyword areas of a run of continued lines into one value.
///
/// A `-` marker keeps the next line's leading blanks; a `+` marker drops them.
pub fn join_keyword_segments<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    let mut skip_leading = false;
    for line in lines {
        let line = line.as_ref();
        let segment = keyword_segment(line);
        let segment = if skip_leading {
            segment.trim_start()
        } else {
            segment
        };
        out.push_str(segment);
        skip_leading = continuation_marker(line) == Some('+');
    }
    out.truncate(out.trim_end().len());
    out
}

/// A mutable DDS source line addressed by character columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLine {
    chars: Vec<char>,
}

impl SourceLine {
    /// Create a specification line holding only the form type (`     A`).
    pub fn spec() -> Self {
        Self::from(FORM_PREFIX)
    }

    /// Current length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` if the line has no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Extend the line with blanks up to `width` characters.
    pub fn pad_to(&mut self, width: usize) {
        if self.chars.len() < width {
            self.chars.resize(width, ' ');
        }
    }

    /// Cut the line after `width` characters.
    pub fn truncate(&mut self, width: usize) {
        self.chars.truncate(width);
    }

    fn trim_end_to(&mut self, min_len: usize) {
        while self.chars.len() > min_len && self.chars.last() == Some(&' ') {
            self.chars.pop();
        }
    }

    /// Overwrite `column` with `value`, padded to the column width.
    ///
    /// Values wider than the column are cut to its width. Characters outside the column never
    /// change; when the line was shorter than the column, blanks added past the original end
    /// are trimmed again.
    pub fn write(&mut self, column: Column, value: &str, align: Align) {
        let original_len = self.chars.len();
        self.pad_to(column.end);
        let value: Vec<char> = value.chars().take(column.width()).collect();
        let pad = column.width() - value.len();
        let (left, right) = match align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
        };
        let rendered = std::iter::repeat_n(' ', left)
            .chain(value)
            .chain(std::iter::repeat_n(' ', right));
        for (slot, ch) in self.chars[column.range()].iter_mut().zip(rendered) {
            *slot = ch;
        }
        if original_len < column.end {
            self.trim_end_to(original_len.min(column.start));
        }
    }

    /// Write an optional number right aligned; `None` blanks the column.
    pub fn write_number(&mut self, column: Column, value: Option<u32>) {
        let text = value.map(|v| v.to_string()).unwrap_or_default();
        self.write(column, &text, Align::Right);
    }

    /// Write a single-character flag; `None` blanks it.
    pub fn write_flag(&mut self, column: Column, flag: Option<char>) {
        let text = flag.map(String::from).unwrap_or_default();
        self.write(column, &text, Align::Left);
    }

    /// Overwrite the three indicator slots. Unused slots become blank.
    ///
    /// Only the first three indicators are written; callers split longer lists over several
    /// lines.
    pub fn write_indicators(&mut self, indicators: &[Indicator]) {
        for (index, slot) in INDICATOR_SLOTS.iter().enumerate() {
            let text = indicators
                .get(index)
                .map(|indicator| indicator.slot_text())
                .unwrap_or_default();
            self.write(*slot, &text, Align::Left);
        }
    }

    /// Replace everything from the keyword area onwards with `text`.
    pub fn set_keywords(&mut self, text: &str) {
        self.truncate(KEYWORD_START);
        self.pad_to(KEYWORD_START);
        self.chars.extend(text.chars());
    }

    /// Cut the line at `column`, dropping trailing blanks but keeping the fixed columns.
    pub fn clear_from(&mut self, column: usize) {
        self.truncate(column);
        self.trim_end_to(0);
        self.pad_to(KEYWORD_START.min(column));
    }

    /// Put the continuation marker into column 80.
    pub fn mark_continued(&mut self) {
        self.pad_to(CONTINUATION.start());
        self.truncate(CONTINUATION.start());
        self.chars.push(CONTINUATION_MARKER);
    }
}

impl From<&str> for SourceLine {
    fn from(line: &str) -> Self {
        Self {
            chars: line.chars().collect(),
        }
    }
}

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|ch| fmt::Write::write_char(f, *ch))
    }
}
