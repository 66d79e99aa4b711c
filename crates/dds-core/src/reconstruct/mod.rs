//! Line/range reconstruction: the inverse of the parser.
//!
//! Every operation reads the current line(s) from a [`DdsDocument`], computes new column values
//! through [`crate::schema::SourceLine`], and returns an [`EditSet`] of character-range
//! replacements against that same snapshot. Nothing here mutates a document; the host applies
//! the edits (or [`DdsDocument::apply`] does in tests) and reparses.
//!
//! Operations do not re-check business rules such as name uniqueness or overlap; they only
//! refuse structurally impossible requests (lines outside the document, values wider than their
//! column) with a [`ReconstructError`].

mod blocks;
mod columns;
mod keywords;

pub use blocks::{
    NewField, copy_constant, copy_field, copy_record, delete_block, delete_entity,
    insert_block_after, new_constant_lines, new_field_lines, new_record_lines, position_order,
    render_entities, set_constant_text, sort_by_position, sort_elements,
};
pub use columns::{
    center_constant, centered_column, rename, reposition, resize, set_attribute_indicators,
    set_line_indicators, set_reference, set_type, set_usage,
};
pub use keywords::{
    Chunk, ContinuationSplitter, SplitState, add_keyword, remove_keywords, render_keyword_lines,
    replace_keyword, set_file_keyword,
};

use crate::document::DdsDocument;
use crate::edit::{EditError, TextEdit};
use crate::model::{Attribute, Constant, DdsFile, Field, Record};
use std::collections::BTreeSet;

/// Reasons a reconstruction request is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructError {
    /// A line index past the end of the document.
    #[error("line {line} is outside the document ({line_count} lines)")]
    LineOutOfBounds {
        /// Requested line.
        line: usize,
        /// Lines in the document.
        line_count: usize,
    },
    /// A line range whose end lies before its start.
    #[error("line range {start}..={end} is invalid")]
    InvalidLineRange {
        /// First line.
        start: usize,
        /// Last line.
        end: usize,
    },
    /// A value wider than the column it is written to.
    #[error("'{value}' does not fit the {column} column ({width} characters)")]
    TooWide {
        /// Column name.
        column: &'static str,
        /// Offending value.
        value: String,
        /// Column width.
        width: usize,
    },
    /// More indicators than one line can hold.
    #[error("a keyword line holds at most three indicators, got {0}")]
    TooManyIndicators(usize),
    /// Empty keyword text.
    #[error("keyword text is empty")]
    EmptyKeyword,
    /// The keyword shares its line with an element definition.
    #[error("the keyword on line {line} shares the line with its element definition")]
    InlineKeyword {
        /// Line of the keyword.
        line: usize,
    },
    /// An empty removal request.
    #[error("nothing to remove")]
    NothingToRemove,
    /// A sort order that is not a permutation of the record's elements.
    #[error("sort order does not match the elements of record {0}")]
    InvalidOrder(String),
    /// The computed edits conflict.
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Where new lines go relative to an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Insert after the line.
    After(usize),
    /// Insert before the line.
    Before(usize),
}

/// An entity that carries keywords.
pub trait KeywordOwner {
    /// Line that can carry keywords inline (the definition line), if any.
    fn definition_line(&self) -> Option<usize>;
    /// Where new standalone keyword lines are inserted.
    fn anchor(&self) -> Anchor;
    /// Keywords attached so far.
    fn attributes(&self) -> &[Attribute];
}

impl KeywordOwner for Field {
    fn definition_line(&self) -> Option<usize> {
        Some(self.line_index)
    }

    fn anchor(&self) -> Anchor {
        Anchor::After(self.last_line_index)
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl KeywordOwner for Constant {
    fn definition_line(&self) -> Option<usize> {
        Some(self.line_index)
    }

    fn anchor(&self) -> Anchor {
        Anchor::After(self.last_line_index)
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl KeywordOwner for Record {
    fn definition_line(&self) -> Option<usize> {
        Some(self.start_index)
    }

    fn anchor(&self) -> Anchor {
        Anchor::After(self.header_last_index)
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

impl KeywordOwner for DdsFile {
    fn definition_line(&self) -> Option<usize> {
        None
    }

    fn anchor(&self) -> Anchor {
        if let Some(last) = self.attributes.last() {
            return Anchor::After(last.last_line_index);
        }
        match self.records.first() {
            Some(record) => Anchor::Before(record.start_index),
            None => Anchor::After(self.line_count.saturating_sub(1)),
        }
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

pub(crate) fn check_line(document: &DdsDocument, line: usize) -> Result<(), ReconstructError> {
    if line < document.line_count() {
        Ok(())
    } else {
        Err(ReconstructError::LineOutOfBounds {
            line,
            line_count: document.line_count(),
        })
    }
}

pub(crate) fn line_text(document: &DdsDocument, line: usize) -> Result<String, ReconstructError> {
    document
        .line(line)
        .ok_or(ReconstructError::LineOutOfBounds {
            line,
            line_count: document.line_count(),
        })
}

fn check_span(document: &DdsDocument, start: usize, end: usize) -> Result<(), ReconstructError> {
    if start > end {
        return Err(ReconstructError::InvalidLineRange { start, end });
    }
    check_line(document, end)
}

/// Replace the content of one line, keeping its line break.
pub(crate) fn replace_line(
    document: &DdsDocument,
    line: usize,
    new_text: &str,
) -> Result<TextEdit, ReconstructError> {
    replace_lines(document, line, line, &[new_text.to_string()])
}

/// Replace the content of lines `start..=end` with `lines`, keeping the final line break.
pub(crate) fn replace_lines(
    document: &DdsDocument,
    start: usize,
    end: usize,
    lines: &[String],
) -> Result<TextEdit, ReconstructError> {
    check_span(document, start, end)?;
    let from = document.line_start(start).unwrap_or_default();
    let to = document.line_end(end).unwrap_or(from);
    Ok(TextEdit::replace(
        from..to,
        lines.join(document.line_ending().as_str()),
    ))
}

/// Insert whole lines at an anchor.
pub(crate) fn insert_lines(
    document: &DdsDocument,
    anchor: Anchor,
    lines: &[String],
) -> Result<TextEdit, ReconstructError> {
    let newline = document.line_ending().as_str();
    let block = lines.join(newline);
    match anchor {
        Anchor::After(line) => {
            check_line(document, line)?;
            let offset = document.line_end(line).unwrap_or_default();
            Ok(TextEdit::insert(offset, format!("{newline}{block}")))
        }
        Anchor::Before(line) => {
            check_line(document, line)?;
            let offset = document.line_start(line).unwrap_or_default();
            Ok(TextEdit::insert(offset, format!("{block}{newline}")))
        }
    }
}

/// Delete lines `start..=end` together with exactly one line break.
///
/// A span in the middle of the document takes its own trailing break. A span that ends on the
/// last line takes the break *before* it instead, so no dangling empty line is left behind; a
/// span covering the whole document empties it.
pub(crate) fn delete_lines(
    document: &DdsDocument,
    start: usize,
    end: usize,
) -> Result<TextEdit, ReconstructError> {
    check_span(document, start, end)?;
    let range = if let Some(next) = document.line_start(end + 1) {
        document.line_start(start).unwrap_or_default()..next
    } else if start == 0 {
        0..document.char_count()
    } else {
        document.line_end(start - 1).unwrap_or_default()..document.char_count()
    };
    Ok(TextEdit::delete(range))
}

/// Group line indices into contiguous inclusive runs.
pub fn line_runs(lines: impl IntoIterator<Item = usize>) -> Vec<(usize, usize)> {
    let sorted: BTreeSet<usize> = lines.into_iter().collect();
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for line in sorted {
        match runs.last_mut() {
            Some((_, end)) if *end + 1 == line => *end = line,
            _ => runs.push((line, line)),
        }
    }
    runs
}

/// One deletion edit per contiguous run of lines.
pub(crate) fn delete_line_runs(
    document: &DdsDocument,
    lines: impl IntoIterator<Item = usize>,
) -> Result<Vec<TextEdit>, ReconstructError> {
    line_runs(lines)
        .into_iter()
        .map(|(start, end)| delete_lines(document, start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditSet;

    fn apply(document: &DdsDocument, edit: TextEdit) -> String {
        document.apply(&EditSet::single(edit)).unwrap().text()
    }

    #[test]
    fn test_line_runs() {
        assert_eq!(line_runs([7, 3, 4, 5, 9, 8]), vec![(3, 5), (7, 9)]);
        assert_eq!(line_runs(Vec::new()), Vec::<(usize, usize)>::new());
    }

    #[test]
    fn test_delete_middle_lines_keeps_neighbours() {
        let doc = DdsDocument::new("a\nb\nc\nd");
        assert_eq!(apply(&doc, delete_lines(&doc, 1, 2).unwrap()), "a\nd");
    }

    #[test]
    fn test_delete_last_lines_takes_previous_break() {
        let doc = DdsDocument::new("a\nb\nc");
        assert_eq!(apply(&doc, delete_lines(&doc, 1, 2).unwrap()), "a");
    }

    #[test]
    fn test_delete_whole_document() {
        let doc = DdsDocument::new("a\nb\nc");
        assert_eq!(apply(&doc, delete_lines(&doc, 0, 2).unwrap()), "");
    }

    #[test]
    fn test_delete_keeps_trailing_newline() {
        let doc = DdsDocument::new("a\nb\n");
        assert_eq!(apply(&doc, delete_lines(&doc, 1, 1).unwrap()), "a\n");
    }

    #[test]
    fn test_delete_out_of_bounds() {
        let doc = DdsDocument::new("a\nb");
        assert_eq!(
            delete_lines(&doc, 1, 5),
            Err(ReconstructError::LineOutOfBounds {
                line: 5,
                line_count: 2
            })
        );
        assert_eq!(
            delete_lines(&doc, 1, 0),
            Err(ReconstructError::InvalidLineRange { start: 1, end: 0 })
        );
    }

    #[test]
    fn test_insert_lines_crlf() {
        let doc = DdsDocument::new("a\r\nb");
        let edit = insert_lines(&doc, Anchor::After(0), &["x".to_string()]).unwrap();
        assert_eq!(apply(&doc, edit), "a\r\nx\r\nb");
        let edit = insert_lines(&doc, Anchor::Before(0), &["y".to_string()]).unwrap();
        assert_eq!(apply(&doc, edit), "y\r\na\r\nb");
    }
}
