//! LSP Sync Layer
//!
//! UTF-16 coordinate conversion against a [`DdsDocument`], and `textDocument/didChange`
//! handling for the active [`DocumentSession`].

use dds_core::{DdsDocument, DocumentSession, EditError, EditSet, ModelCache, TextEdit};
use serde_json::{Value, json};
use std::ops::Range;
use std::time::Instant;

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// LSP Position (based on UTF-16 code units)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LspPosition {
    /// Line number (0-based)
    pub line: u32,
    /// Character offset (UTF-16 code units, 0-based)
    pub character: u32,
}

impl LspPosition {
    /// Create a new LSP position (UTF-16 based).
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Parse a `Position`-shaped JSON value.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            line: u32::try_from(value.get("line")?.as_u64()?).ok()?,
            character: u32::try_from(value.get("character")?.as_u64()?).ok()?,
        })
    }

    /// Render as a `Position` JSON value.
    pub fn to_value(self) -> Value {
        json!({ "line": self.line, "character": self.character })
    }
}

/// LSP Range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LspRange {
    /// Range start position (inclusive).
    pub start: LspPosition,
    /// Range end position (exclusive).
    pub end: LspPosition,
}

impl LspRange {
    /// Create a new LSP range.
    pub fn new(start: LspPosition, end: LspPosition) -> Self {
        Self { start, end }
    }

    /// Parse a `Range`-shaped JSON value.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            start: LspPosition::from_value(value.get("start")?)?,
            end: LspPosition::from_value(value.get("end")?)?,
        })
    }

    /// Render as a `Range` JSON value.
    pub fn to_value(self) -> Value {
        json!({ "start": self.start.to_value(), "end": self.end.to_value() })
    }
}

/// LSP coordinate converter
///
/// Handles conversions between char offsets into a [`DdsDocument`] and LSP positions (UTF-16).
pub struct LspCoordinateConverter;

impl LspCoordinateConverter {
    /// Convert character offset to UTF-16 code unit offset
    pub fn char_offset_to_utf16(text: &str, char_offset: usize) -> usize {
        text.chars().take(char_offset).map(char::len_utf16).sum()
    }

    /// Convert UTF-16 code unit offset to character offset
    pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
        let mut current_utf16 = 0;
        let mut char_count = 0;
        for ch in text.chars() {
            if current_utf16 >= utf16_offset {
                break;
            }
            current_utf16 += ch.len_utf16();
            char_count += 1;
        }
        char_count
    }

    /// LSP position of a char offset into `document`.
    pub fn position(document: &DdsDocument, offset: usize) -> LspPosition {
        let (line, column) = document.char_to_position(offset);
        let text = document.line(line).unwrap_or_default();
        LspPosition::new(to_u32(line), to_u32(Self::char_offset_to_utf16(&text, column)))
    }

    /// LSP range of a char range.
    pub fn range(document: &DdsDocument, range: &Range<usize>) -> LspRange {
        LspRange::new(
            Self::position(document, range.start),
            Self::position(document, range.end),
        )
    }

    /// LSP range of `start..end` columns on one line.
    pub fn line_range(document: &DdsDocument, line: usize, start: usize, end: usize) -> LspRange {
        let text = document.line(line).unwrap_or_default();
        let at = |column| {
            LspPosition::new(
                to_u32(line),
                to_u32(Self::char_offset_to_utf16(&text, column)),
            )
        };
        LspRange::new(at(start), at(end))
    }

    /// Char offset of an LSP position.
    ///
    /// Characters past the end of a line clamp to the line end; lines past the end of the
    /// document clamp to the document end.
    pub fn char_offset(document: &DdsDocument, position: LspPosition) -> usize {
        let line = position.line as usize;
        let Some(text) = document.line(line) else {
            return document.char_count();
        };
        let column = Self::utf16_to_char_offset(&text, position.character as usize);
        document
            .position_to_char(line, column)
            .unwrap_or_else(|| document.char_count())
    }

    /// Char range of an LSP range, normalised so that start <= end.
    pub fn char_range(document: &DdsDocument, range: &LspRange) -> Range<usize> {
        let start = Self::char_offset(document, range.start);
        let end = Self::char_offset(document, range.end);
        start.min(end)..start.max(end)
    }
}

/// Apply a `textDocument/didChange` `contentChanges` array to `session`.
///
/// Ranged changes are resolved against the text as it stands after the previous change; a
/// change without a range replaces the whole text. Each change schedules a reparse through the
/// session's debouncer.
pub fn apply_content_changes(
    session: &mut DocumentSession,
    changes: &Value,
    cache: &mut ModelCache,
    now: Instant,
) -> Result<(), EditError> {
    let Some(changes) = changes.as_array() else {
        return Ok(());
    };
    for change in changes {
        let text = change.get("text").and_then(Value::as_str).unwrap_or("");
        match change.get("range").and_then(LspRange::from_value) {
            Some(range) => {
                let range = LspCoordinateConverter::char_range(session.document(), &range);
                session.apply(&EditSet::single(TextEdit::replace(range, text)), cache, now)?;
            }
            None => session.replace_text(text, cache, now),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_conversion() {
        let text = "a👋b";
        assert_eq!(LspCoordinateConverter::char_offset_to_utf16(text, 2), 3);
        assert_eq!(LspCoordinateConverter::utf16_to_char_offset(text, 3), 2);
        assert_eq!(LspCoordinateConverter::utf16_to_char_offset(text, 10), 3);
    }

    #[test]
    fn test_document_positions() {
        let doc = DdsDocument::new("     A  'Año'\r\n     A  '👋'");
        let start = doc.line_start(1).unwrap();
        assert_eq!(
            LspCoordinateConverter::position(&doc, start + 10),
            LspPosition::new(1, 11)
        );
        assert_eq!(
            LspCoordinateConverter::char_offset(&doc, LspPosition::new(1, 11)),
            start + 10
        );
        assert_eq!(
            LspCoordinateConverter::char_offset(&doc, LspPosition::new(0, 99)),
            doc.line_end(0).unwrap()
        );
        assert_eq!(
            LspCoordinateConverter::char_offset(&doc, LspPosition::new(5, 0)),
            doc.char_count()
        );
    }
}
