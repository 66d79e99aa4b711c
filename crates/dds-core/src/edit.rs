//! Range-based text edits.
//!
//! Edits are expressed in **character offsets** (Unicode scalar values) against one document
//! snapshot. An [`EditSet`] holds non-overlapping edits and is applied in descending start
//! order, so every offset stays valid while earlier parts of the document are still untouched.

use std::ops::Range;

/// Replace `range` (half-open, char offsets) with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Replaced range in the pre-edit document.
    pub range: Range<usize>,
    /// Replacement text (may be empty, may contain line breaks).
    pub new_text: String,
}

impl TextEdit {
    /// Replace a range.
    pub fn replace(range: Range<usize>, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    /// Insert text at an offset.
    pub fn insert(offset: usize, new_text: impl Into<String>) -> Self {
        Self::replace(offset..offset, new_text)
    }

    /// Delete a range.
    pub fn delete(range: Range<usize>) -> Self {
        Self::replace(range, String::new())
    }

    /// Returns `true` for pure insertions.
    pub fn is_insert(&self) -> bool {
        self.range.is_empty()
    }
}

/// Errors raised while building or applying an [`EditSet`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    /// Two edits touch the same characters.
    #[error("edits overlap: {first:?} and {second:?}")]
    Overlap {
        /// Range of the earlier edit.
        first: Range<usize>,
        /// Range of the later edit.
        second: Range<usize>,
    },
    /// An edit reaches past the end of the document.
    #[error("edit range {range:?} is outside the document (length {len})")]
    OutOfBounds {
        /// Offending range.
        range: Range<usize>,
        /// Document length in characters.
        len: usize,
    },
    /// A range whose end lies before its start.
    #[error("inverted edit range {0:?}")]
    Inverted(Range<usize>),
}

/// An ordered set of non-overlapping edits applied atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one edit.
    pub fn single(edit: TextEdit) -> Self {
        Self { edits: vec![edit] }
    }

    /// Build a set from edits, rejecting overlaps.
    pub fn from_edits(edits: impl IntoIterator<Item = TextEdit>) -> Result<Self, EditError> {
        let mut set = Self::new();
        for edit in edits {
            set.push(edit)?;
        }
        Ok(set)
    }

    /// Add an edit. Touching ranges are fine; only pure insertions may share a start offset, and
    /// those keep push order.
    pub fn push(&mut self, edit: TextEdit) -> Result<(), EditError> {
        if edit.range.start > edit.range.end {
            return Err(EditError::Inverted(edit.range));
        }
        let at = self
            .edits
            .partition_point(|existing| existing.range.start <= edit.range.start);
        let overlaps = |a: &Range<usize>, b: &Range<usize>| a.start < b.end && b.start < a.end;
        if let Some(prev) = at.checked_sub(1).map(|i| &self.edits[i])
            && (overlaps(&prev.range, &edit.range)
                || (prev.range.start == edit.range.start && !(prev.is_insert() && edit.is_insert())))
        {
            return Err(EditError::Overlap {
                first: prev.range.clone(),
                second: edit.range,
            });
        }
        if let Some(next) = self.edits.get(at)
            && overlaps(&edit.range, &next.range)
        {
            return Err(EditError::Overlap {
                first: edit.range,
                second: next.range.clone(),
            });
        }
        self.edits.insert(at, edit);
        Ok(())
    }

    /// Merge another set into this one.
    pub fn extend(&mut self, other: EditSet) -> Result<(), EditError> {
        for edit in other.edits {
            self.push(edit)?;
        }
        Ok(())
    }

    /// Edits in ascending start order.
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Edits in the order they must be applied (descending start).
    pub fn application_order(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter().rev()
    }

    /// Number of edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns `true` if the set holds no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Check every edit against a document length.
    pub fn check_bounds(&self, len: usize) -> Result<(), EditError> {
        match self.edits.iter().find(|edit| edit.range.end > len) {
            Some(edit) => Err(EditError::OutOfBounds {
                range: edit.range.clone(),
                len,
            }),
            None => Ok(()),
        }
    }
}

impl IntoIterator for EditSet {
    type Item = TextEdit;
    type IntoIter = std::vec::IntoIter<TextEdit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.into_iter()
    }
}

impl<'a> IntoIterator for &'a EditSet {
    type Item = &'a TextEdit;
    type IntoIter = std::slice::Iter<'a, TextEdit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_ascending_order() {
        let set = EditSet::from_edits([
            TextEdit::delete(10..12),
            TextEdit::insert(0, "a"),
            TextEdit::replace(4..6, "x"),
        ])
        .unwrap();
        let starts: Vec<usize> = set.edits().iter().map(|e| e.range.start).collect();
        assert_eq!(starts, vec![0, 4, 10]);
        let applied: Vec<usize> = set.application_order().map(|e| e.range.start).collect();
        assert_eq!(applied, vec![10, 4, 0]);
    }

    #[test]
    fn test_touching_ranges_are_allowed() {
        let set = EditSet::from_edits([TextEdit::replace(0..5, "x"), TextEdit::delete(5..9)]);
        assert!(set.is_ok());
    }

    #[test]
    fn test_overlap_rejected() {
        let err = EditSet::from_edits([TextEdit::delete(0..5), TextEdit::delete(4..9)]).unwrap_err();
        assert_eq!(
            err,
            EditError::Overlap {
                first: 0..5,
                second: 4..9
            }
        );
        assert!(EditSet::from_edits([TextEdit::delete(3..5), TextEdit::insert(3, "a")]).is_err());
    }

    #[test]
    fn test_inverted_and_bounds() {
        let mut set = EditSet::new();
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = TextEdit::delete(5..2);
        assert_eq!(set.push(inverted), Err(EditError::Inverted(5..2)));
        set.push(TextEdit::delete(2..8)).unwrap();
        assert!(set.check_bounds(8).is_ok());
        assert!(set.check_bounds(7).is_err());
    }
}
