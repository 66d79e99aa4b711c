//! Line classifier.
//!
//! [`classify`] looks at one physical source line and decides what it defines, using only
//! column predicates from [`crate::schema`]. It is total: every string maps to a [`LineKind`].
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. blank
//! 2. comment (`*` in column 7, or the line starts with `A*`)
//! 3. record header (`R` in column 17)
//! 4. help specification (`H` in column 17)
//! 5. field (non-blank name)
//! 6. constant (blank name with a row/column, or a quote opening the keyword area)
//! 7. attribute (non-blank keyword area or indicator slots)
//! 8. other

use crate::schema::{self, COL, CONDITION, FORM_TYPE, INDICATORS, KEYWORDS, NAME, NAME_TYPE, ROW};
use serde::Serialize;

/// What a single physical line defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineKind {
    /// Empty or whitespace only.
    Blank,
    /// Comment line.
    Comment,
    /// Record format header.
    Record,
    /// Help specification (record-level).
    Help,
    /// Field definition.
    Field,
    /// Constant definition.
    Constant,
    /// Keyword or indicator line without a name.
    Attribute,
    /// Anything else (e.g. non-DDS form types).
    Other,
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with("A*") || schema::read_flag(line, CONDITION) == Some('*')
}

fn has_form_type(line: &str) -> bool {
    matches!(
        schema::read_flag(line, FORM_TYPE),
        None | Some('A' | 'a')
    )
}

/// Classify one source line.
pub fn classify(line: &str) -> LineKind {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if is_comment(line) {
        return LineKind::Comment;
    }
    if !has_form_type(line) {
        return LineKind::Other;
    }
    match schema::read_flag(line, NAME_TYPE).map(|c| c.to_ascii_uppercase()) {
        Some('R') => return LineKind::Record,
        Some('H') => return LineKind::Help,
        _ => {}
    }
    if !schema::is_blank(line, NAME) {
        return LineKind::Field;
    }
    let positioned = !schema::is_blank(line, ROW) || !schema::is_blank(line, COL);
    if positioned || schema::read(line, KEYWORDS).starts_with('\'') {
        return LineKind::Constant;
    }
    if !schema::is_blank(line, KEYWORDS) || !schema::is_blank(line, INDICATORS) {
        return LineKind::Attribute;
    }
    LineKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("      "), LineKind::Blank);
        assert_eq!(classify("     A* Customer inquiry"), LineKind::Comment);
        assert_eq!(classify("A*          R NOTREC"), LineKind::Comment);
        assert_eq!(classify("00010A*"), LineKind::Comment);
    }

    #[test]
    fn test_record_wins_over_name() {
        assert_eq!(classify("     A          R CUSREC"), LineKind::Record);
        assert_eq!(
            classify("     A          R CUSREC                    SFL"),
            LineKind::Record
        );
        assert_eq!(classify("     A          H"), LineKind::Help);
    }

    #[test]
    fn test_field_and_constant() {
        assert_eq!(
            classify("     A            CUSNAM        20A  B  5 10"),
            LineKind::Field
        );
        assert_eq!(
            classify("     A            HIDFLD         5S 0H"),
            LineKind::Field
        );
        assert_eq!(
            classify("     A                                  1  2'Customer'"),
            LineKind::Constant
        );
        assert_eq!(
            classify("     A                                  1 70DATE"),
            LineKind::Constant
        );
    }

    #[test]
    fn test_attribute_lines() {
        assert_eq!(
            classify("     A                                      COLOR(BLU)"),
            LineKind::Attribute
        );
        assert_eq!(
            classify("     A  03N41"),
            LineKind::Attribute
        );
    }

    #[test]
    fn test_other() {
        assert_eq!(classify("     R garbage"), LineKind::Other);
        assert_eq!(classify("     A"), LineKind::Other);
    }
}
