//! Single-line column rewrites: name, position, length, type, usage, indicators.

use super::{ReconstructError, delete_line_runs, line_text, replace_line};
use crate::document::DdsDocument;
use crate::edit::EditSet;
use crate::model::{Attribute, AttributeSpan, Constant, FieldType, Indicator, ScreenPosition, ScreenSize, Usage};
use crate::schema::{self, Align, Column, SourceLine};

/// Maximum number of indicators a single line can hold.
pub(crate) const INDICATORS_PER_LINE: usize = 3;

fn rewrite(
    document: &DdsDocument,
    line: usize,
    update: impl FnOnce(&mut SourceLine),
) -> Result<EditSet, ReconstructError> {
    let mut source = SourceLine::from(line_text(document, line)?.as_str());
    update(&mut source);
    Ok(EditSet::single(replace_line(document, line, &source.to_string())?))
}

pub(crate) fn check_width(
    column_name: &'static str,
    column: Column,
    value: &str,
) -> Result<(), ReconstructError> {
    if value.chars().count() > column.width() {
        return Err(ReconstructError::TooWide {
            column: column_name,
            value: value.to_string(),
            width: column.width(),
        });
    }
    Ok(())
}

pub(crate) fn check_number(column_name: &'static str, column: Column, value: u32) -> Result<(), ReconstructError> {
    check_width(column_name, column, &value.to_string())
}

/// Write a new name into the name column of a record or field line.
///
/// The name is left aligned and padded to the full ten characters, so everything from the
/// reference column on keeps its position.
pub fn rename(document: &DdsDocument, line: usize, name: &str) -> Result<EditSet, ReconstructError> {
    check_width("name", schema::NAME, name)?;
    rewrite(document, line, |source| source.write(schema::NAME, name, Align::Left))
}

/// Rewrite the row and column of a field or constant line.
pub fn reposition(
    document: &DdsDocument,
    line: usize,
    position: ScreenPosition,
) -> Result<EditSet, ReconstructError> {
    check_number("row", schema::ROW, position.row)?;
    check_number("column", schema::COL, position.column)?;
    rewrite(document, line, |source| {
        source.write_number(schema::ROW, Some(position.row));
        source.write_number(schema::COL, Some(position.column));
    })
}

/// Rewrite the length and decimal positions of a field line. `None` blanks the column.
pub fn resize(
    document: &DdsDocument,
    line: usize,
    length: Option<u32>,
    decimals: Option<u8>,
) -> Result<EditSet, ReconstructError> {
    if let Some(length) = length {
        check_number("length", schema::LENGTH, length)?;
    }
    if let Some(decimals) = decimals {
        check_number("decimals", schema::DECIMALS, u32::from(decimals))?;
    }
    rewrite(document, line, |source| {
        source.write_number(schema::LENGTH, length);
        source.write_number(schema::DECIMALS, decimals.map(u32::from));
    })
}

/// Rewrite the data type of a field line.
///
/// Types with a system-defined length get a blank length column; types without decimal
/// positions get a blank decimals column.
pub fn set_type(
    document: &DdsDocument,
    line: usize,
    data_type: FieldType,
) -> Result<EditSet, ReconstructError> {
    rewrite(document, line, |source| {
        source.write_flag(schema::DATA_TYPE, Some(data_type.code()));
        if !data_type.has_length() {
            source.write_number(schema::LENGTH, None);
        }
        if !data_type.has_decimals() {
            source.write_number(schema::DECIMALS, None);
        }
    })
}

/// Rewrite the usage column of a field line. Unpositioned usages blank the row and column.
pub fn set_usage(document: &DdsDocument, line: usize, usage: Usage) -> Result<EditSet, ReconstructError> {
    rewrite(document, line, |source| {
        source.write_flag(schema::USAGE, Some(usage.code()));
        if !usage.is_positioned() {
            source.write_number(schema::ROW, None);
            source.write_number(schema::COL, None);
        }
    })
}

/// Set or clear the reference flag (`R` in column 29) of a field line.
pub fn set_reference(
    document: &DdsDocument,
    line: usize,
    referenced: bool,
) -> Result<EditSet, ReconstructError> {
    rewrite(document, line, |source| {
        source.write_flag(schema::REFERENCE, referenced.then_some('R'));
    })
}

/// Rewrite the three indicator slots of one line (a field, constant or record definition).
pub fn set_line_indicators(
    document: &DdsDocument,
    line: usize,
    indicators: &[Indicator],
) -> Result<EditSet, ReconstructError> {
    if indicators.len() > INDICATORS_PER_LINE {
        return Err(ReconstructError::TooManyIndicators(indicators.len()));
    }
    rewrite(document, line, |source| source.write_indicators(indicators))
}

/// Replace the conditioning indicators of a standalone keyword.
///
/// The indicators are written on the keyword line; leading indicator-only lines of the
/// attribute are deleted. Inline keywords share their indicators with the element definition
/// and are refused.
pub fn set_attribute_indicators(
    document: &DdsDocument,
    attribute: &Attribute,
    indicators: &[Indicator],
) -> Result<EditSet, ReconstructError> {
    if let AttributeSpan::Inline { .. } = attribute.span {
        return Err(ReconstructError::InlineKeyword {
            line: attribute.keyword_line,
        });
    }
    let mut edits = set_line_indicators(document, attribute.keyword_line, indicators)?;
    for edit in delete_line_runs(document, attribute.line_index..attribute.keyword_line)? {
        edits.push(edit)?;
    }
    Ok(edits)
}

/// Move a constant so that it is centred horizontally on `screen`.
///
/// The row is kept; constants without a position are placed on row 1.
pub fn center_constant(
    document: &DdsDocument,
    constant: &Constant,
    screen: ScreenSize,
) -> Result<EditSet, ReconstructError> {
    let row = constant.position.map_or(1, |p| p.row);
    let column = centered_column(constant.length, screen.columns);
    reposition(document, constant.line_index, ScreenPosition::new(row, column))
}

/// Column at which text of `width` characters is centred on a screen `columns` wide.
pub fn centered_column(width: u32, columns: u32) -> u32 {
    (columns.saturating_sub(width) / 2).max(1) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: &str = "     A            CUSNAM        20A  B  5 10COLOR(BLU)";

    fn applied(text: &str, edits: Result<EditSet, ReconstructError>) -> String {
        DdsDocument::new(text).apply(&edits.unwrap()).unwrap().text()
    }

    #[test]
    fn test_rename_pads_to_column_width() {
        let doc = DdsDocument::new(FIELD);
        let out = applied(FIELD, rename(&doc, 0, "NAME"));
        assert_eq!(out, "     A            NAME          20A  B  5 10COLOR(BLU)");
        assert_eq!(out.chars().count(), FIELD.chars().count());
    }

    #[test]
    fn test_rename_rejects_long_names() {
        let doc = DdsDocument::new(FIELD);
        assert!(matches!(
            rename(&doc, 0, "ABCDEFGHIJK"),
            Err(ReconstructError::TooWide { width: 10, .. })
        ));
    }

    #[test]
    fn test_reposition_right_aligns() {
        let doc = DdsDocument::new(FIELD);
        let out = applied(FIELD, reposition(&doc, 0, ScreenPosition::new(12, 3)));
        assert_eq!(out, "     A            CUSNAM        20A  B 12  3COLOR(BLU)");
    }

    #[test]
    fn test_set_type_clears_length_for_dates() {
        let doc = DdsDocument::new(FIELD);
        let out = applied(FIELD, set_type(&doc, 0, FieldType::Date));
        assert_eq!(out, "     A            CUSNAM          L  B  5 10COLOR(BLU)");
    }

    #[test]
    fn test_set_usage_hidden_drops_position() {
        let doc = DdsDocument::new(FIELD);
        let out = applied(FIELD, set_usage(&doc, 0, Usage::Hidden));
        assert_eq!(out, "     A            CUSNAM        20A  H      COLOR(BLU)");
    }

    #[test]
    fn test_set_line_indicators_limit() {
        let doc = DdsDocument::new(FIELD);
        let four = [1, 2, 3, 4].map(Indicator::on);
        assert_eq!(
            set_line_indicators(&doc, 0, &four),
            Err(ReconstructError::TooManyIndicators(4))
        );
        let out = applied(FIELD, set_line_indicators(&doc, 0, &[Indicator::off(41)]));
        assert_eq!(out, "     A N41        CUSNAM        20A  B  5 10COLOR(BLU)");
    }

    #[test]
    fn test_centered_column() {
        assert_eq!(centered_column(20, 80), 31);
        assert_eq!(centered_column(80, 80), 2);
        assert_eq!(centered_column(9, 132), 62);
    }
}
