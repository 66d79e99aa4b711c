//! Whole-block operations: new entities, copies, deletion and sorting.

use super::columns::{INDICATORS_PER_LINE, check_number, check_width};
use super::keywords::{remove_keywords, render_continued, render_keyword_lines};
use super::{
    Anchor, ReconstructError, check_line, delete_lines, insert_lines, line_text, replace_lines,
};
use crate::document::DdsDocument;
use crate::edit::EditSet;
use crate::model::{
    Constant, DdsFile, DdsNode, Field, FieldType, Indicator, Record, ScreenPosition, Usage,
    quote_literal,
};
use crate::schema::{self, Align, SourceLine};

/// Column values for a new field definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewField {
    /// Field name.
    pub name: String,
    /// Data type.
    pub data_type: FieldType,
    /// Length; ignored for types with a system-defined length.
    pub length: Option<u32>,
    /// Decimal positions; ignored for types without decimals.
    pub decimals: Option<u8>,
    /// Usage.
    pub usage: Usage,
    /// Screen position; ignored for unpositioned usages.
    pub position: Option<ScreenPosition>,
    /// Write the reference flag.
    pub referenced: bool,
    /// Option indicators on the definition line (at most three).
    pub indicators: Vec<Indicator>,
    /// Keywords, each rendered on its own line.
    pub keywords: Vec<String>,
}

impl NewField {
    /// A both-usage field with no length, position or keywords.
    pub fn new(name: impl Into<String>, data_type: FieldType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: None,
            decimals: None,
            usage: Usage::Both,
            position: None,
            referenced: false,
            indicators: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

fn check_indicators(indicators: &[Indicator]) -> Result<(), ReconstructError> {
    if indicators.len() > INDICATORS_PER_LINE {
        return Err(ReconstructError::TooManyIndicators(indicators.len()));
    }
    Ok(())
}

fn write_position(
    line: &mut SourceLine,
    position: ScreenPosition,
) -> Result<(), ReconstructError> {
    check_number("row", schema::ROW, position.row)?;
    check_number("column", schema::COL, position.column)?;
    line.write_number(schema::ROW, Some(position.row));
    line.write_number(schema::COL, Some(position.column));
    Ok(())
}

fn keyword_lines(keywords: &[String]) -> Result<Vec<String>, ReconstructError> {
    let mut lines = Vec::new();
    for keyword in keywords {
        lines.extend(render_keyword_lines(keyword, &[])?);
    }
    Ok(lines)
}

fn block_lines(
    document: &DdsDocument,
    start: usize,
    end: usize,
) -> Result<Vec<String>, ReconstructError> {
    if start > end {
        return Err(ReconstructError::InvalidLineRange { start, end });
    }
    (start..=end).map(|line| line_text(document, line)).collect()
}

/// Render the lines of a new field.
pub fn new_field_lines(field: &NewField) -> Result<Vec<String>, ReconstructError> {
    check_width("name", schema::NAME, &field.name)?;
    check_indicators(&field.indicators)?;
    let mut line = SourceLine::spec();
    line.write_indicators(&field.indicators);
    line.write(schema::NAME, &field.name, Align::Left);
    if field.referenced {
        line.write_flag(schema::REFERENCE, Some('R'));
    }
    if field.data_type.has_length()
        && let Some(length) = field.length
    {
        check_number("length", schema::LENGTH, length)?;
        line.write_number(schema::LENGTH, Some(length));
    }
    line.write_flag(schema::DATA_TYPE, Some(field.data_type.code()));
    if field.data_type.has_decimals()
        && let Some(decimals) = field.decimals
    {
        check_number("decimals", schema::DECIMALS, u32::from(decimals))?;
        line.write_number(schema::DECIMALS, Some(u32::from(decimals)));
    }
    line.write_flag(schema::USAGE, Some(field.usage.code()));
    if field.usage.is_positioned()
        && let Some(position) = field.position
    {
        write_position(&mut line, position)?;
    }
    let mut lines = vec![line.to_string()];
    lines.extend(keyword_lines(&field.keywords)?);
    Ok(lines)
}

/// Render the lines of a new constant.
///
/// `literal` is written as is: a quoted literal (see [`quote_literal`]) or a constant keyword
/// such as `DATE`. Literals longer than the keyword area continue on following lines.
pub fn new_constant_lines(
    literal: &str,
    position: ScreenPosition,
    indicators: &[Indicator],
    keywords: &[String],
) -> Result<Vec<String>, ReconstructError> {
    check_indicators(indicators)?;
    let mut first = SourceLine::spec();
    first.write_indicators(indicators);
    write_position(&mut first, position)?;
    let mut lines = render_continued(first, literal);
    lines.extend(keyword_lines(keywords)?);
    Ok(lines)
}

/// Render the lines of a new record format.
pub fn new_record_lines(name: &str, keywords: &[String]) -> Result<Vec<String>, ReconstructError> {
    check_width("name", schema::NAME, name)?;
    let mut line = SourceLine::spec();
    line.write_flag(schema::NAME_TYPE, Some('R'));
    line.write(schema::NAME, name, Align::Left);
    let mut lines = vec![line.to_string()];
    lines.extend(keyword_lines(keywords)?);
    Ok(lines)
}

/// Insert rendered lines at an anchor.
pub fn insert_block_after(
    document: &DdsDocument,
    anchor: Anchor,
    lines: &[String],
) -> Result<EditSet, ReconstructError> {
    Ok(EditSet::single(insert_lines(document, anchor, lines)?))
}

/// Delete lines `start..=end` with the same offset rules as keyword removal.
pub fn delete_block(
    document: &DdsDocument,
    start: usize,
    end: usize,
) -> Result<EditSet, ReconstructError> {
    Ok(EditSet::single(delete_lines(document, start, end)?))
}

/// Delete a record, field, constant or keyword with all of its lines.
///
/// Inline keywords are cut from their definition line instead of deleting it.
pub fn delete_entity(
    document: &DdsDocument,
    node: &DdsNode<'_>,
) -> Result<EditSet, ReconstructError> {
    match node {
        DdsNode::Attribute(attribute) => remove_keywords(document, &[*attribute]),
        DdsNode::Record(_) | DdsNode::Field(_) | DdsNode::Constant(_) => match node.line_span() {
            Some((start, end)) => delete_block(document, start, end),
            None => Err(ReconstructError::NothingToRemove),
        },
        DdsNode::File(_) | DdsNode::Indicator(_) | DdsNode::Group(..) => {
            Err(ReconstructError::NothingToRemove)
        }
    }
}

/// Copy a field block to `anchor` under a new name, optionally at a new position.
///
/// Only the definition line is rewritten; keyword lines are copied byte for byte.
pub fn copy_field(
    document: &DdsDocument,
    field: &Field,
    anchor: Anchor,
    name: &str,
    position: Option<ScreenPosition>,
) -> Result<EditSet, ReconstructError> {
    check_width("name", schema::NAME, name)?;
    let mut lines = block_lines(document, field.line_index, field.last_line_index)?;
    let mut first = SourceLine::from(lines[0].as_str());
    first.write(schema::NAME, name, Align::Left);
    if let Some(position) = position {
        write_position(&mut first, position)?;
    }
    lines[0] = first.to_string();
    insert_block_after(document, anchor, &lines)
}

/// Copy a whole record format, including comments up to the next record, under a new name.
pub fn copy_record(
    document: &DdsDocument,
    record: &Record,
    anchor: Anchor,
    name: &str,
) -> Result<EditSet, ReconstructError> {
    check_width("name", schema::NAME, name)?;
    let mut lines = block_lines(document, record.start_index, record.end_index)?;
    let mut first = SourceLine::from(lines[0].as_str());
    first.write(schema::NAME, name, Align::Left);
    lines[0] = first.to_string();
    insert_block_after(document, anchor, &lines)
}

fn constant_definition(constant: &Constant, first: SourceLine, text: &str) -> Vec<String> {
    let mut value = quote_literal(text);
    if let Some(inline) = constant.attributes.iter().find(|a| a.is_inline()) {
        value.push(' ');
        value.push_str(&inline.value);
    }
    render_continued(first, &value)
}

/// Copy a constant block to `anchor`, optionally moving it and replacing its text.
///
/// A new text is re-quoted and re-split across continuation lines; inline keywords after the
/// literal are kept.
pub fn copy_constant(
    document: &DdsDocument,
    constant: &Constant,
    anchor: Anchor,
    position: Option<ScreenPosition>,
    text: Option<&str>,
) -> Result<EditSet, ReconstructError> {
    let mut first = SourceLine::from(line_text(document, constant.line_index)?.as_str());
    if let Some(position) = position {
        write_position(&mut first, position)?;
    }
    let mut lines = match text {
        Some(text) => constant_definition(constant, first, text),
        None => {
            let mut lines =
                block_lines(document, constant.line_index, constant.definition_last_index)?;
            lines[0] = first.to_string();
            lines
        }
    };
    if constant.last_line_index > constant.definition_last_index {
        lines.extend(block_lines(
            document,
            constant.definition_last_index + 1,
            constant.last_line_index,
        )?);
    }
    insert_block_after(document, anchor, &lines)
}

/// Replace the text of a constant in place.
pub fn set_constant_text(
    document: &DdsDocument,
    constant: &Constant,
    text: &str,
) -> Result<EditSet, ReconstructError> {
    let first = SourceLine::from(line_text(document, constant.line_index)?.as_str());
    let lines = constant_definition(constant, first, text);
    Ok(EditSet::single(replace_lines(
        document,
        constant.line_index,
        constant.definition_last_index,
        &lines,
    )?))
}

/// Reorder the fields and constants of a record.
///
/// `order` lists the definition lines of every element block in the new order. Each block
/// carries the lines up to the next block with it, and the whole span is replaced in a single
/// edit.
pub fn sort_elements(
    document: &DdsDocument,
    record: &Record,
    order: &[usize],
) -> Result<EditSet, ReconstructError> {
    let blocks = record.element_blocks();
    let mut requested = order.to_vec();
    requested.sort_unstable();
    let existing: Vec<usize> = blocks.iter().map(|b| b.line_index).collect();
    let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
        return Err(ReconstructError::InvalidOrder(record.name.clone()));
    };
    if requested != existing {
        return Err(ReconstructError::InvalidOrder(record.name.clone()));
    }
    check_line(document, last.last_line_index)?;

    let texts: Vec<(usize, String)> = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let end = blocks
                .get(index + 1)
                .map_or(block.last_line_index, |next| next.line_index - 1);
            block_lines(document, block.line_index, end)
                .map(|lines| (block.line_index, lines.join(document.line_ending().as_str())))
        })
        .collect::<Result<_, _>>()?;
    let sorted: Vec<String> = order
        .iter()
        .filter_map(|line| texts.iter().find(|(start, _)| start == line))
        .map(|(_, text)| text.clone())
        .collect();
    Ok(EditSet::single(replace_lines(
        document,
        first.line_index,
        last.last_line_index,
        &sorted,
    )?))
}

/// Element definition lines ordered by row, then column. Unpositioned elements keep their
/// source order after all positioned ones.
pub fn position_order(record: &Record) -> Vec<usize> {
    let mut blocks = record.element_blocks();
    blocks.sort_by_key(|b| b.position.map_or((u32::MAX, u32::MAX), |p| (p.row, p.column)));
    blocks.into_iter().map(|b| b.line_index).collect()
}

/// Sort a record's elements into screen order.
pub fn sort_by_position(
    document: &DdsDocument,
    record: &Record,
) -> Result<EditSet, ReconstructError> {
    sort_elements(document, record, &position_order(record))
}

/// Re-render the document from the line ranges of its entities without changing anything.
///
/// Lines before the first record, each record header, each element block (with the lines up
/// to the next block) and trailing lines are emitted in order. The result equals the source
/// text exactly when the parsed ranges tile the document.
pub fn render_entities(document: &DdsDocument, file: &DdsFile) -> String {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut next = 0;
    for record in &file.records {
        if record.start_index > next {
            spans.push((next, record.start_index - 1));
        }
        let blocks = record.element_blocks();
        let header_end = blocks
            .first()
            .map_or(record.end_index, |block| block.line_index - 1);
        spans.push((record.start_index, header_end));
        for (index, block) in blocks.iter().enumerate() {
            let end = blocks
                .get(index + 1)
                .map_or(record.end_index, |next| next.line_index - 1);
            spans.push((block.line_index, end));
        }
        next = record.end_index + 1;
    }
    if next < document.line_count() {
        spans.push((next, document.line_count() - 1));
    }
    spans
        .into_iter()
        .filter_map(|(start, end)| document.block_text(start, end))
        .collect::<Vec<_>>()
        .join(document.line_ending().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = concat!(
        "     A          R SCREEN1\n",
        "     A                                 10 30'Second'\n",
        "     A            NAME          10A  B  2  5\n",
        "     A                                      COLOR(BLU)\n",
        "     A                                  1  2'First'",
    );

    #[test]
    fn test_new_field_lines() {
        let mut field = NewField::new("AMOUNT", FieldType::Signed);
        field.length = Some(9);
        field.decimals = Some(2);
        field.position = Some(ScreenPosition::new(4, 20));
        field.keywords = vec!["EDTCDE(J)".to_string()];
        let lines = new_field_lines(&field).unwrap();
        assert_eq!(
            lines,
            vec![
                "     A            AMOUNT         9S 2B  4 20".to_string(),
                format!("     A{}EDTCDE(J)", " ".repeat(38)),
            ]
        );
    }

    #[test]
    fn test_new_date_field_has_no_length() {
        let mut field = NewField::new("SHIPDT", FieldType::Date);
        field.length = Some(12);
        field.usage = Usage::Hidden;
        field.position = Some(ScreenPosition::new(1, 1));
        let lines = new_field_lines(&field).unwrap();
        assert_eq!(lines, vec!["     A            SHIPDT          L  H".to_string()]);
    }

    #[test]
    fn test_new_record_and_constant() {
        assert_eq!(
            new_record_lines("MAIN", &[]).unwrap(),
            vec!["     A          R MAIN".to_string()]
        );
        let lines =
            new_constant_lines(&quote_literal("Name"), ScreenPosition::new(2, 3), &[], &[])
                .unwrap();
        assert_eq!(lines, vec!["     A                                  2  3'Name'".to_string()]);
    }

    #[test]
    fn test_sort_by_position_keeps_keyword_lines() {
        let doc = DdsDocument::new(SOURCE);
        let file = parse_document(&doc);
        let edits = sort_by_position(&doc, &file.records[0]).unwrap();
        assert_eq!(edits.len(), 1);
        let sorted = doc.apply(&edits).unwrap().text();
        let lines: Vec<&str> = sorted.lines().collect();
        assert_eq!(lines[1], "     A                                  1  2'First'");
        assert_eq!(lines[2], "     A            NAME          10A  B  2  5");
        assert_eq!(lines[3], "     A                                      COLOR(BLU)");
        assert_eq!(lines[4], "     A                                 10 30'Second'");
    }

    #[test]
    fn test_sort_rejects_partial_order() {
        let doc = DdsDocument::new(SOURCE);
        let file = parse_document(&doc);
        assert_eq!(
            sort_elements(&doc, &file.records[0], &[1, 2]),
            Err(ReconstructError::InvalidOrder("SCREEN1".to_string()))
        );
    }

    #[test]
    fn test_render_entities_reproduces_source() {
        let text = format!("     A                                      DSPSIZ(24 80 *DS3)\n{SOURCE}\n");
        let doc = DdsDocument::new(&text);
        let file = parse_document(&doc);
        assert_eq!(render_entities(&doc, &file), text);
    }

    #[test]
    fn test_copy_constant_with_new_text() {
        let doc = DdsDocument::new(SOURCE);
        let file = parse_document(&doc);
        let constant = &file.records[0].constants[1];
        let edits = copy_constant(
            &doc,
            constant,
            Anchor::After(4),
            Some(ScreenPosition::new(3, 2)),
            Some("It's"),
        )
        .unwrap();
        let text = doc.apply(&edits).unwrap().text();
        assert_eq!(
            text.lines().last(),
            Some("     A                                  3  2'It''s'")
        );
    }
}
