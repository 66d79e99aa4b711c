//! Keyword rendering, insertion and removal, including continuation-line splitting.

use super::columns::INDICATORS_PER_LINE;
use super::{
    KeywordOwner, ReconstructError, delete_line_runs, insert_lines, line_text, replace_line,
    replace_lines,
};
use crate::classify::{LineKind, classify};
use crate::document::DdsDocument;
use crate::edit::EditSet;
use crate::model::{Attribute, AttributeSpan, DdsFile, Indicator, keyword_name};
use crate::schema::{self, KEYWORD_CAPACITY, KEYWORD_START, SourceLine};
use std::collections::BTreeSet;

/// Where the continuation splitter stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitState {
    /// Nothing emitted yet.
    FirstLine,
    /// At least one continued chunk emitted; more text remains.
    Continue,
    /// The final chunk has been emitted.
    Done,
}

/// One line's worth of keyword text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Text for the keyword area, at most [`KEYWORD_CAPACITY`] characters.
    pub text: &'a str,
    /// `true` when another chunk follows, i.e. the line gets a continuation marker.
    pub continued: bool,
}

/// Splits keyword text into keyword-area chunks.
///
/// Each step consumes exactly [`KEYWORD_CAPACITY`] characters while more text remains, so
/// joining the chunks reproduces the input. Empty input yields a single empty chunk.
#[derive(Debug, Clone)]
pub struct ContinuationSplitter<'a> {
    rest: &'a str,
    state: SplitState,
}

impl<'a> ContinuationSplitter<'a> {
    /// Start splitting `text`.
    pub fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            state: SplitState::FirstLine,
        }
    }

    /// Current state.
    pub fn state(&self) -> SplitState {
        self.state
    }
}

impl<'a> Iterator for ContinuationSplitter<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == SplitState::Done {
            return None;
        }
        let cut = self
            .rest
            .char_indices()
            .nth(KEYWORD_CAPACITY)
            .map_or(self.rest.len(), |(offset, _)| offset);
        let (text, rest) = self.rest.split_at(cut);
        self.rest = rest;
        let continued = !rest.is_empty();
        self.state = if continued {
            SplitState::Continue
        } else {
            SplitState::Done
        };
        Some(Chunk { text, continued })
    }
}

/// Render `text` into the keyword area starting on `first`, continuing on bare
/// specification lines.
pub(crate) fn render_continued(first: SourceLine, text: &str) -> Vec<String> {
    let mut first = Some(first);
    ContinuationSplitter::new(text)
        .map(|chunk| {
            let mut line = first.take().unwrap_or_else(SourceLine::spec);
            line.set_keywords(chunk.text);
            if chunk.continued {
                line.mark_continued();
            }
            line.to_string()
        })
        .collect()
}

/// Render a standalone keyword with its conditioning indicators.
///
/// Up to three indicators go on the keyword line itself. Longer lists are written three per
/// line on leading indicator-only lines, each after the first marked `A` (AND) in column 7.
pub fn render_keyword_lines(
    keyword: &str,
    indicators: &[Indicator],
) -> Result<Vec<String>, ReconstructError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ReconstructError::EmptyKeyword);
    }
    let groups: Vec<&[Indicator]> = indicators.chunks(INDICATORS_PER_LINE).collect();
    let (last, leading) = match groups.split_last() {
        Some((last, leading)) => (*last, leading),
        None => (&[][..], &[][..]),
    };
    let mut lines: Vec<String> = leading
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let mut line = SourceLine::spec();
            if index > 0 {
                line.write_flag(schema::CONDITION, Some('A'));
            }
            line.write_indicators(group);
            line.to_string()
        })
        .collect();
    let mut first = SourceLine::spec();
    if !leading.is_empty() {
        first.write_flag(schema::CONDITION, Some('A'));
    }
    first.write_indicators(last);
    lines.extend(render_continued(first, keyword));
    Ok(lines)
}

/// Add a keyword to a record, field, constant or the file.
///
/// The keyword goes inline on the definition line when the owner has no keywords yet, no
/// indicators are requested, the definition line's keyword area is empty and the keyword fits
/// in one line's capacity. Otherwise it is rendered on standalone lines inserted after the
/// owner's last line.
pub fn add_keyword(
    document: &DdsDocument,
    owner: &impl KeywordOwner,
    keyword: &str,
    indicators: &[Indicator],
) -> Result<EditSet, ReconstructError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ReconstructError::EmptyKeyword);
    }
    if let Some(line) = owner.definition_line()
        && owner.attributes().is_empty()
        && indicators.is_empty()
        && keyword.chars().count() <= KEYWORD_CAPACITY
    {
        let text = line_text(document, line)?;
        if schema::is_blank(&text, schema::KEYWORDS) && !schema::has_continuation(&text) {
            let mut source = SourceLine::from(text.as_str());
            source.set_keywords(keyword);
            return Ok(EditSet::single(replace_line(
                document,
                line,
                &source.to_string(),
            )?));
        }
    }
    let lines = render_keyword_lines(keyword, indicators)?;
    Ok(EditSet::single(insert_lines(document, owner.anchor(), &lines)?))
}

/// The line continuing onto `line` when cutting inline text leaves `cleared` with an empty
/// keyword area. That line then loses its marker and `line` goes away.
fn emptied_continuation(
    document: &DdsDocument,
    line: usize,
    cleared: &SourceLine,
) -> Result<Option<usize>, ReconstructError> {
    if line == 0 || !schema::is_blank(&cleared.to_string(), schema::KEYWORDS) {
        return Ok(None);
    }
    let previous = line_text(document, line - 1)?;
    let continues = schema::has_continuation(&previous)
        && !matches!(classify(&previous), LineKind::Blank | LineKind::Comment);
    Ok(continues.then_some(line - 1))
}

/// Remove whole attributes.
///
/// Inline attributes are cut from their keyword column, keeping the definition; standalone
/// attributes lose all their lines. Contiguous standalone lines are deleted as one range.
pub fn remove_keywords(
    document: &DdsDocument,
    attributes: &[&Attribute],
) -> Result<EditSet, ReconstructError> {
    if attributes.is_empty() {
        return Err(ReconstructError::NothingToRemove);
    }
    let mut edits = EditSet::new();
    let mut standalone = BTreeSet::new();
    for attribute in attributes {
        match attribute.span {
            AttributeSpan::Inline { column } => {
                let line = attribute.keyword_line;
                let mut source = SourceLine::from(line_text(document, line)?.as_str());
                source.clear_from(column);
                let kept = match emptied_continuation(document, line, &source)? {
                    Some(previous) => {
                        let mut marked = SourceLine::from(line_text(document, previous)?.as_str());
                        marked.clear_from(schema::CONTINUATION.start());
                        edits.push(replace_line(document, previous, &marked.to_string())?)?;
                        previous
                    }
                    None => {
                        edits.push(replace_line(document, line, &source.to_string())?)?;
                        line
                    }
                };
                standalone.extend(kept + 1..=attribute.last_line_index);
            }
            AttributeSpan::Standalone => {
                standalone.extend(attribute.line_index..=attribute.last_line_index);
            }
        }
    }
    for edit in delete_line_runs(document, standalone)? {
        edits.push(edit)?;
    }
    Ok(edits)
}

fn substitute(attribute: &Attribute, name: &str, keyword: &str) -> String {
    attribute
        .keywords()
        .into_iter()
        .map(|existing| {
            if keyword_name(existing).eq_ignore_ascii_case(name) {
                keyword
            } else {
                existing
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace the keyword called `name` on `owner` with `keyword`, or add it when absent.
///
/// Other keywords sharing the attribute, its indicators and its placement are kept. Inline
/// keywords that follow a constant's literal cannot be re-rendered in place.
pub fn replace_keyword(
    document: &DdsDocument,
    owner: &impl KeywordOwner,
    name: &str,
    keyword: &str,
) -> Result<EditSet, ReconstructError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(ReconstructError::EmptyKeyword);
    }
    let Some(attribute) = owner.attributes().iter().find(|a| a.has_keyword(name)) else {
        return add_keyword(document, owner, keyword, &[]);
    };
    let value = substitute(attribute, name, keyword);
    let edit = match attribute.span {
        AttributeSpan::Standalone => {
            let lines = render_keyword_lines(&value, &attribute.indicators)?;
            replace_lines(
                document,
                attribute.line_index,
                attribute.last_line_index,
                &lines,
            )?
        }
        AttributeSpan::Inline { column } if column == KEYWORD_START => {
            let first = SourceLine::from(line_text(document, attribute.keyword_line)?.as_str());
            let lines = render_continued(first, &value);
            replace_lines(
                document,
                attribute.keyword_line,
                attribute.last_line_index,
                &lines,
            )?
        }
        AttributeSpan::Inline { .. } => {
            return Err(ReconstructError::InlineKeyword {
                line: attribute.keyword_line,
            });
        }
    };
    Ok(EditSet::single(edit))
}

/// Set a file-level keyword such as `DSPSIZ(27 132 *DS4)`, replacing one with the same name.
pub fn set_file_keyword(
    document: &DdsDocument,
    file: &DdsFile,
    keyword: &str,
) -> Result<EditSet, ReconstructError> {
    replace_keyword(document, file, &keyword_name(keyword), keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::join_keyword_segments;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_splitter_states() {
        let text = "X".repeat(KEYWORD_CAPACITY + 1);
        let mut splitter = ContinuationSplitter::new(&text);
        assert_eq!(splitter.state(), SplitState::FirstLine);
        let first = splitter.next().unwrap();
        assert!(first.continued);
        assert_eq!(first.text.len(), KEYWORD_CAPACITY);
        assert_eq!(splitter.state(), SplitState::Continue);
        let second = splitter.next().unwrap();
        assert_eq!(second, Chunk { text: "X", continued: false });
        assert_eq!(splitter.state(), SplitState::Done);
        assert_eq!(splitter.next(), None);
    }

    #[test]
    fn test_splitter_multibyte() {
        let text = "é".repeat(40);
        let chunks: Vec<Chunk<'_>> = ContinuationSplitter::new(&text).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text.chars().count(), KEYWORD_CAPACITY);
        assert_eq!(chunks[1].text.chars().count(), 5);
    }

    #[test]
    fn test_render_marks_column_80() {
        let keyword = format!("TEXT('{}')", "A".repeat(40));
        let lines = render_keyword_lines(&keyword, &[]).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 80);
        assert!(lines[0].ends_with('-'));
        assert!(lines[1].starts_with("     A   "));
        assert_eq!(join_keyword_segments(&lines), keyword);
    }

    #[test]
    fn test_render_lengths_around_capacity() {
        for total in [34, 35, 36, 70, 71, 105, 140] {
            let body: String = "ABC ".chars().cycle().take(total - 8).collect();
            let keyword = format!("TEXT('{body}')");
            assert_eq!(keyword.len(), total);
            let lines = render_keyword_lines(&keyword, &[]).unwrap();
            assert_eq!(lines.len(), total.div_ceil(KEYWORD_CAPACITY), "length {total}");
            let (last, continued) = lines.split_last().unwrap();
            for line in continued {
                assert_eq!(line.chars().count(), 80, "length {total}");
                assert_eq!(line.chars().nth(79), Some('-'));
                assert!(!line.chars().take(79).any(|ch| ch == '-'));
            }
            assert!(last.chars().count() <= 79, "length {total}");
            assert!(!last.contains('-'));
            assert_eq!(join_keyword_segments(&lines), keyword, "length {total}");
        }
    }

    #[test]
    fn test_remove_inline_keyword_starting_on_continuation() {
        let source = format!(
            "{}\n{:<79}-\n{}COLOR(BLU)\n{}",
            "     A          R ONE",
            "     A            CUSNAM        20A  B  5 10",
            "     A".to_string() + &" ".repeat(38),
            "     A            CUSNUM        10A  B  6 10",
        );
        let doc = DdsDocument::new(&source);
        let file = crate::parser::parse_document(&doc);
        let attribute = &file.records[0].fields[0].attributes[0];
        assert_eq!(attribute.span, AttributeSpan::Inline { column: 44 });
        assert_eq!(attribute.keyword_line, 2);

        let edits = remove_keywords(&doc, &[attribute]).unwrap();
        let updated = doc.apply(&edits).unwrap();
        assert_eq!(
            updated.text(),
            concat!(
                "     A          R ONE\n",
                "     A            CUSNAM        20A  B  5 10\n",
                "     A            CUSNUM        10A  B  6 10",
            )
        );
        let reparsed = crate::parser::parse_document(&updated);
        assert!(reparsed.records[0].fields[0].attributes.is_empty());
        assert_eq!(reparsed.records[0].fields[1].line_index, 2);
    }

    #[test]
    fn test_render_many_indicators() {
        let indicators = [1, 2, 3, 4, 5].map(Indicator::on);
        let lines = render_keyword_lines("DSPATR(HI)", &indicators).unwrap();
        assert_eq!(
            lines,
            vec![
                "     A  01 02 03".to_string(),
                format!("     AA 04 05{}DSPATR(HI)", " ".repeat(31)),
            ]
        );
    }

    #[test]
    fn test_render_empty_keyword() {
        assert_eq!(
            render_keyword_lines("   ", &[]),
            Err(ReconstructError::EmptyKeyword)
        );
    }
}
