//! Structural parser: one forward pass from source lines to a [`DdsFile`].
//!
//! Physical lines are first folded into logical lines (a line whose column 80 holds a
//! continuation marker absorbs the next line). Each logical line is classified by its first
//! physical line and fed to a small builder that keeps the currently open record and element.
//!
//! The parser never fails. Truncated or malformed lines read missing columns as blank.

use crate::classify::{LineKind, classify};
use crate::document::{DdsDocument, split_lines};
use crate::model::{
    Attribute, AttributeSpan, Constant, DdsFile, Field, FieldType, Indicator, Record,
    ScreenPosition, ScreenSize, Usage, keyword_name, split_keywords,
};
use crate::schema::{
    self, COL, DATA_TYPE, DECIMALS, INDICATOR_SLOTS, KEYWORD_START, LENGTH, NAME, REFERENCE, ROW,
    USAGE,
};
use tracing::{debug, warn};

/// Parse DDS source text.
pub fn parse(source: &str) -> DdsFile {
    parse_lines(&split_lines(source))
}

/// Parse a document snapshot.
pub fn parse_document(document: &DdsDocument) -> DdsFile {
    parse_lines(&document.lines())
}

/// Parse pre-split lines.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> DdsFile {
    let mut builder = Builder::new(lines.len());
    let mut index = 0;
    while index < lines.len() {
        let logical = LogicalLine::read(lines, index);
        index = logical.end + 1;
        builder.feed(&logical);
    }
    let file = builder.finish(last_content_line(lines));
    debug!(
        records = file.records.len(),
        lines = file.line_count,
        "parsed DDS source"
    );
    file
}

/// Index of the last line that is not the empty remainder after a final line break.
pub fn last_content_line<S: AsRef<str>>(lines: &[S]) -> usize {
    match lines.last() {
        Some(last) if last.as_ref().is_empty() && lines.len() > 1 => lines.len() - 2,
        _ => lines.len().saturating_sub(1),
    }
}

/// Where a run of joined keyword text came from.
#[derive(Debug, Clone, Copy)]
struct Segment {
    line: usize,
    column: usize,
    offset: usize,
}

/// One or more physical lines joined by continuation markers.
#[derive(Debug)]
struct LogicalLine<'a> {
    first: &'a str,
    start: usize,
    end: usize,
    text: String,
    segments: Vec<Segment>,
}

impl<'a> LogicalLine<'a> {
    fn read<S: AsRef<str>>(lines: &'a [S], start: usize) -> Self {
        let mut end = start;
        let continues = !matches!(
            classify(lines[start].as_ref()),
            LineKind::Blank | LineKind::Comment
        );
        while continues && end + 1 < lines.len() && schema::has_continuation(lines[end].as_ref()) {
            end += 1;
        }

        let mut text = String::new();
        let mut segments = Vec::new();
        let mut text_len = 0;
        let mut skip_leading = false;
        for (line_index, line) in lines.iter().enumerate().take(end + 1).skip(start) {
            let line = line.as_ref();
            let raw = schema::keyword_segment(line);
            let segment = if skip_leading { raw.trim_start() } else { raw };
            let skipped = raw.chars().count() - segment.chars().count();
            segments.push(Segment {
                line: line_index,
                column: KEYWORD_START + skipped,
                offset: text_len,
            });
            text.push_str(segment);
            text_len += segment.chars().count();
            skip_leading = schema::continuation_marker(line) == Some('+');
        }
        text.truncate(text.trim_end().len());

        Self {
            first: lines[start].as_ref(),
            start,
            end,
            text,
            segments,
        }
    }

    /// Physical line and column of a char offset into [`LogicalLine::text`].
    fn locate(&self, offset: usize) -> (usize, usize) {
        let segment = self
            .segments
            .iter()
            .rev()
            .find(|segment| segment.offset <= offset)
            .copied()
            .unwrap_or(Segment {
                line: self.start,
                column: KEYWORD_START,
                offset: 0,
            });
        (segment.line, segment.column + (offset - segment.offset))
    }

    fn indicators(&self) -> Vec<Indicator> {
        INDICATOR_SLOTS
            .iter()
            .filter_map(|slot| Indicator::from_slot(schema::read(self.first, *slot)))
            .collect()
    }
}

/// Split a constant's keyword text into its literal (or constant keyword) and the rest.
fn split_literal(text: &str) -> (&str, &str) {
    if text.starts_with('\'') {
        let mut chars = text.char_indices().skip(1).peekable();
        while let Some((offset, ch)) = chars.next() {
            if ch != '\'' {
                continue;
            }
            if chars.peek().is_some_and(|(_, next)| *next == '\'') {
                chars.next();
                continue;
            }
            return text.split_at(offset + 1);
        }
        return (text, "");
    }
    match split_keywords(text).first() {
        Some(first) => {
            let at = text.find(first).unwrap_or(0) + first.len();
            text.split_at(at)
        }
        None => (text, ""),
    }
}

#[derive(Debug)]
enum OpenElement {
    Field(Field),
    Constant(Constant),
}

#[derive(Debug)]
struct Pending {
    line_index: usize,
    indicators: Vec<Indicator>,
}

#[derive(Debug)]
struct Builder {
    file: DdsFile,
    record: Option<Record>,
    element: Option<OpenElement>,
    pending: Option<Pending>,
}

impl Builder {
    fn new(line_count: usize) -> Self {
        Self {
            file: DdsFile {
                line_count,
                ..DdsFile::default()
            },
            record: None,
            element: None,
            pending: None,
        }
    }

    fn feed(&mut self, logical: &LogicalLine<'_>) {
        match classify(logical.first) {
            LineKind::Record => self.open_record(logical),
            LineKind::Help => self.help(logical),
            LineKind::Field => self.open_field(logical),
            LineKind::Constant => self.open_constant(logical),
            LineKind::Attribute => self.attribute(logical),
            LineKind::Blank | LineKind::Comment | LineKind::Other => {}
        }
    }

    /// Indicator-only lines condition the next keyword line; anything else ends them.
    fn discard_pending(&mut self, before: &str) {
        if let Some(pending) = self.pending.take() {
            warn!(
                line = pending.line_index + 1,
                indicators = pending.indicators.len(),
                "ignoring indicator-only line not followed by a keyword line, ended by {before}"
            );
        }
    }

    fn close_element(&mut self) {
        let Some(element) = self.element.take() else {
            return;
        };
        let Some(record) = self.record.as_mut() else {
            debug!("dropping element defined before the first record");
            return;
        };
        match element {
            OpenElement::Field(field) => record.fields.push(field),
            OpenElement::Constant(constant) => record.constants.push(constant),
        }
    }

    fn close_record(&mut self, end_index: usize) {
        self.close_element();
        if let Some(mut record) = self.record.take() {
            record.end_index = end_index.max(record.header_last_index);
            self.file.records.push(record);
        }
    }

    fn inline_attribute(logical: &LogicalLine<'_>, offset: usize, value: &str) -> Attribute {
        let (line, column) = logical.locate(offset);
        Attribute {
            value: value.to_string(),
            indicators: Vec::new(),
            line_index: line,
            keyword_line: line,
            last_line_index: logical.end,
            span: AttributeSpan::Inline { column },
        }
    }

    /// Keyword text sharing the definition line of a record or field.
    fn inline_keywords(logical: &LogicalLine<'_>) -> Option<Attribute> {
        let keywords = logical.text.trim_start();
        if keywords.is_empty() {
            return None;
        }
        let offset = logical.text.chars().count() - keywords.chars().count();
        Some(Self::inline_attribute(logical, offset, keywords))
    }

    fn open_record(&mut self, logical: &LogicalLine<'_>) {
        self.close_record(logical.start.saturating_sub(1));
        self.discard_pending("record format");
        let attributes = Self::inline_keywords(logical).into_iter().collect();
        self.record = Some(Record {
            name: schema::read_trimmed(logical.first, NAME).to_string(),
            start_index: logical.start,
            header_last_index: logical.end,
            end_index: logical.end,
            attributes,
            fields: Vec::new(),
            constants: Vec::new(),
        });
    }

    fn help(&mut self, logical: &LogicalLine<'_>) {
        self.close_element();
        let value = if logical.text.is_empty() {
            "H".to_string()
        } else {
            logical.text.clone()
        };
        let attribute = Attribute {
            value,
            indicators: logical.indicators(),
            line_index: logical.start,
            keyword_line: logical.start,
            last_line_index: logical.end,
            span: AttributeSpan::Standalone,
        };
        self.attach(attribute);
    }

    /// Previous positioned element of the open record, for `+n` relative columns.
    fn previous_extent(&self) -> Option<(ScreenPosition, u32)> {
        let from_open = match &self.element {
            Some(OpenElement::Field(f)) => f.position.map(|p| (p, f.display_width())),
            Some(OpenElement::Constant(c)) => c.position.map(|p| (p, c.length)),
            None => None,
        };
        from_open.or_else(|| {
            let record = self.record.as_ref()?;
            let field = record
                .fields
                .iter()
                .filter_map(|f| f.position.map(|p| (f.line_index, p, f.display_width())));
            let constant = record
                .constants
                .iter()
                .filter_map(|c| c.position.map(|p| (c.line_index, p, c.length)));
            field
                .chain(constant)
                .max_by_key(|(line, _, _)| *line)
                .map(|(_, p, w)| (p, w))
        })
    }

    fn position(&self, line: &str) -> Option<ScreenPosition> {
        let column_text = schema::read_trimmed(line, COL);
        let row = schema::read_number(line, ROW);
        let column = schema::read_number(line, COL)?;
        if column_text.starts_with('+') {
            let (previous, width) = self.previous_extent()?;
            return Some(ScreenPosition::new(
                row.unwrap_or(previous.row),
                previous.column.saturating_add(width).saturating_add(column),
            ));
        }
        match row {
            Some(row) if row > 0 && column > 0 => Some(ScreenPosition::new(row, column)),
            _ => None,
        }
    }

    fn open_field(&mut self, logical: &LogicalLine<'_>) {
        let line = logical.first;
        let position = self.position(line);
        self.close_element();
        self.discard_pending("field");

        let decimals = schema::read_number(line, DECIMALS).and_then(|d| u8::try_from(d).ok());
        let data_type = schema::read_flag(line, DATA_TYPE)
            .and_then(FieldType::from_code)
            .unwrap_or_else(|| FieldType::default_for(decimals));
        let length = data_type
            .fixed_length()
            .or_else(|| schema::read_number(line, LENGTH))
            .unwrap_or(0);
        let usage = Usage::from_code(schema::read_flag(line, USAGE));

        let attributes = Self::inline_keywords(logical).into_iter().collect();

        self.element = Some(OpenElement::Field(Field {
            name: schema::read_trimmed(line, NAME).to_string(),
            record_name: self
                .record
                .as_ref()
                .map(|r| r.name.clone())
                .unwrap_or_default(),
            data_type,
            length,
            decimals,
            position,
            usage,
            hidden: position.is_none(),
            referenced: schema::read_flag(line, REFERENCE)
                .is_some_and(|c| c.eq_ignore_ascii_case(&'R')),
            indicators: logical.indicators(),
            attributes,
            line_index: logical.start,
            definition_last_index: logical.end,
            last_line_index: logical.end,
        }));
    }

    fn open_constant(&mut self, logical: &LogicalLine<'_>) {
        let position = self.position(logical.first);
        self.close_element();
        self.discard_pending("constant");

        let (literal, rest) = split_literal(&logical.text);
        let mut attributes = Vec::new();
        let keywords = rest.trim_start();
        if !keywords.is_empty() {
            let offset = logical.text.chars().count() - keywords.chars().count();
            attributes.push(Self::inline_attribute(logical, offset, keywords));
        }

        self.element = Some(OpenElement::Constant(Constant {
            name: literal.to_string(),
            position,
            length: Constant::width_of(literal),
            indicators: logical.indicators(),
            attributes,
            line_index: logical.start,
            definition_last_index: logical.end,
            last_line_index: logical.end,
        }));
    }

    fn attribute(&mut self, logical: &LogicalLine<'_>) {
        let indicators = logical.indicators();
        if logical.text.is_empty() {
            let pending = self.pending.get_or_insert(Pending {
                line_index: logical.start,
                indicators: Vec::new(),
            });
            pending.indicators.extend(indicators);
            return;
        }
        let (line_index, mut all) = match self.pending.take() {
            Some(pending) => (pending.line_index, pending.indicators),
            None => (logical.start, Vec::new()),
        };
        all.extend(indicators);
        self.attach(Attribute {
            value: logical.text.trim_start().to_string(),
            indicators: all,
            line_index,
            keyword_line: logical.start,
            last_line_index: logical.end,
            span: AttributeSpan::Standalone,
        });
    }

    fn attach(&mut self, attribute: Attribute) {
        let end = attribute.last_line_index;
        match (&mut self.element, &mut self.record) {
            (Some(OpenElement::Field(field)), _) => {
                field.last_line_index = field.last_line_index.max(end);
                field.attributes.push(attribute);
            }
            (Some(OpenElement::Constant(constant)), _) => {
                constant.last_line_index = constant.last_line_index.max(end);
                constant.attributes.push(attribute);
            }
            (None, Some(record)) => {
                record.header_last_index = record.header_last_index.max(end);
                record.attributes.push(attribute);
            }
            (None, None) => self.file.attributes.push(attribute),
        }
    }

    fn finish(mut self, last_line: usize) -> DdsFile {
        self.discard_pending("end of file");
        self.close_record(last_line);
        self.file.screen = self
            .file
            .attributes
            .iter()
            .flat_map(|a| a.keywords())
            .find(|kw| keyword_name(kw) == "DSPSIZ")
            .map(ScreenSize::from_dspsiz)
            .unwrap_or_default();
        self.file
    }
}
