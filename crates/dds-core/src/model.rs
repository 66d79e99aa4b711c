//! Entity model produced by the structural parser.
//!
//! The model is a disposable snapshot: it is rebuilt from scratch after every document change
//! and never mutated in place. Line indices are 0-based and inclusive on both ends.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A conditioning indicator (`01`–`99`), optionally negated with `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Indicator {
    /// Indicator number, 1–99.
    pub number: u8,
    /// `false` when the condition is negated (`N` prefix).
    pub active: bool,
}

impl Indicator {
    /// A condition that holds when the indicator is on.
    pub fn on(number: u8) -> Self {
        Self {
            number,
            active: true,
        }
    }

    /// A condition that holds when the indicator is off (`N`).
    pub fn off(number: u8) -> Self {
        Self {
            number,
            active: false,
        }
    }

    /// Parse one 3-character indicator slot (`" 03"`, `"N41"`). Blank or malformed slots yield
    /// `None`.
    pub fn from_slot(slot: &str) -> Option<Self> {
        let slot = slot.trim_end();
        if slot.trim().is_empty() {
            return None;
        }
        let (negated, digits) = match slot.chars().next() {
            Some('N' | 'n') => (true, &slot[1..]),
            _ => (false, slot),
        };
        let number: u8 = digits.trim().parse().ok()?;
        (1..=99).contains(&number).then_some(Self {
            number,
            active: !negated,
        })
    }

    /// Render as a 3-character indicator slot.
    pub fn slot_text(self) -> String {
        format!("{}{:02}", if self.active { ' ' } else { 'N' }, self.number)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.active {
            write!(f, "{:02}", self.number)
        } else {
            write!(f, "N{:02}", self.number)
        }
    }
}

/// Error returned when user text is not an indicator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not an indicator (expected 01-99, optionally prefixed with N)")]
pub struct ParseIndicatorError(pub String);

impl FromStr for Indicator {
    type Err = ParseIndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let (active, digits) = match text.strip_prefix(['N', 'n']) {
            Some(rest) => (false, rest),
            None => (true, text),
        };
        match digits.parse::<u8>() {
            Ok(number) if (1..=99).contains(&number) && digits.len() <= 2 => {
                Ok(Self { number, active })
            }
            _ => Err(ParseIndicatorError(s.to_string())),
        }
    }
}

/// A 1-based screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScreenPosition {
    /// Screen row (line).
    pub row: u32,
    /// Screen column (position).
    pub column: u32,
}

impl ScreenPosition {
    /// Create a screen position.
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Display size a file is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenSize {
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub columns: u32,
}

impl ScreenSize {
    /// The 24×80 display (`*DS3`).
    pub const STANDARD: Self = Self {
        rows: 24,
        columns: 80,
    };
    /// The 27×132 display (`*DS4`).
    pub const WIDE: Self = Self {
        rows: 27,
        columns: 132,
    };

    fn area(self) -> u64 {
        u64::from(self.rows) * u64::from(self.columns)
    }

    /// Resolve the largest size named by a `DSPSIZ(...)` keyword value.
    ///
    /// Accepts both the `*DS3 *DS4` form and explicit `rows cols [name]` pairs.
    pub fn from_dspsiz(keyword: &str) -> Self {
        let args = keyword_args(keyword).unwrap_or(keyword);
        let tokens: Vec<&str> = args.split_whitespace().collect();
        let mut size = Self::STANDARD;
        let mut index = 0;
        while index < tokens.len() {
            let token = tokens[index].to_ascii_uppercase();
            let candidate = if token == "*DS4" {
                Some(Self::WIDE)
            } else if let (Ok(rows), Some(Ok(columns))) = (
                token.parse::<u32>(),
                tokens.get(index + 1).map(|t| t.parse::<u32>()),
            ) {
                index += 1;
                Some(Self { rows, columns })
            } else {
                None
            };
            if let Some(candidate) = candidate
                && candidate.area() > size.area()
            {
                size = candidate;
            }
            index += 1;
        }
        size
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Data type / keyboard shift of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldType {
    /// `A` alphanumeric shift.
    Alphanumeric,
    /// `X` alphabetic only.
    Alphabetic,
    /// `N` numeric shift.
    NumericShift,
    /// `S` signed numeric.
    Signed,
    /// `Y` numeric only.
    NumericOnly,
    /// `W` katakana.
    Katakana,
    /// `I` inhibit keyboard entry.
    Inhibit,
    /// `D` digits only.
    Digits,
    /// `M` numeric only character.
    NumericOnlyCharacter,
    /// `F` floating point.
    Float,
    /// `L` date.
    Date,
    /// `T` time.
    Time,
    /// `Z` timestamp.
    Timestamp,
    /// `P` packed decimal.
    Packed,
    /// `B` binary.
    Binary,
    /// `O` DBCS open.
    DbcsOpen,
    /// `E` DBCS either.
    DbcsEither,
    /// `J` DBCS only.
    DbcsOnly,
    /// `G` graphic.
    Graphic,
}

impl FieldType {
    /// Every supported type, in table order.
    pub const ALL: [FieldType; 19] = [
        Self::Alphanumeric,
        Self::Alphabetic,
        Self::NumericShift,
        Self::Signed,
        Self::NumericOnly,
        Self::Katakana,
        Self::Inhibit,
        Self::Digits,
        Self::NumericOnlyCharacter,
        Self::Float,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Packed,
        Self::Binary,
        Self::DbcsOpen,
        Self::DbcsEither,
        Self::DbcsOnly,
        Self::Graphic,
    ];

    /// DDS type code.
    pub fn code(self) -> char {
        match self {
            Self::Alphanumeric => 'A',
            Self::Alphabetic => 'X',
            Self::NumericShift => 'N',
            Self::Signed => 'S',
            Self::NumericOnly => 'Y',
            Self::Katakana => 'W',
            Self::Inhibit => 'I',
            Self::Digits => 'D',
            Self::NumericOnlyCharacter => 'M',
            Self::Float => 'F',
            Self::Date => 'L',
            Self::Time => 'T',
            Self::Timestamp => 'Z',
            Self::Packed => 'P',
            Self::Binary => 'B',
            Self::DbcsOpen => 'O',
            Self::DbcsEither => 'E',
            Self::DbcsOnly => 'J',
            Self::Graphic => 'G',
        }
    }

    /// Look up a type code (case-insensitive).
    pub fn from_code(code: char) -> Option<Self> {
        let code = code.to_ascii_uppercase();
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Type used when the data type column is blank.
    pub fn default_for(decimals: Option<u8>) -> Self {
        if decimals.is_some() {
            Self::Signed
        } else {
            Self::Alphanumeric
        }
    }

    /// Whether the length column is specified for this type.
    pub fn has_length(self) -> bool {
        self.fixed_length().is_none()
    }

    /// Whether decimal positions are specified for this type.
    pub fn has_decimals(self) -> bool {
        matches!(
            self,
            Self::NumericShift
                | Self::Signed
                | Self::NumericOnly
                | Self::Float
                | Self::Packed
                | Self::Binary
        )
    }

    /// System-defined length for date, time and timestamp fields.
    pub fn fixed_length(self) -> Option<u32> {
        match self {
            Self::Date => Some(10),
            Self::Time => Some(8),
            Self::Timestamp => Some(26),
            _ => None,
        }
    }

    /// Human readable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::Alphanumeric => "Alphanumeric shift",
            Self::Alphabetic => "Alphabetic only",
            Self::NumericShift => "Numeric shift",
            Self::Signed => "Signed numeric",
            Self::NumericOnly => "Numeric only",
            Self::Katakana => "Katakana",
            Self::Inhibit => "Inhibit keyboard entry",
            Self::Digits => "Digits only",
            Self::NumericOnlyCharacter => "Numeric only character",
            Self::Float => "Floating point",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Timestamp => "Timestamp",
            Self::Packed => "Packed decimal",
            Self::Binary => "Binary",
            Self::DbcsOpen => "DBCS open",
            Self::DbcsEither => "DBCS either",
            Self::DbcsOnly => "DBCS only",
            Self::Graphic => "Graphic",
        }
    }
}

/// Field usage (column 38).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Usage {
    /// `I` input only.
    Input,
    /// `O` output only.
    Output,
    /// `B` input and output; the default for display files.
    #[default]
    Both,
    /// `H` hidden.
    Hidden,
    /// `M` message.
    Message,
    /// `P` program-to-system.
    Program,
}

impl Usage {
    /// Every usage, in display order.
    pub const ALL: [Usage; 6] = [
        Self::Input,
        Self::Output,
        Self::Both,
        Self::Hidden,
        Self::Message,
        Self::Program,
    ];

    /// DDS usage code.
    pub fn code(self) -> char {
        match self {
            Self::Input => 'I',
            Self::Output => 'O',
            Self::Both => 'B',
            Self::Hidden => 'H',
            Self::Message => 'M',
            Self::Program => 'P',
        }
    }

    /// Look up a usage code; blank falls back to [`Usage::Both`].
    pub fn from_code(code: Option<char>) -> Self {
        match code.map(|c| c.to_ascii_uppercase()) {
            Some('I') => Self::Input,
            Some('O') => Self::Output,
            Some('H') => Self::Hidden,
            Some('M') => Self::Message,
            Some('P') => Self::Program,
            _ => Self::Both,
        }
    }

    /// Whether fields with this usage are placed on screen.
    pub fn is_positioned(self) -> bool {
        matches!(self, Self::Input | Self::Output | Self::Both)
    }
}

/// Where an attribute's keyword text sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeSpan {
    /// The attribute owns its lines; removing it deletes them.
    Standalone,
    /// The attribute shares its first line with an element definition, starting at `column`
    /// (0-based character index); removing it blanks the line from there.
    Inline {
        /// 0-based character index where the keyword text begins.
        column: usize,
    },
}

/// A keyword entry attached to a file, record, field or constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Raw keyword text joined across continuation lines, e.g. `COLOR(BLU)`.
    pub value: String,
    /// Conditioning indicators.
    pub indicators: Vec<Indicator>,
    /// First line, including leading indicator-only lines.
    pub line_index: usize,
    /// Line where the keyword text starts.
    pub keyword_line: usize,
    /// Last line (inclusive), accounting for continuations.
    pub last_line_index: usize,
    /// Inline or standalone placement.
    pub span: AttributeSpan,
}

impl Attribute {
    /// Top-level keywords in [`Attribute::value`].
    pub fn keywords(&self) -> Vec<&str> {
        split_keywords(&self.value)
    }

    /// Name of the first keyword (`COLOR` for `COLOR(BLU)`), upper-cased.
    pub fn keyword_name(&self) -> String {
        self.keywords()
            .first()
            .map(|kw| keyword_name(kw))
            .unwrap_or_default()
    }

    /// Returns `true` if any keyword in the value has this name.
    pub fn has_keyword(&self, name: &str) -> bool {
        self.keywords()
            .iter()
            .any(|kw| keyword_name(kw).eq_ignore_ascii_case(name))
    }

    /// Arguments of the named keyword, if present.
    pub fn keyword_args(&self, name: &str) -> Option<&str> {
        self.keywords()
            .into_iter()
            .find(|kw| keyword_name(kw).eq_ignore_ascii_case(name))
            .and_then(keyword_args)
    }

    /// Returns `true` for attributes that share a line with their element definition.
    pub fn is_inline(&self) -> bool {
        matches!(self.span, AttributeSpan::Inline { .. })
    }
}

/// Split keyword text at top-level blanks, keeping parenthesised and quoted text together.
pub fn split_keywords(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start: Option<usize> = None;
    for (offset, ch) in text.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            _ => {}
        }
        if ch.is_whitespace() && depth == 0 && !quoted {
            if let Some(from) = start.take() {
                out.push(&text[from..offset]);
            }
        } else if start.is_none() {
            start = Some(offset);
        }
    }
    if let Some(from) = start {
        out.push(&text[from..]);
    }
    out
}

/// Upper-cased keyword name: the text before `(`.
pub fn keyword_name(keyword: &str) -> String {
    keyword
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase()
}

/// Text between the first `(` and its matching last `)`.
pub fn keyword_args(keyword: &str) -> Option<&str> {
    let open = keyword.find('(')?;
    let close = keyword.rfind(')')?;
    (close > open).then(|| &keyword[open + 1..close])
}

/// Quote user text as a DDS literal, doubling embedded apostrophes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Strip the quotes of a DDS literal and undouble apostrophes. Unquoted text is returned as is.
pub fn unquote_literal(literal: &str) -> String {
    let inner = literal
        .strip_prefix('\'')
        .map(|rest| rest.strip_suffix('\'').unwrap_or(rest));
    match inner {
        Some(inner) => inner.replace("''", "'"),
        None => literal.to_string(),
    }
}

/// A named, typed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field name (at most 10 characters).
    pub name: String,
    /// Owning record format.
    pub record_name: String,
    /// Data type; blank columns resolve through [`FieldType::default_for`].
    pub data_type: FieldType,
    /// Declared length, or the system length for date/time/timestamp.
    pub length: u32,
    /// Decimal positions, when specified.
    pub decimals: Option<u8>,
    /// Screen position; `None` for hidden and program fields.
    pub position: Option<ScreenPosition>,
    /// Usage.
    pub usage: Usage,
    /// `true` when the field has no screen position.
    pub hidden: bool,
    /// `true` when the field references another file's definition (`R` in column 29).
    pub referenced: bool,
    /// Option indicators on the definition line.
    pub indicators: Vec<Indicator>,
    /// Attached keywords.
    pub attributes: Vec<Attribute>,
    /// Definition line.
    pub line_index: usize,
    /// Last line of the definition itself, including inline continuation.
    pub definition_last_index: usize,
    /// Last line of the field block, including attribute lines.
    pub last_line_index: usize,
}

impl Field {
    /// Characters the field occupies on screen.
    pub fn display_width(&self) -> u32 {
        self.data_type.fixed_length().unwrap_or(self.length)
    }
}

/// A positioned literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Constant {
    /// Literal text as written (normally quoted), or a constant keyword such as `DATE`.
    pub name: String,
    /// Screen position.
    pub position: Option<ScreenPosition>,
    /// Display width.
    pub length: u32,
    /// Option indicators on the definition line.
    pub indicators: Vec<Indicator>,
    /// Attached keywords.
    pub attributes: Vec<Attribute>,
    /// Definition line.
    pub line_index: usize,
    /// Last line of the literal, including continuation.
    pub definition_last_index: usize,
    /// Last line of the constant block, including attribute lines.
    pub last_line_index: usize,
}

impl Constant {
    /// Text shown on screen for quoted literals.
    pub fn value(&self) -> String {
        unquote_literal(&self.name)
    }

    /// Returns `true` for quoted literals (as opposed to `DATE`, `TIME`, ...).
    pub fn is_literal(&self) -> bool {
        self.name.starts_with('\'')
    }

    /// Display width of a constant's literal or keyword.
    pub fn width_of(name: &str) -> u32 {
        if name.starts_with('\'') {
            return u32::try_from(unquote_literal(name).chars().count()).unwrap_or(u32::MAX);
        }
        match keyword_name(name).as_str() {
            "DATE" | "TIME" | "SYSNAME" => 8,
            "USER" => 10,
            _ => 0,
        }
    }
}

/// A record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Record format name.
    pub name: String,
    /// Record header line.
    pub start_index: usize,
    /// Last line of the record-level keywords (the header when there are none).
    pub header_last_index: usize,
    /// Last line before the next record header, or the last line of the file.
    pub end_index: usize,
    /// Record-level keywords (`SFL`, `WINDOW`, help specifications, ...).
    pub attributes: Vec<Attribute>,
    /// Fields, in source order.
    pub fields: Vec<Field>,
    /// Constants, in source order.
    pub constants: Vec<Constant>,
}

impl Record {
    /// Header line index (same as [`Record::start_index`]).
    pub fn line_index(&self) -> usize {
        self.start_index
    }

    /// Look up a field by name (case-insensitive).
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Returns `true` if a record-level keyword with this name exists.
    pub fn has_keyword(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.has_keyword(name))
    }

    /// Subfile record (`SFL`).
    pub fn is_subfile(&self) -> bool {
        self.has_keyword("SFL")
    }

    /// Subfile control record (`SFLCTL`).
    pub fn is_subfile_control(&self) -> bool {
        self.has_keyword("SFLCTL")
    }

    /// `WINDOW(...)` arguments, when the record is a window.
    pub fn window(&self) -> Option<&str> {
        self.attributes.iter().find_map(|a| a.keyword_args("WINDOW"))
    }

    /// Positioned fields and constants as screen rectangles, in source order.
    pub fn elements(&self) -> Vec<Element> {
        let fields = self.fields.iter().filter_map(|f| {
            f.position.map(|position| Element {
                kind: ElementKind::Field,
                name: f.name.clone(),
                position,
                width: f.display_width(),
                line_index: f.line_index,
            })
        });
        let constants = self.constants.iter().filter_map(|c| {
            c.position.map(|position| Element {
                kind: ElementKind::Constant,
                name: c.name.clone(),
                position,
                width: c.length,
                line_index: c.line_index,
            })
        });
        let mut all: Vec<Element> = fields.chain(constants).collect();
        all.sort_by_key(|e| e.line_index);
        all
    }

    /// Line blocks of every field and constant, sorted by line.
    pub fn element_blocks(&self) -> Vec<ElementBlock> {
        let mut blocks: Vec<ElementBlock> = self
            .fields
            .iter()
            .map(|f| ElementBlock {
                kind: ElementKind::Field,
                line_index: f.line_index,
                last_line_index: f.last_line_index,
                position: f.position,
            })
            .chain(self.constants.iter().map(|c| ElementBlock {
                kind: ElementKind::Constant,
                line_index: c.line_index,
                last_line_index: c.last_line_index,
                position: c.position,
            }))
            .collect();
        blocks.sort_by_key(|b| b.line_index);
        blocks
    }

    /// Last line used by the header, a field or a constant.
    pub fn last_element_line(&self) -> usize {
        self.element_blocks()
            .iter()
            .map(|b| b.last_line_index)
            .fold(self.header_last_index, usize::max)
    }
}

/// Field or constant discriminator for placement data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    /// A field.
    Field,
    /// A constant.
    Constant,
}

/// A positioned element as a screen rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    /// Field or constant.
    pub kind: ElementKind,
    /// Field name or constant literal.
    pub name: String,
    /// Top-left position.
    pub position: ScreenPosition,
    /// Width in characters.
    pub width: u32,
    /// Definition line.
    pub line_index: usize,
}

/// The line span of a field or constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementBlock {
    /// Field or constant.
    pub kind: ElementKind,
    /// Definition line.
    pub line_index: usize,
    /// Last line, inclusive.
    pub last_line_index: usize,
    /// Screen position, when placed.
    pub position: Option<ScreenPosition>,
}

/// A parsed display file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DdsFile {
    /// File-level keywords (lines before the first record).
    pub attributes: Vec<Attribute>,
    /// Record formats, in source order.
    pub records: Vec<Record>,
    /// Largest display size declared by `DSPSIZ`, or 24×80.
    pub screen: ScreenSize,
    /// Number of physical lines in the source.
    pub line_count: usize,
}

impl DdsFile {
    /// Look up a record by name (case-insensitive).
    pub fn record(&self, name: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// Record whose line span contains `line`.
    pub fn record_at_line(&self, line: usize) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| (r.start_index..=r.end_index).contains(&line))
    }

    /// Innermost entity whose line span contains `line`.
    pub fn node_at_line(&self, line: usize) -> DdsNode<'_> {
        let Some(record) = self.record_at_line(line) else {
            return self
                .attributes
                .iter()
                .find(|a| (a.line_index..=a.last_line_index).contains(&line))
                .map_or(DdsNode::File(self), DdsNode::Attribute);
        };
        let in_span = |start: usize, end: usize| (start..=end).contains(&line);
        if let Some(field) = record
            .fields
            .iter()
            .find(|f| in_span(f.line_index, f.last_line_index))
        {
            return DdsNode::Field(field);
        }
        if let Some(constant) = record
            .constants
            .iter()
            .find(|c| in_span(c.line_index, c.last_line_index))
        {
            return DdsNode::Constant(constant);
        }
        DdsNode::Record(record)
    }

    /// The `DSPSIZ` attribute, when declared.
    pub fn dspsiz(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.has_keyword("DSPSIZ"))
    }
}

/// Outline grouping under a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupKind {
    /// Record-level keywords.
    Keywords,
    /// Fields.
    Fields,
    /// Constants.
    Constants,
}

impl GroupKind {
    /// Label shown in outlines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Keywords => "Keywords",
            Self::Fields => "Fields",
            Self::Constants => "Constants",
        }
    }
}

/// Borrowed view over any entity in a [`DdsFile`], for tree/outline consumers.
#[derive(Debug, Clone, Copy)]
pub enum DdsNode<'a> {
    /// The whole file.
    File(&'a DdsFile),
    /// A record format.
    Record(&'a Record),
    /// A field.
    Field(&'a Field),
    /// A constant.
    Constant(&'a Constant),
    /// A keyword.
    Attribute(&'a Attribute),
    /// A conditioning indicator.
    Indicator(&'a Indicator),
    /// A synthetic group of a record's children.
    Group(&'a Record, GroupKind),
}

impl<'a> DdsNode<'a> {
    /// Display label.
    pub fn label(&self) -> String {
        match self {
            Self::File(_) => "File".to_string(),
            Self::Record(r) => r.name.clone(),
            Self::Field(f) => f.name.clone(),
            Self::Constant(c) => c.name.clone(),
            Self::Attribute(a) => a.value.clone(),
            Self::Indicator(i) => i.to_string(),
            Self::Group(_, kind) => kind.label().to_string(),
        }
    }

    /// Short detail text (type/length/position).
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Field(f) => {
                let decimals = f.decimals.map(|d| format!(",{d}")).unwrap_or_default();
                let place = f
                    .position
                    .map(|p| format!(" @ {},{}", p.row, p.column))
                    .unwrap_or_else(|| " hidden".to_string());
                Some(format!(
                    "{}({}{}) {}{}",
                    f.data_type.code(),
                    f.length,
                    decimals,
                    f.usage.code(),
                    place
                ))
            }
            Self::Constant(c) => c.position.map(|p| format!("@ {},{}", p.row, p.column)),
            Self::Record(r) if r.is_subfile() => Some("subfile".to_string()),
            Self::Record(r) if r.is_subfile_control() => Some("subfile control".to_string()),
            Self::Record(r) if r.window().is_some() => Some("window".to_string()),
            Self::Attribute(a) if !a.indicators.is_empty() => Some(
                a.indicators
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            _ => None,
        }
    }

    /// Inclusive line span, when the node maps to source lines.
    pub fn line_span(&self) -> Option<(usize, usize)> {
        match self {
            Self::File(f) => Some((0, f.line_count.saturating_sub(1))),
            Self::Record(r) => Some((r.start_index, r.end_index)),
            Self::Field(f) => Some((f.line_index, f.last_line_index)),
            Self::Constant(c) => Some((c.line_index, c.last_line_index)),
            Self::Attribute(a) => Some((a.line_index, a.last_line_index)),
            Self::Indicator(_) | Self::Group(..) => None,
        }
    }

    /// Child nodes in outline order.
    pub fn children(&self) -> Vec<DdsNode<'a>> {
        match *self {
            Self::File(file) => file
                .attributes
                .iter()
                .map(DdsNode::Attribute)
                .chain(file.records.iter().map(DdsNode::Record))
                .collect(),
            Self::Record(record) => [GroupKind::Keywords, GroupKind::Fields, GroupKind::Constants]
                .into_iter()
                .filter(|kind| match kind {
                    GroupKind::Keywords => !record.attributes.is_empty(),
                    GroupKind::Fields => !record.fields.is_empty(),
                    GroupKind::Constants => !record.constants.is_empty(),
                })
                .map(|kind| DdsNode::Group(record, kind))
                .collect(),
            Self::Group(record, GroupKind::Keywords) => {
                record.attributes.iter().map(DdsNode::Attribute).collect()
            }
            Self::Group(record, GroupKind::Fields) => {
                record.fields.iter().map(DdsNode::Field).collect()
            }
            Self::Group(record, GroupKind::Constants) => {
                record.constants.iter().map(DdsNode::Constant).collect()
            }
            Self::Field(field) => field
                .indicators
                .iter()
                .map(DdsNode::Indicator)
                .chain(field.attributes.iter().map(DdsNode::Attribute))
                .collect(),
            Self::Constant(constant) => constant
                .indicators
                .iter()
                .map(DdsNode::Indicator)
                .chain(constant.attributes.iter().map(DdsNode::Attribute))
                .collect(),
            Self::Attribute(attribute) => {
                attribute.indicators.iter().map(DdsNode::Indicator).collect()
            }
            Self::Indicator(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_slots() {
        assert_eq!(Indicator::from_slot(" 03"), Some(Indicator::on(3)));
        assert_eq!(Indicator::from_slot("N41"), Some(Indicator::off(41)));
        assert_eq!(Indicator::from_slot("   "), None);
        assert_eq!(Indicator::from_slot("N00"), None);
        assert_eq!(Indicator::on(7).slot_text(), " 07");
        assert_eq!(Indicator::off(99).slot_text(), "N99");
    }

    #[test]
    fn test_indicator_from_str() {
        assert_eq!("N03".parse::<Indicator>(), Ok(Indicator::off(3)));
        assert_eq!("42".parse::<Indicator>(), Ok(Indicator::on(42)));
        assert!("100".parse::<Indicator>().is_err());
        assert!("X1".parse::<Indicator>().is_err());
        assert_eq!(Indicator::off(3).to_string(), "N03");
    }

    #[test]
    fn test_split_keywords() {
        assert_eq!(
            split_keywords("COLOR(BLU) TEXT('a b (c') DSPATR(HI RI)"),
            vec!["COLOR(BLU)", "TEXT('a b (c')", "DSPATR(HI RI)"]
        );
        assert_eq!(split_keywords("   "), Vec::<&str>::new());
        assert_eq!(keyword_name("edtcde(1)"), "EDTCDE");
        assert_eq!(keyword_args("EDTCDE(1)"), Some("1"));
        assert_eq!(keyword_args("SFL"), None);
    }

    #[test]
    fn test_literal_quoting() {
        assert_eq!(quote_literal("It's"), "'It''s'");
        assert_eq!(unquote_literal("'It''s'"), "It's");
        assert_eq!(Constant::width_of("'It''s'"), 4);
        assert_eq!(Constant::width_of("DATE"), 8);
        assert_eq!(Constant::width_of("USER"), 10);
    }

    #[test]
    fn test_field_type_table() {
        assert_eq!(FieldType::from_code('l'), Some(FieldType::Date));
        assert_eq!(FieldType::Date.fixed_length(), Some(10));
        assert_eq!(FieldType::Time.fixed_length(), Some(8));
        assert_eq!(FieldType::Timestamp.fixed_length(), Some(26));
        assert!(FieldType::Packed.has_decimals());
        assert!(!FieldType::Alphanumeric.has_decimals());
        assert!(!FieldType::Date.has_length());
        assert_eq!(FieldType::default_for(Some(0)), FieldType::Signed);
        assert_eq!(FieldType::default_for(None), FieldType::Alphanumeric);
        assert_eq!(FieldType::from_code('Q'), None);
    }

    #[test]
    fn test_screen_size_from_dspsiz() {
        assert_eq!(ScreenSize::from_dspsiz("DSPSIZ(24 80 *DS3)"), ScreenSize::STANDARD);
        assert_eq!(
            ScreenSize::from_dspsiz("DSPSIZ(24 80 *DS3 27 132 *DS4)"),
            ScreenSize::WIDE
        );
        assert_eq!(ScreenSize::from_dspsiz("DSPSIZ(*DS3 *DS4)"), ScreenSize::WIDE);
        assert_eq!(ScreenSize::from_dspsiz("DSPSIZ(*DS3)"), ScreenSize::STANDARD);
    }

    #[test]
    fn test_usage_codes() {
        assert_eq!(Usage::from_code(None), Usage::Both);
        assert_eq!(Usage::from_code(Some('h')), Usage::Hidden);
        assert!(!Usage::Hidden.is_positioned());
    }
}
