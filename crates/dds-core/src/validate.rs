//! Position/overlap validation and file diagnostics.
//!
//! Placement checks are pure predicates: they never mutate the model, and callers decide
//! whether a conflict means re-prompting or aborting. [`diagnose`] collects the same checks
//! over a whole file as structured diagnostics for problems panels and the `check` command.

use crate::model::{DdsFile, Record, ScreenPosition, ScreenSize};
use crate::schema::{self, Column};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9_#@$]{0,9}$").expect("valid name pattern")
});

/// Returns `true` for valid record and field names: upper case, at most ten characters,
/// starting with a letter.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Inclusive last column of an element starting at `column` that is `width` wide.
///
/// Zero-width elements are treated as one column wide.
pub fn last_column(column: u32, width: u32) -> u32 {
    column.saturating_add(width.max(1) - 1)
}

/// Two placements overlap iff they share a row and their inclusive column ranges intersect.
pub fn overlaps(a: ScreenPosition, a_width: u32, b: ScreenPosition, b_width: u32) -> bool {
    a.row == b.row
        && a.column <= last_column(b.column, b_width)
        && b.column <= last_column(a.column, a_width)
}

/// Returns `true` if no positioned element of `record` overlaps `width` columns at
/// `row`/`col`.
///
/// An element placed exactly there collides with itself; use [`is_available_excluding`] when
/// moving an existing element.
pub fn is_available(record: &Record, row: u32, col: u32, width: u32) -> bool {
    let target = ScreenPosition::new(row, col);
    record
        .elements()
        .iter()
        .all(|element| !overlaps(target, width, element.position, element.width))
}

/// Like [`is_available`], ignoring the element defined on `exclude_line`.
pub fn is_available_excluding(
    record: &Record,
    row: u32,
    col: u32,
    width: u32,
    exclude_line: usize,
) -> bool {
    let target = ScreenPosition::new(row, col);
    record
        .elements()
        .iter()
        .filter(|element| element.line_index != exclude_line)
        .all(|element| !overlaps(target, width, element.position, element.width))
}

/// Returns `true` if `width` columns at `position` lie within `screen`.
pub fn fits_on_screen(screen: ScreenSize, position: ScreenPosition, width: u32) -> bool {
    (1..=screen.rows).contains(&position.row)
        && position.column >= 1
        && last_column(position.column, width) <= screen.columns
}

/// An element about to be placed in a record.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    /// Record receiving the element.
    pub record: &'a Record,
    /// Display the record is written for.
    pub screen: ScreenSize,
    /// Characters the element occupies.
    pub width: u32,
    /// Definition line of the element being moved, which never conflicts with itself.
    pub exclude_line: Option<usize>,
}

impl Placement<'_> {
    /// Why `position` cannot be used, if it cannot.
    ///
    /// Window records skip the screen bounds check; their coordinates are window-relative.
    pub fn check(&self, position: ScreenPosition) -> Result<(), String> {
        if self.record.window().is_none() && !fits_on_screen(self.screen, position, self.width) {
            return Err(format!(
                "{} columns at row {}, column {} do not fit on a {}x{} display",
                self.width, position.row, position.column, self.screen.rows, self.screen.columns
            ));
        }
        let free = match self.exclude_line {
            Some(line) => is_available_excluding(
                self.record,
                position.row,
                position.column,
                self.width,
                line,
            ),
            None => is_available(self.record, position.row, position.column, self.width),
        };
        if free {
            Ok(())
        } else {
            Err(format!(
                "row {}, column {} overlaps another element of {}",
                position.row, position.column, self.record.name
            ))
        }
    }
}

/// A character range within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiagnosticRange {
    /// 0-based line index.
    pub line: usize,
    /// First character column (0-based, inclusive).
    pub start: usize,
    /// End character column (0-based, exclusive).
    pub end: usize,
}

impl DiagnosticRange {
    /// The range a schema column covers on `line`.
    pub fn column(line: usize, column: Column) -> Self {
        Self {
            line,
            start: column.start(),
            end: column.end(),
        }
    }
}

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticSeverity {
    /// The source will not compile.
    Error,
    /// Suspicious but accepted.
    Warning,
}

/// A single problem found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Where the problem is.
    pub range: DiagnosticRange,
    /// Severity.
    pub severity: DiagnosticSeverity,
    /// Stable code such as `overlap` or `duplicate-name`.
    pub code: &'static str,
    /// Human readable message.
    pub message: String,
}

const PLACEMENT: Column = Column::new(schema::ROW.start(), schema::COL.end());

fn diagnose_record(record: &Record, screen: ScreenSize, out: &mut Vec<Diagnostic>) {
    if !is_valid_name(&record.name) {
        out.push(Diagnostic {
            range: DiagnosticRange::column(record.start_index, schema::NAME),
            severity: DiagnosticSeverity::Warning,
            code: "invalid-name",
            message: format!("record name '{}' is not a valid DDS name", record.name),
        });
    }

    let mut seen = HashSet::new();
    for field in &record.fields {
        let range = DiagnosticRange::column(field.line_index, schema::NAME);
        if !is_valid_name(&field.name) {
            out.push(Diagnostic {
                range,
                severity: DiagnosticSeverity::Warning,
                code: "invalid-name",
                message: format!("field name '{}' is not a valid DDS name", field.name),
            });
        }
        if !seen.insert(field.name.to_ascii_uppercase()) {
            out.push(Diagnostic {
                range,
                severity: DiagnosticSeverity::Error,
                code: "duplicate-name",
                message: format!(
                    "field '{}' is already defined in record {}",
                    field.name, record.name
                ),
            });
        }
    }

    // Window records place their contents relative to the window, not the display.
    let check_screen = record.window().is_none();
    let elements = record.elements();
    for (index, element) in elements.iter().enumerate() {
        let range = DiagnosticRange::column(element.line_index, PLACEMENT);
        if check_screen && !fits_on_screen(screen, element.position, element.width) {
            out.push(Diagnostic {
                range,
                severity: DiagnosticSeverity::Error,
                code: "off-screen",
                message: format!(
                    "{} at row {}, column {} does not fit on a {}x{} display",
                    element.name,
                    element.position.row,
                    element.position.column,
                    screen.rows,
                    screen.columns
                ),
            });
        }
        if let Some(other) = elements[..index]
            .iter()
            .find(|other| overlaps(element.position, element.width, other.position, other.width))
        {
            out.push(Diagnostic {
                range,
                severity: DiagnosticSeverity::Warning,
                code: "overlap",
                message: format!(
                    "{} overlaps {} on row {}",
                    element.name, other.name, element.position.row
                ),
            });
        }
    }
}

/// Collect placement and naming problems of a parsed file, in line order.
pub fn diagnose(file: &DdsFile) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let mut record_names = HashSet::new();
    for record in &file.records {
        if !record_names.insert(record.name.to_ascii_uppercase()) {
            out.push(Diagnostic {
                range: DiagnosticRange::column(record.start_index, schema::NAME),
                severity: DiagnosticSeverity::Error,
                code: "duplicate-name",
                message: format!("record format '{}' is already defined", record.name),
            });
        }
        diagnose_record(record, file.screen, &mut out);
    }
    out.sort_by_key(|d| (d.range.line, d.range.start));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SOURCE: &str = concat!(
        "     A          R MAIN\n",
        "     A            NAME          10A  B  2  5\n",
        "     A                                  2 14'Label'\n",
        "     A            NAME           5A  O  3 78",
    );

    #[test]
    fn test_overlap_boundaries() {
        let at = |column| ScreenPosition::new(2, column);
        assert!(overlaps(at(5), 10, at(14), 1));
        assert!(!overlaps(at(5), 10, at(15), 1));
        assert!(!overlaps(at(5), 10, ScreenPosition::new(3, 5), 10));
        assert!(overlaps(at(5), 0, at(5), 0));
    }

    #[test]
    fn test_last_column_saturates() {
        assert_eq!(last_column(5, 10), 14);
        assert_eq!(last_column(5, 0), 5);
        assert_eq!(last_column(u32::MAX - 2, 10), u32::MAX);
        assert!(!fits_on_screen(ScreenSize::WIDE, ScreenPosition::new(1, u32::MAX), 2));
        assert!(overlaps(
            ScreenPosition::new(1, u32::MAX),
            5,
            ScreenPosition::new(1, u32::MAX - 1),
            5
        ));
    }

    #[test]
    fn test_is_available() {
        let file = parse(SOURCE);
        let record = &file.records[0];
        assert!(!is_available(record, 2, 5, 10));
        assert!(!is_available(record, 2, 14, 3));
        assert!(is_available(record, 2, 22, 3));
        assert!(is_available_excluding(record, 2, 3, 10, 1));
        assert!(!is_available_excluding(record, 2, 3, 10, 2));
    }

    #[test]
    fn test_fits_on_screen() {
        assert!(fits_on_screen(ScreenSize::STANDARD, ScreenPosition::new(24, 71), 10));
        assert!(!fits_on_screen(ScreenSize::STANDARD, ScreenPosition::new(24, 72), 10));
        assert!(!fits_on_screen(ScreenSize::STANDARD, ScreenPosition::new(25, 1), 1));
        assert!(fits_on_screen(ScreenSize::WIDE, ScreenPosition::new(25, 100), 10));
    }

    #[test]
    fn test_names() {
        assert!(is_valid_name("CUSNAM"));
        assert!(is_valid_name("A1_#"));
        assert!(!is_valid_name("1ABC"));
        assert!(!is_valid_name("lower"));
        assert!(!is_valid_name("ABCDEFGHIJK"));
    }

    #[test]
    fn test_diagnose() {
        let file = parse(SOURCE);
        let codes: Vec<(usize, &str)> = diagnose(&file)
            .iter()
            .map(|d| (d.range.line, d.code))
            .collect();
        assert_eq!(
            codes,
            vec![(2, "overlap"), (3, "duplicate-name"), (3, "off-screen")]
        );
    }
}
