use dds_core::reconstruct::{centered_column, position_order, reposition, sort_by_position};
use dds_core::validate::{is_valid_name, last_column, overlaps};
use dds_core::{
    DdsDocument, DiagnosticSeverity, LineKind, ScreenPosition, ScreenSize, classify, diagnose,
    fits_on_screen, is_available, is_available_excluding, parse, parse_document,
};
use pretty_assertions::assert_eq;

const INQUIRY: &str = include_str!("fixtures/inquiry.dds");

#[test]
fn test_fixture_line_kinds() {
    let kinds: Vec<LineKind> = INQUIRY.split('\n').map(classify).collect();
    assert_eq!(kinds[0], LineKind::Comment);
    assert_eq!(kinds[1], LineKind::Attribute);
    assert_eq!(kinds[4], LineKind::Record);
    assert_eq!(kinds[6], LineKind::Constant);
    assert_eq!(kinds[9], LineKind::Constant);
    assert_eq!(kinds[13], LineKind::Comment);
    assert_eq!(kinds[15], LineKind::Field);
    assert_eq!(kinds[16], LineKind::Attribute);
    assert_eq!(kinds[20], LineKind::Field);
    assert_eq!(kinds[23], LineKind::Attribute);
    assert_eq!(kinds[25], LineKind::Blank);
}

#[test]
fn test_overlap_is_symmetric() {
    let cases = [
        (ScreenPosition::new(3, 2), 9, ScreenPosition::new(3, 10), 5, true),
        (ScreenPosition::new(3, 2), 9, ScreenPosition::new(3, 11), 5, false),
        (ScreenPosition::new(3, 2), 9, ScreenPosition::new(4, 2), 9, false),
        (ScreenPosition::new(5, 20), 1, ScreenPosition::new(5, 10), 30, true),
        (ScreenPosition::new(5, 20), 0, ScreenPosition::new(5, 20), 0, true),
    ];
    for (a, a_width, b, b_width, expected) in cases {
        assert_eq!(overlaps(a, a_width, b, b_width), expected, "{a:?} vs {b:?}");
        assert_eq!(overlaps(b, b_width, a, a_width), expected, "{b:?} vs {a:?}");
    }
    assert_eq!(last_column(10, 0), 10);
}

#[test]
fn test_availability_against_fixture() {
    let file = parse(INQUIRY);
    let detail = file.record("DETAIL").unwrap();

    // CUSTNO occupies row 3, columns 13..=19.
    assert!(!is_available(detail, 3, 13, 7));
    assert!(is_available_excluding(detail, 3, 13, 7, 15));
    assert!(!is_available(detail, 3, 19, 1));
    assert!(is_available(detail, 3, 20, 10));
    assert!(is_available(detail, 7, 1, 80));
    // The long constant spans row 6, columns 2..=54.
    assert!(!is_available(detail, 6, 54, 1));
    assert!(is_available(detail, 6, 55, 1));
}

#[test]
fn test_fits_on_screen() {
    let wide = ScreenSize::WIDE;
    assert!(fits_on_screen(ScreenSize::STANDARD, ScreenPosition::new(24, 71), 10));
    assert!(!fits_on_screen(ScreenSize::STANDARD, ScreenPosition::new(24, 72), 10));
    assert!(!fits_on_screen(ScreenSize::STANDARD, ScreenPosition::new(25, 1), 1));
    assert!(fits_on_screen(wide, ScreenPosition::new(25, 100), 33));
    assert!(!fits_on_screen(wide, ScreenPosition::new(1, 0), 1));
}

#[test]
fn test_valid_names() {
    for name in ["A", "CUSTNO", "X1_#@$", "ABCDEFGHIJ"] {
        assert!(is_valid_name(name), "{name}");
    }
    for name in ["", "1ABC", "custno", "ABCDEFGHIJK", "CUST NO"] {
        assert!(!is_valid_name(name), "{name}");
    }
}

#[test]
fn test_diagnose_reports_overlap_and_screen_edge() {
    let doc = DdsDocument::new(INQUIRY);
    let file = parse_document(&doc);
    let detail = file.record("DETAIL").unwrap();
    let balance = detail.field("BALANCE").unwrap();

    // Move BALANCE onto CUSNAM's row, then push the date past the right edge.
    let moved = doc
        .apply(&reposition(&doc, balance.line_index, ScreenPosition::new(4, 20)).unwrap())
        .unwrap();
    let moved = moved
        .apply(&reposition(&moved, 9, ScreenPosition::new(1, 75)).unwrap())
        .unwrap();

    let diagnostics = diagnose(&parse_document(&moved));
    let codes: Vec<(usize, &str, DiagnosticSeverity)> = diagnostics
        .iter()
        .map(|d| (d.range.line, d.code, d.severity))
        .collect();
    assert_eq!(
        codes,
        vec![
            (9, "off-screen", DiagnosticSeverity::Error),
            (19, "overlap", DiagnosticSeverity::Warning),
        ]
    );
    assert_eq!(diagnostics[1].message, "BALANCE overlaps CUSNAM on row 4");
}

#[test]
fn test_diagnose_duplicate_names() {
    let source = concat!(
        "     A          R REC1\n",
        "     A            FLD1          10A  O  2  2\n",
        "     A            FLD1          10A  O  3  2\n",
        "     A          R REC1\n",
        "     A            bad           10A  H",
    );
    let diagnostics = diagnose(&parse(source));
    let codes: Vec<(usize, &str)> = diagnostics.iter().map(|d| (d.range.line, d.code)).collect();
    assert_eq!(
        codes,
        vec![(2, "duplicate-name"), (3, "duplicate-name"), (4, "invalid-name")]
    );
}

#[test]
fn test_window_record_skips_screen_check() {
    let source = concat!(
        "     A          R WIN1                      WINDOW(5 10 8 40)\n",
        "     A                                  1 75'Outside'",
    );
    assert!(diagnose(&parse(source)).is_empty());
}

#[test]
fn test_centered_column() {
    assert_eq!(centered_column(16, 80), 33);
    assert_eq!(centered_column(80, 80), 2);
    assert_eq!(centered_column(10, 132), 62);
}

#[test]
fn test_sort_detail_by_position() {
    let doc = DdsDocument::new(INQUIRY);
    let file = parse_document(&doc);
    let detail = file.record("DETAIL").unwrap();
    assert_eq!(position_order(detail), vec![14, 15, 18, 19, 21, 20]);

    let edits = sort_by_position(&doc, detail).unwrap();
    let sorted = doc.apply(&edits).unwrap();
    let lines = sorted.lines();
    assert_eq!(lines[20], doc.line(21).unwrap());
    assert_eq!(lines[24], doc.line(20).unwrap());

    let reparsed = parse_document(&sorted);
    let detail = reparsed.record("DETAIL").unwrap();
    assert_eq!(detail.field("HIDKEY").unwrap().line_index, 24);
    assert_eq!(detail.constants[1].line_index, 20);
    assert_eq!(detail.constants[1].last_line_index, 23);
    assert_eq!(position_order(detail), vec![14, 15, 18, 19, 20, 24]);
}
