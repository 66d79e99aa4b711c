use dds_core::reconstruct::{
    add_keyword, delete_block, delete_entity, remove_keywords, render_keyword_lines,
    replace_keyword, set_file_keyword,
};
use dds_core::{AttributeSpan, DdsDocument, DdsFile, Indicator, ScreenSize, parse_document};
use pretty_assertions::assert_eq;

const INQUIRY: &str = include_str!("fixtures/inquiry.dds");

fn inquiry() -> (DdsDocument, DdsFile) {
    let doc = DdsDocument::new(INQUIRY);
    let file = parse_document(&doc);
    (doc, file)
}

/// The fixture text with the given lines left out.
fn without(skip: &[usize]) -> String {
    INQUIRY
        .split('\n')
        .enumerate()
        .filter(|(index, _)| !skip.contains(index))
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn text_keyword(total: usize) -> String {
    format!("TEXT('{}')", "x".repeat(total - 8))
}

#[test]
fn test_keyword_that_fills_one_line_stays_inline() {
    let (doc, file) = inquiry();
    let hidden = file.records[1].field("HIDKEY").unwrap();

    for total in [34, 35] {
        let keyword = text_keyword(total);
        let edits = add_keyword(&doc, hidden, &keyword, &[]).unwrap();
        let updated = doc.apply(&edits).unwrap();
        assert_eq!(updated.line_count(), doc.line_count());
        let line = updated.line(20).unwrap();
        assert_eq!(line.chars().count(), 44 + total);
        assert!(line.ends_with(&keyword));

        let reparsed = parse_document(&updated);
        let field = reparsed.records[1].field("HIDKEY").unwrap();
        assert_eq!(field.attributes[0].value, keyword);
        assert_eq!(field.attributes[0].span, AttributeSpan::Inline { column: 44 });
    }
}

#[test]
fn test_keyword_longer_than_a_line_is_continued() {
    let (doc, file) = inquiry();
    let hidden = file.records[1].field("HIDKEY").unwrap();
    let keyword = text_keyword(36);

    let edits = add_keyword(&doc, hidden, &keyword, &[]).unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(updated.line_count(), doc.line_count() + 2);

    let first = updated.line(21).unwrap();
    assert_eq!(first.chars().count(), 80);
    assert!(first.ends_with('-'));
    assert_eq!(&first[44..79], &keyword[..35]);
    assert_eq!(updated.line(22).unwrap(), format!("     A{})", " ".repeat(38)));

    let reparsed = parse_document(&updated);
    let field = reparsed.records[1].field("HIDKEY").unwrap();
    assert_eq!(field.attributes.len(), 1);
    assert_eq!(field.attributes[0].value, keyword);
    assert_eq!(field.attributes[0].span, AttributeSpan::Standalone);
    assert_eq!(field.last_line_index, 22);
    assert_eq!(reparsed.records[1].constants[1].line_index, 23);
}

#[test]
fn test_add_color_inline_to_bare_field() {
    let (doc, file) = inquiry();
    let hidden = file.records[1].field("HIDKEY").unwrap();
    let edits = add_keyword(&doc, hidden, "COLOR(BLU)", &[]).unwrap();
    assert_eq!(edits.len(), 1);
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(
        updated.line(20).unwrap(),
        "     A            HIDKEY        10A  H      COLOR(BLU)"
    );
}

#[test]
fn test_add_keyword_after_existing_attributes() {
    let (doc, file) = inquiry();
    let custno = file.records[1].field("CUSTNO").unwrap();
    let edits = add_keyword(&doc, custno, "COLOR(BLU)", &[]).unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(updated.line(17).unwrap(), doc.line(17).unwrap());
    assert_eq!(
        updated.line(18).unwrap(),
        format!("     A{}COLOR(BLU)", " ".repeat(38))
    );
    let reparsed = parse_document(&updated);
    assert_eq!(reparsed.records[1].field("CUSTNO").unwrap().attributes.len(), 3);
}

#[test]
fn test_add_conditioned_keyword_to_record() {
    let (doc, file) = inquiry();
    let detail = &file.records[1];
    let indicators = [Indicator::on(90), Indicator::off(91)];
    let edits = add_keyword(&doc, detail, "PUTOVR", &indicators).unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(
        updated.line(13).unwrap(),
        format!("     A  90N91{}PUTOVR", " ".repeat(31))
    );
    let reparsed = parse_document(&updated);
    let attribute = &reparsed.records[1].attributes[1];
    assert_eq!(attribute.value, "PUTOVR");
    assert_eq!(attribute.indicators, indicators.to_vec());
}

#[test]
fn test_remove_all_field_keywords() {
    let (doc, file) = inquiry();
    let custno = file.records[1].field("CUSTNO").unwrap();
    let attributes: Vec<_> = custno.attributes.iter().collect();
    let edits = remove_keywords(&doc, &attributes).unwrap();
    assert_eq!(edits.len(), 1);
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(updated.text(), without(&[16, 17]));

    let reparsed = parse_document(&updated);
    let custno = reparsed.records[1].field("CUSTNO").unwrap();
    assert!(custno.attributes.is_empty());
    assert_eq!(custno.last_line_index, 15);
    assert_eq!(reparsed.records[1].field("CUSNAM").unwrap().line_index, 16);
}

#[test]
fn test_remove_keywords_across_separate_runs() {
    let (doc, file) = inquiry();
    let header = &file.records[0];
    let targets = vec![
        &file.attributes[1],
        &file.attributes[2],
        &header.attributes[0],
        &header.constants[1].attributes[0],
        &header.constants[2].attributes[0],
    ];
    let edits = remove_keywords(&doc, &targets).unwrap();
    assert_eq!(edits.len(), 4);
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(updated.text(), without(&[2, 3, 5, 8, 10]));

    let reparsed = parse_document(&updated);
    assert_eq!(reparsed.attributes.len(), 1);
    let header = &reparsed.records[0];
    assert!(header.attributes.is_empty());
    assert_eq!((header.start_index, header.end_index), (2, 5));
    assert_eq!(reparsed.records[1].start_index, 6);
}

#[test]
fn test_remove_inline_keyword_keeps_definition() {
    let (doc, file) = inquiry();
    let cusnam = file.records[1].field("CUSNAM").unwrap();
    let edits = remove_keywords(&doc, &[&cusnam.attributes[0]]).unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(
        updated.line(18).unwrap(),
        "     A            CUSNAM        30A  O  4 13"
    );
    assert_eq!(updated.line_count(), doc.line_count());
    let reparsed = parse_document(&updated);
    assert!(reparsed.records[1].field("CUSNAM").unwrap().attributes.is_empty());
}

fn keyword_line(prefix: &str, keyword: &str) -> String {
    format!("{prefix:<44}{keyword}")
}

#[test]
fn test_remove_keyword_lines_before_next_record() {
    let source = [
        "     A          R ONE".to_string(),
        "     A            CUSNAM        20A  B  5 10".to_string(),
        keyword_line("     A", "COLOR(BLU)"),
        keyword_line("     A  40", "DSPATR(HI)"),
        keyword_line("     A", "CHECK(LC)"),
        "     A          R TWO".to_string(),
        "     A            CUSNUM        10A  B  6 10".to_string(),
    ]
    .join("\n");
    let doc = DdsDocument::new(&source);
    let file = parse_document(&doc);
    let cusnam = file.records[0].field("CUSNAM").unwrap();
    assert_eq!(cusnam.attributes.len(), 3);

    let attributes: Vec<_> = cusnam.attributes.iter().collect();
    let edits = remove_keywords(&doc, &attributes).unwrap();
    assert_eq!(edits.len(), 1);
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(
        updated.text(),
        concat!(
            "     A          R ONE\n",
            "     A            CUSNAM        20A  B  5 10\n",
            "     A          R TWO\n",
            "     A            CUSNUM        10A  B  6 10",
        )
    );

    let reparsed = parse_document(&updated);
    assert_eq!(reparsed.records.len(), 2);
    assert_eq!(reparsed.records[0].end_index, 1);
    assert_eq!(reparsed.records[1].start_index, 2);
    assert_eq!(reparsed.records[1].fields[0].name, "CUSNUM");
}

#[test]
fn test_remove_conditioned_keyword_group() {
    let source = [
        "     A          R ONE".to_string(),
        "     A            CUSNAM        20A  B  5 10".to_string(),
        "     A  40 41 42".to_string(),
        format!("{:<79}-", keyword_line("     AA 43", "DSPATR(HI)")),
        keyword_line("     A", "COLOR(RED)"),
        keyword_line("     A", "TEXT('Kept')"),
        "     A          R TWO".to_string(),
    ]
    .join("\n");
    let doc = DdsDocument::new(&source);
    let file = parse_document(&doc);
    let cusnam = file.records[0].field("CUSNAM").unwrap();
    let group = cusnam
        .attributes
        .iter()
        .find(|a| a.has_keyword("COLOR"))
        .unwrap();
    assert_eq!((group.line_index, group.last_line_index), (2, 4));
    assert_eq!(group.indicators.len(), 4);

    let edits = remove_keywords(&doc, &[group]).unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(
        updated.text(),
        [
            "     A          R ONE".to_string(),
            "     A            CUSNAM        20A  B  5 10".to_string(),
            keyword_line("     A", "TEXT('Kept')"),
            "     A          R TWO".to_string(),
        ]
        .join("\n")
    );

    let reparsed = parse_document(&updated);
    let cusnam = reparsed.records[0].field("CUSNAM").unwrap();
    assert_eq!(cusnam.attributes.len(), 1);
    assert_eq!(cusnam.attributes[0].value, "TEXT('Kept')");
    assert!(cusnam.attributes[0].indicators.is_empty());
}

#[test]
fn test_remove_nothing_is_refused() {
    let (doc, _) = inquiry();
    assert!(remove_keywords(&doc, &[]).is_err());
}

#[test]
fn test_delete_middle_field_keeps_neighbours() {
    let (doc, file) = inquiry();
    let node = file.node_at_line(18);
    let edits = delete_entity(&doc, &node).unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(updated.text(), without(&[18]));
}

#[test]
fn test_delete_last_record_leaves_no_dangling_line() {
    let doc = DdsDocument::new(INQUIRY.trim_end());
    let file = parse_document(&doc);
    let node = file.node_at_line(11);
    let edits = delete_entity(&doc, &node).unwrap();
    let updated = doc.apply(&edits).unwrap();
    let expected: Vec<&str> = INQUIRY.lines().take(11).collect();
    assert_eq!(updated.text(), expected.join("\n"));
}

#[test]
fn test_delete_whole_document() {
    let (doc, _) = inquiry();
    let edits = delete_block(&doc, 0, doc.line_count() - 1).unwrap();
    assert_eq!(doc.apply(&edits).unwrap().text(), "");
}

#[test]
fn test_set_display_size() {
    let (doc, file) = inquiry();
    let edits = set_file_keyword(&doc, &file, "DSPSIZ(27 132 *DS4 24 80 *DS3)").unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(
        updated.line(1).unwrap(),
        format!("     A{}DSPSIZ(27 132 *DS4 24 80 *DS3)", " ".repeat(38))
    );
    assert_eq!(updated.line_count(), doc.line_count());
    assert_eq!(parse_document(&updated).screen, ScreenSize::WIDE);
}

#[test]
fn test_replace_keyword_inside_shared_attribute() {
    let (doc, file) = inquiry();
    let custno = file.records[1].field("CUSTNO").unwrap();
    let edits = replace_keyword(&doc, custno, "DSPATR", "DSPATR(HI)").unwrap();
    let updated = doc.apply(&edits).unwrap();
    assert_eq!(
        updated.line(16).unwrap(),
        format!("     A  40{}DSPATR(HI)", " ".repeat(34))
    );
}

#[test]
fn test_replace_keyword_after_constant_literal_is_refused() {
    let doc = DdsDocument::new(
        "     A          R REC\n     A                                  2  2'Name:' COLOR(BLU)",
    );
    let file = parse_document(&doc);
    let constant = &file.records[0].constants[0];
    assert!(matches!(
        constant.attributes[0].span,
        AttributeSpan::Inline { column } if column > 44
    ));
    assert!(replace_keyword(&doc, constant, "COLOR", "COLOR(RED)").is_err());
}

#[test]
fn test_render_keyword_lines_with_many_indicators() {
    let indicators: Vec<Indicator> = (1..=7).map(Indicator::on).collect();
    let lines = render_keyword_lines("DSPATR(UL)", &indicators).unwrap();
    assert_eq!(
        lines,
        vec![
            "     A  01 02 03".to_string(),
            "     AA 04 05 06".to_string(),
            format!("     AA 07{}DSPATR(UL)", " ".repeat(34)),
        ]
    );
}
