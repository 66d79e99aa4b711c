//! Plain-text renderings of the outline and of diagnostics.

use dds_core::{DdsFile, DdsNode, Diagnostic, DiagnosticSeverity};
use std::fmt::Write;

fn write_node(out: &mut String, node: &DdsNode<'_>, depth: usize) {
    let _ = write!(out, "{:indent$}{}", "", node.label(), indent = depth * 2);
    if let Some(detail) = node.detail() {
        let _ = write!(out, "  {detail}");
    }
    if let Some((start, end)) = node.line_span() {
        if start == end {
            let _ = write!(out, "  [{}]", start + 1);
        } else {
            let _ = write!(out, "  [{}-{}]", start + 1, end + 1);
        }
    }
    out.push('\n');
    for child in node.children() {
        write_node(out, &child, depth + 1);
    }
}

/// Indented outline of the file, one entity per line with its 1-based line span.
pub fn outline_text(file: &DdsFile) -> String {
    let mut out = String::new();
    for node in DdsNode::File(file).children() {
        write_node(&mut out, &node, 0);
    }
    out
}

/// `path:line:column: severity[code]: message` lines with 1-based positions.
pub fn check_text(path: &str, diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        let _ = writeln!(
            out,
            "{path}:{}:{}: {severity}[{}]: {}",
            diagnostic.range.line + 1,
            diagnostic.range.start + 1,
            diagnostic.code,
            diagnostic.message
        );
    }
    if diagnostics.is_empty() {
        let _ = writeln!(out, "{path}: no problems found");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn outline_lists_groups_and_spans() {
        let file = dds_core::parse(concat!(
            "     A                                      DSPSIZ(24 80 *DS3)\n",
            "     A          R MAIN\n",
            "     A            CUSNAM        20A  B  5 10\n",
            "     A                                  1  2'Name'",
        ));
        let expected = concat!(
            "DSPSIZ(24 80 *DS3)  [1]\n",
            "MAIN  [2-4]\n",
            "  Fields\n",
            "    CUSNAM  A(20) B @ 5,10  [3]\n",
            "  Constants\n",
            "    'Name'  @ 1,2  [4]\n",
        );
        assert_eq!(outline_text(&file), expected);
    }

    #[test]
    fn check_text_uses_one_based_positions() {
        let file = dds_core::parse(concat!(
            "     A          R MAIN\n",
            "     A            CUSNAM        20A  B  5 10\n",
            "     A            CUSNAM        20A  B  6 10",
        ));
        let report = check_text("main.dds", &dds_core::diagnose(&file));
        assert!(report.starts_with("main.dds:3:19: error[duplicate-name]: "));
        assert_eq!(check_text("ok.dds", &[]), "ok.dds: no problems found\n");
    }
}
