//! `textDocument/documentSymbol` results for a parsed display file.
//!
//! The outline mirrors [`DdsNode::children`]: file-level keywords and records at the top,
//! keyword/field/constant groups under each record, and keywords and indicators under each
//! element.

use crate::lsp_sync::{LspCoordinateConverter, LspRange};
use dds_core::schema;
use dds_core::{DdsDocument, DdsFile, DdsNode};
use serde_json::{Value, json};

/// The LSP `SymbolKind` values used for DDS entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SymbolKind {
    /// The whole source file.
    File = 1,
    /// A keyword/field/constant group.
    Namespace = 3,
    /// A keyword.
    Property = 7,
    /// A field.
    Field = 8,
    /// A constant.
    Constant = 14,
    /// A conditioning indicator.
    Boolean = 17,
    /// A record format.
    Struct = 23,
}

impl SymbolKind {
    /// The numeric LSP value.
    pub fn to_lsp_kind(self) -> u8 {
        self as u8
    }
}

/// Symbol kind shown for an entity.
pub fn symbol_kind(node: &DdsNode<'_>) -> SymbolKind {
    match node {
        DdsNode::File(_) => SymbolKind::File,
        DdsNode::Record(_) => SymbolKind::Struct,
        DdsNode::Group(..) => SymbolKind::Namespace,
        DdsNode::Field(_) => SymbolKind::Field,
        DdsNode::Constant(_) => SymbolKind::Constant,
        DdsNode::Attribute(_) => SymbolKind::Property,
        DdsNode::Indicator(_) => SymbolKind::Boolean,
    }
}

fn span_range(document: &DdsDocument, start: usize, end: usize) -> Option<LspRange> {
    let from = document.line_start(start)?;
    let to = document.line_end(end)?;
    Some(LspCoordinateConverter::range(document, &(from..to)))
}

/// Inclusive line span covering every child that maps to source lines.
fn children_span(children: &[DdsNode<'_>]) -> Option<(usize, usize)> {
    children
        .iter()
        .filter_map(DdsNode::line_span)
        .reduce(|(a, b), (c, d)| (a.min(c), b.max(d)))
}

fn selection_range(document: &DdsDocument, node: &DdsNode<'_>, range: LspRange) -> LspRange {
    let name_line = match node {
        DdsNode::Record(record) => Some(record.start_index),
        DdsNode::Field(field) => Some(field.line_index),
        _ => None,
    };
    match name_line {
        Some(line) => LspCoordinateConverter::line_range(
            document,
            line,
            schema::NAME.start(),
            schema::NAME.end(),
        ),
        None => range,
    }
}

fn symbol(document: &DdsDocument, node: DdsNode<'_>, parent: Option<LspRange>) -> Option<Value> {
    let children = node.children();
    let span = node.line_span().or_else(|| children_span(&children));
    let range = match span {
        Some((start, end)) => span_range(document, start, end)?,
        None => parent?,
    };
    let children: Vec<Value> = children
        .into_iter()
        .filter_map(|child| symbol(document, child, Some(range)))
        .collect();

    let mut value = json!({
        "name": node.label(),
        "kind": symbol_kind(&node).to_lsp_kind(),
        "range": range.to_value(),
        "selectionRange": selection_range(document, &node, range).to_value(),
        "children": children,
    });
    if let Some(detail) = node.detail() {
        value["detail"] = Value::String(detail);
    }
    Some(value)
}

/// Render `file` as a hierarchical `DocumentSymbol[]` result.
pub fn document_symbols(document: &DdsDocument, file: &DdsFile) -> Value {
    Value::Array(
        DdsNode::File(file)
            .children()
            .into_iter()
            .filter_map(|node| symbol(document, node, None))
            .collect(),
    )
}
