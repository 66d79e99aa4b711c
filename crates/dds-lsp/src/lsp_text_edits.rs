//! Minimal helpers for moving edits between `dds-core` and LSP `TextEdit` / `WorkspaceEdit`
//! structures.
//!
//! Core edits use char offsets against one snapshot; LSP edits use UTF-16 line/character
//! positions. Both describe non-overlapping ranges of the same pre-edit text, so a conversion
//! never has to account for earlier edits shifting later ones.

use crate::lsp_sync::{LspCoordinateConverter, LspRange};
use dds_core::{DdsDocument, EditError, EditSet, TextEdit};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A minimal representation of an LSP `TextEdit`.
pub struct LspTextEdit {
    /// The range to replace (UTF-16 based line/character positions).
    pub range: LspRange,
    /// Replacement text (may contain newlines).
    pub new_text: String,
}

impl LspTextEdit {
    /// Parse a `TextEdit`-shaped JSON value.
    pub fn from_value(value: &Value) -> Option<Self> {
        let range = LspRange::from_value(value.get("range")?)?;
        let new_text = value
            .get("newText")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        Some(Self { range, new_text })
    }

    /// Render as a `TextEdit` JSON value.
    pub fn to_value(&self) -> Value {
        json!({ "range": self.range.to_value(), "newText": self.new_text })
    }
}

/// Parse a JSON array of `TextEdit` values. Malformed entries are skipped.
pub fn text_edits_from_value(value: &Value) -> Vec<LspTextEdit> {
    value
        .as_array()
        .map(|arr| arr.iter().filter_map(LspTextEdit::from_value).collect())
        .unwrap_or_default()
}

/// Render LSP edits as a JSON array.
pub fn text_edits_to_value(edits: &[LspTextEdit]) -> Value {
    Value::Array(edits.iter().map(LspTextEdit::to_value).collect())
}

/// Convert core edits into LSP edits against the same snapshot, in ascending order.
pub fn lsp_text_edits(document: &DdsDocument, edits: &EditSet) -> Vec<LspTextEdit> {
    edits
        .edits()
        .iter()
        .map(|edit| LspTextEdit {
            range: LspCoordinateConverter::range(document, &edit.range),
            new_text: edit.new_text.clone(),
        })
        .collect()
}

/// Resolve host-supplied LSP edits against `document` into a core edit set.
pub fn edit_set_from_lsp(
    document: &DdsDocument,
    edits: &[LspTextEdit],
) -> Result<EditSet, EditError> {
    EditSet::from_edits(edits.iter().map(|edit| {
        TextEdit::replace(
            LspCoordinateConverter::char_range(document, &edit.range),
            edit.new_text.clone(),
        )
    }))
}

/// Build a `WorkspaceEdit` changing one document.
///
/// With a `version` the edit uses `documentChanges` with a versioned `TextDocumentEdit`, so the
/// host can reject it if the document moved on; without one it uses the plain `changes` map.
pub fn workspace_edit(
    uri: &str,
    version: Option<i64>,
    document: &DdsDocument,
    edits: &EditSet,
) -> Value {
    let edits = text_edits_to_value(&lsp_text_edits(document, edits));
    match version {
        Some(version) => json!({
            "documentChanges": [{
                "textDocument": { "uri": uri, "version": version },
                "edits": edits,
            }]
        }),
        None => {
            let mut changes = Map::new();
            changes.insert(uri.to_string(), edits);
            json!({ "changes": changes })
        }
    }
}

/// Extract all `TextEdit`s in a `WorkspaceEdit` for the given `uri`.
///
/// Handles both:
/// - `workspaceEdit.changes[uri]`
/// - `workspaceEdit.documentChanges[]` containing `TextDocumentEdit`
pub fn workspace_edit_text_edits_for_uri(workspace_edit: &Value, uri: &str) -> Vec<LspTextEdit> {
    let mut out = Vec::new();

    if let Some(edits) = workspace_edit
        .get("changes")
        .and_then(Value::as_object)
        .and_then(|changes| changes.get(uri))
    {
        out.extend(text_edits_from_value(edits));
    }

    let document_changes = workspace_edit
        .get("documentChanges")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();
    for change in document_changes {
        let change_uri = change
            .get("textDocument")
            .and_then(|doc| doc.get("uri"))
            .and_then(Value::as_str);
        if change_uri != Some(uri) {
            continue;
        }
        if let Some(edits) = change.get("edits") {
            out.extend(text_edits_from_value(edits));
        }
    }

    out
}
