#![warn(missing_docs)]
//! `dds-lsp` - LSP integration for `dds-core`.
//!
//! This crate converts between the core's char-offset [`dds_core::EditSet`]s and LSP JSON
//! (UTF-16 positions), applies `textDocument/didChange` payloads to a
//! [`dds_core::DocumentSession`], and renders the parsed model as `DocumentSymbol` outlines and
//! `publishDiagnostics` parameters. It does not pull in `lsp-types`; payloads are plain
//! `serde_json::Value`s.

pub mod lsp_diagnostics;
pub mod lsp_symbols;
pub mod lsp_sync;
pub mod lsp_text_edits;

pub use lsp_diagnostics::{lsp_diagnostics, publish_diagnostics_params};
pub use lsp_symbols::{SymbolKind, document_symbols, symbol_kind};
pub use lsp_sync::{LspCoordinateConverter, LspPosition, LspRange, apply_content_changes};
pub use lsp_text_edits::{
    LspTextEdit, edit_set_from_lsp, lsp_text_edits, text_edits_from_value, text_edits_to_value,
    workspace_edit, workspace_edit_text_edits_for_uri,
};
