//! `textDocument/publishDiagnostics` payloads from [`dds_core::diagnose`] results.

use crate::lsp_sync::LspCoordinateConverter;
use dds_core::{DdsDocument, Diagnostic, DiagnosticSeverity};
use serde_json::{Value, json};

/// Diagnostic `source` reported to the host.
pub const SOURCE: &str = "dds";

fn severity(severity: DiagnosticSeverity) -> u8 {
    match severity {
        DiagnosticSeverity::Error => 1,
        DiagnosticSeverity::Warning => 2,
    }
}

/// Render diagnostics as an LSP `Diagnostic[]` array.
pub fn lsp_diagnostics(document: &DdsDocument, diagnostics: &[Diagnostic]) -> Value {
    Value::Array(
        diagnostics
            .iter()
            .map(|diagnostic| {
                let range = LspCoordinateConverter::line_range(
                    document,
                    diagnostic.range.line,
                    diagnostic.range.start,
                    diagnostic.range.end,
                );
                json!({
                    "range": range.to_value(),
                    "severity": severity(diagnostic.severity),
                    "code": diagnostic.code,
                    "source": SOURCE,
                    "message": diagnostic.message,
                })
            })
            .collect(),
    )
}

/// Build `PublishDiagnosticsParams` for one document.
pub fn publish_diagnostics_params(
    uri: &str,
    version: Option<i64>,
    document: &DdsDocument,
    diagnostics: &[Diagnostic],
) -> Value {
    let mut params = json!({
        "uri": uri,
        "diagnostics": lsp_diagnostics(document, diagnostics),
    });
    if let Some(version) = version {
        params["version"] = json!(version);
    }
    params
}
