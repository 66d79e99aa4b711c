#![warn(missing_docs)]
//! DDS Core - column-positional parsing and reconstruction for DDS display files
//!
//! # Overview
//!
//! `dds-core` is the headless engine behind a DDS (Data Description Specifications)
//! display-file editor. DDS source is fixed-column text: every semantic value lives at a fixed
//! character range of an 80-column line. This crate reads that text into an entity model and
//! turns structural edits (rename, move, add keyword, sort, ...) back into minimal text edits,
//! without ever disturbing bytes it was not asked to change.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Workflows (Prompter, run_command)          │  ← Interactive commands
//! ├─────────────────────────────────────────────┤
//! │  Model Cache + Debounced Session            │  ← When to reparse
//! ├─────────────────────────────────────────────┤
//! │  Reconstructor / Validator                  │  ← Model → EditSet
//! ├─────────────────────────────────────────────┤
//! │  Structural Parser + Line Classifier        │  ← Lines → DdsFile
//! ├─────────────────────────────────────────────┤
//! │  Column Schema + DdsDocument (Rope)         │  ← Columns and offsets
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use dds_core::{DdsDocument, parse_document, reconstruct};
//!
//! let document = DdsDocument::new(
//!     "     A          R MAIN\n     A            CUSNAM        20A  B  5 10",
//! );
//! let file = parse_document(&document);
//! let field = &file.records[0].fields[0];
//!
//! let edits = reconstruct::add_keyword(&document, field, "COLOR(BLU)", &[]).unwrap();
//! let updated = document.apply(&edits).unwrap();
//! assert!(updated.text().ends_with("5 10COLOR(BLU)"));
//! ```
//!
//! # Module Description
//!
//! - [`schema`] - Column table and padded read/write primitives
//! - [`classify`] - Line kind classification
//! - [`parser`] - Single-pass structural parser
//! - [`model`] - Records, fields, constants, keywords, indicators
//! - [`document`] - Rope-backed text snapshot
//! - [`edit`] - Character-range edits and edit sets
//! - [`reconstruct`] - Model-to-text edit computation
//! - [`validate`] - Overlap and screen checks, diagnostics
//! - [`cache`] / [`debounce`] - Parsed model cache and reparse scheduling
//! - [`settings`] - `ddsedit.toml`
//! - [`workflow`] - Prompt-driven editing commands

pub mod cache;
pub mod classify;
pub mod debounce;
pub mod document;
pub mod edit;
pub mod model;
pub mod parser;
pub mod reconstruct;
pub mod schema;
pub mod settings;
pub mod validate;
pub mod workflow;

pub use cache::{DocumentId, DocumentSession, ModelCache};
pub use classify::{LineKind, classify};
pub use debounce::Debouncer;
pub use document::{DdsDocument, LineEnding};
pub use edit::{EditError, EditSet, TextEdit};
pub use model::{
    Attribute, AttributeSpan, Constant, DdsFile, DdsNode, Element, ElementKind, Field,
    FieldType, GroupKind, Indicator, Record, ScreenPosition, ScreenSize, Usage,
};
pub use parser::{parse, parse_document, parse_lines};
pub use reconstruct::{Anchor, KeywordOwner, ReconstructError};
pub use settings::{Settings, SettingsError};
pub use validate::{
    Diagnostic, DiagnosticRange, DiagnosticSeverity, Placement, diagnose, fits_on_screen,
    is_available, is_available_excluding,
};
pub use workflow::{
    Command, CommandContext, Notification, Prompter, WorkflowError, run_command,
};
