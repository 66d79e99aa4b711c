//! Command-line surface and file handling.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dds_core::{
    Command, DdsDocument, DiagnosticSeverity, Indicator, Settings, diagnose, parse_document,
};

use crate::plan::plan;
use crate::report::{check_text, outline_text};
use crate::target::Target;

/// How results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text: the outline, a diagnostic list or the edited source.
    #[default]
    Text,
    /// LSP-shaped JSON: `DocumentSymbol[]`, `Diagnostic[]` or a `WorkspaceEdit`.
    Json,
}

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "ddsedit")]
#[command(author, version, about = "Inspect and restructure DDS display files", long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the record/field/constant outline
    Outline {
        /// DDS source file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Report overlaps, off-screen elements and bad names; fails when errors are found
    Check {
        /// DDS source file
        input: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Fail on warnings too
        #[arg(long)]
        strict: bool,
    },

    /// Subcommands that change the source.
    #[command(flatten)]
    Edit(EditCommand),
}

/// Where an edit reads from and where its result goes.
#[derive(Debug, Clone, Args)]
pub struct EditIo {
    /// DDS source file
    pub input: PathBuf,

    /// Write the result back to the input file instead of printing it
    #[arg(short, long)]
    pub write: bool,

    /// Print the edited source (text) or the edits as an LSP WorkspaceEdit (json)
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Subcommands that change the source.
#[derive(Debug, Subcommand)]
pub enum EditCommand {
    /// Rename a record format or field
    Rename {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Line number, RECORD or RECORD.FIELD
        target: Target,
        /// New name
        name: String,
    },

    /// Move a field or constant to a new row and column
    Move {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Line number, RECORD or RECORD.FIELD
        target: Target,
        /// New row
        row: u32,
        /// New column
        column: u32,
        /// Skip the overlap and screen-size checks
        #[arg(long)]
        force: bool,
    },

    /// Change a field's length and decimal positions
    Resize {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Line number or RECORD.FIELD
        target: Target,
        /// New length
        length: u32,
        /// New decimal positions (kept when omitted)
        #[arg(short, long)]
        decimals: Option<u8>,
        /// Skip the overlap and screen-size checks
        #[arg(long)]
        force: bool,
    },

    /// Add or remove keywords
    Keyword {
        #[command(subcommand)]
        action: KeywordAction,
    },

    /// Reorder a record's fields and constants by row, then column
    Sort {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Record name or a line inside the record
        target: Target,
    },

    /// Copy a record, field or constant
    Copy {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Line number, RECORD or RECORD.FIELD
        target: Target,
        /// Name of the copy (records and fields)
        #[arg(short, long)]
        name: Option<String>,
        /// Row of the copy
        #[arg(long)]
        row: Option<u32>,
        /// Column of the copy
        #[arg(long)]
        column: Option<u32>,
        /// New text for a copied constant
        #[arg(long)]
        text: Option<String>,
        /// Skip the overlap and screen-size checks
        #[arg(long)]
        force: bool,
    },

    /// Delete a record, field, constant or file-level keyword with all of its lines
    Delete {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Line number, RECORD or RECORD.FIELD
        target: Target,
    },

    /// Run an interactive command with scripted answers
    Run {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Command id, such as add-field or move
        command: Command,
        /// Line number, RECORD, RECORD.FIELD or * the command starts from
        #[arg(long, default_value = "1")]
        at: Target,
        /// Answers to the command's prompts, in order
        #[arg(short, long = "answer")]
        answers: Vec<String>,
    },
}

/// `keyword` subcommands.
#[derive(Debug, Subcommand)]
pub enum KeywordAction {
    /// Add a keyword, conditioned by up to nine indicators
    Add {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Line number, RECORD, RECORD.FIELD or * for the file level
        target: Target,
        /// Keyword text, such as COLOR(RED)
        keyword: String,
        /// Conditioning indicator (40, N41); repeatable
        #[arg(short, long = "indicator")]
        indicators: Vec<Indicator>,
    },

    /// Remove every keyword with the given names
    Remove {
        /// Input and output.
        #[command(flatten)]
        io: EditIo,
        /// Line number, RECORD, RECORD.FIELD or * for the file level
        target: Target,
        /// Keyword names, such as DSPATR COLOR
        #[arg(required = true)]
        names: Vec<String>,
    },
}

impl EditCommand {
    /// Input and output options of the subcommand.
    pub fn io(&self) -> &EditIo {
        match self {
            Self::Rename { io, .. }
            | Self::Move { io, .. }
            | Self::Resize { io, .. }
            | Self::Sort { io, .. }
            | Self::Copy { io, .. }
            | Self::Delete { io, .. }
            | Self::Run { io, .. } => io,
            Self::Keyword { action } => match action {
                KeywordAction::Add { io, .. } | KeywordAction::Remove { io, .. } => io,
            },
        }
    }
}

/// Text to print and whether the run succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Standard output.
    pub output: String,
    /// Failure message for a run that completed but found problems.
    pub failure: Option<String>,
}

impl Report {
    fn ok(output: String) -> Self {
        Self {
            output,
            failure: None,
        }
    }
}

fn read_source(input: &Path) -> Result<DdsDocument> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;
    Ok(DdsDocument::new(&text))
}

fn settings_for(input: &Path) -> Result<Settings> {
    let dir = input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Settings::discover(dir).context("Failed to load ddsedit.toml")
}

fn file_uri(input: &Path) -> String {
    let path = fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
    format!("file://{}", path.display())
}

fn pretty(value: &serde_json::Value) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    json.push('\n');
    Ok(json)
}

/// Run `command` and return what it prints.
pub fn execute(command: &Commands) -> Result<Report> {
    match command {
        Commands::Outline { input, format } => {
            let document = read_source(input)?;
            let file = parse_document(&document);
            let output = match format {
                OutputFormat::Text => outline_text(&file),
                OutputFormat::Json => pretty(&dds_lsp::document_symbols(&document, &file))?,
            };
            Ok(Report::ok(output))
        }
        Commands::Check {
            input,
            format,
            strict,
        } => {
            let document = read_source(input)?;
            let file = parse_document(&document);
            let diagnostics = diagnose(&file);
            let output = match format {
                OutputFormat::Text => check_text(&input.display().to_string(), &diagnostics),
                OutputFormat::Json => pretty(&dds_lsp::lsp_diagnostics(&document, &diagnostics))?,
            };
            let errors = diagnostics
                .iter()
                .filter(|d| *strict || d.severity == DiagnosticSeverity::Error)
                .count();
            tracing::debug!(total = diagnostics.len(), failing = errors, "checked source");
            let failure = (errors > 0).then(|| format!("{errors} problem(s) in {}", input.display()));
            Ok(Report { output, failure })
        }
        Commands::Edit(edit) => execute_edit(edit),
    }
}

fn execute_edit(command: &EditCommand) -> Result<Report> {
    let io = command.io();
    let document = read_source(&io.input)?;
    let file = parse_document(&document);
    let settings = settings_for(&io.input)?;

    let edits = plan(command, &document, &file, &settings)?;
    let updated = document.apply(&edits).context("Failed to apply edits")?;
    tracing::info!(path = %io.input.display(), edits = edits.len(), "planned edits");

    if io.write {
        fs::write(&io.input, updated.text())
            .with_context(|| format!("Failed to write {}", io.input.display()))?;
    }
    let output = match (io.format, io.write) {
        (OutputFormat::Json, _) => pretty(&dds_lsp::workspace_edit(
            &file_uri(&io.input),
            None,
            &document,
            &edits,
        ))?,
        (OutputFormat::Text, true) => {
            format!("{}: {} edit(s) applied\n", io.input.display(), edits.len())
        }
        (OutputFormat::Text, false) => updated.text(),
    };
    Ok(Report::ok(output))
}

/// Parse the process arguments and run.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let report = execute(&cli.command)?;
    print!("{}", report.output);
    if let Some(failure) = report.failure {
        bail!(failure);
    }
    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (warnings by default).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
