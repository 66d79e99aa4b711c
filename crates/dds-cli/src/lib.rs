#![warn(missing_docs)]
//! DDS CLI - the `ddsedit` command-line host for `dds-core`
//!
//! Every subcommand reads one DDS source file, parses it, and either reports on it or computes a
//! single edit set against that snapshot. Edits are printed as the updated source, written back
//! with `--write`, or emitted as an LSP `WorkspaceEdit` with `--format json`.
//!
//! # Binary Usage
//!
//! ```bash
//! # Outline and checks
//! ddsedit outline inquiry.dds
//! ddsedit check inquiry.dds --format json
//!
//! # Structural edits (targets: 15, DETAIL, DETAIL.CUSTNO, *)
//! ddsedit rename inquiry.dds DETAIL.CUSTNO CUSTID --write
//! ddsedit move inquiry.dds DETAIL.BALANCE 6 13
//! ddsedit keyword add inquiry.dds DETAIL.CUSNAM "DSPATR(HI)" -i 40 -i N41
//! ddsedit keyword remove inquiry.dds DETAIL.CUSTNO DSPATR
//! ddsedit sort inquiry.dds DETAIL
//!
//! # Any interactive command, answering its prompts in order
//! ddsedit run inquiry.dds add-field --at DETAIL -a AMOUNT -a S -a 9 -a 2 -a O -a 7 -a 13
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

mod app;
mod plan;
mod report;
mod target;

pub use app::{
    Cli, Commands, EditCommand, EditIo, KeywordAction, OutputFormat, Report, execute,
    init_tracing, run_cli,
};
pub use plan::plan;
pub use report::{check_text, outline_text};
pub use target::Target;
