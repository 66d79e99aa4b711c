//! `ddsedit` binary entry point.

use anyhow::Result;
use dds_cli::{init_tracing, run_cli};

fn main() -> Result<()> {
    init_tracing();
    run_cli()
}
