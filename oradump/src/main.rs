//! Oracle schema dumper.
//!
//! Writes every configured schema as a tree of replayable DDL scripts.

use oradump::{parse_args, run};
use oradump_core::{Result, init_logging};

fn main() -> Result<()> {
    let (cli, ignored) = parse_args(std::env::args_os());

    init_logging(cli.global.verbose, cli.global.quiet)?;

    for arg in &ignored {
        tracing::warn!("Ignoring unrecognized argument: {}", arg);
    }

    let summary = run(&cli)?;

    if !cli.global.quiet {
        println!(
            "Dumped {} objects from {} schemas ({} failed objects, {} aborted schemas)",
            summary.objects_dumped(),
            summary.schemas.len(),
            summary.objects_failed(),
            summary.schemas_aborted()
        );
    }

    Ok(())
}
