//! Setmeta CLI: set, update or delete object metadata in the local object store.

use anyhow::Result;
use clap::Parser;
use setmeta::engine::arg_parser::Cli;
use setmeta::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
