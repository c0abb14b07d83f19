mod bootstrap_helpers;
mod resolve;

use anyhow::Result;
use clap::Parser;
use pkdconf_cli::Cli;

use crate::bootstrap_helpers::init_tracing;
use crate::resolve::run_cli;

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_cli(cli)
}
