use anyhow::Result;
use clap::Parser;
use countlines::cli::Cli;
use countlines::logging;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.common.verbose, cli.common.quiet);
    cli.execute()
}
