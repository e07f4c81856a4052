// jimage-extract entry point
use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod commands;
mod config;
mod logging;

use config::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Info(args) => commands::info(&args.resolve_path()?),
        Command::List(args) => commands::list(&args.resolve()?),
        Command::Extract { args, out } => commands::extract(&args.resolve()?, &out),
    }
}
