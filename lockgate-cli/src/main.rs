//! lockgate CLI entry point
//!
//! Parses arguments, initialises logging, dispatches to the subcommand
//! handlers and maps errors to process exit codes.

use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use cli::{Cli, Commands};
use output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    if let Err(e) = logging::init_tracing(&args.log_level) {
        eprintln!("error: {e}");
        return ExitCode::from(2);
    }

    let writer = OutputWriter::new(args.output);

    let result = match args.command {
        Commands::Audit(audit_args) => {
            commands::audit::execute(audit_args, &args.config, &writer).await
        }
        Commands::Config(config_args) => {
            commands::config::execute(config_args, &args.config, &writer).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
