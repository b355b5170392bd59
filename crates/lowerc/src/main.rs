//! lowerc - component template lowering compiler.

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod input;
mod orchestrator;
mod output;

use cli::Args;
use orchestrator::Orchestrator;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "LOWERC_LOG";

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up miette for nice error output
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let workspace = args
        .workspace
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let fail_on_warning = args.fail_on_warning;

    let orchestrator = Orchestrator::new(workspace, args)?;
    let result = orchestrator.run()?;

    if result.is_failure(fail_on_warning) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
