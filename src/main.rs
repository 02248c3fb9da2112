use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rapi::cli;

fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("rapi=debug,info")
    } else {
        EnvFilter::new("rapi=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Align(args) => {
            cli::align::run(args, cli.verbose)?;
        }
        cli::Commands::Compare(args) => {
            if !cli::compare::run(args, cli.format, cli.verbose)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        cli::Commands::Ref(args) => {
            cli::reference::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Info(args) => {
            cli::info::run(args, cli.format)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
