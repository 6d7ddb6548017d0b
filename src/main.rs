//! Scanward command-line entry point.

use anyhow::Result;
use clap::Parser;
use scanward::cli::Cli;
use scanward::logging::{init_logging, LogConfig};
use scanward::output;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings()?;

    let log_config = LogConfig::from_flags(cli.verbose, cli.quiet, &settings.log_level)
        .json(cli.json_logs || settings.json_logs);
    init_logging(&log_config);

    let config = cli.service_config(&settings);
    tracing::debug!(backend = %config.backend, "configuration resolved");

    cli.run(&config).await?;
    Ok(())
}
