mod cli;
mod error;
mod replay;
mod report;
mod rules;
mod scenario;
mod transport;

use std::process::ExitCode;

use clap::Parser;
use simplelog::{Config, WriteLogger};

use crate::cli::{Cli, Cmd};
use crate::error::CliError;
use crate::replay::{replay, Remote};
use crate::scenario::Scenario;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    WriteLogger::init(cli.log_level, Config::default(), std::io::stderr())?;

    match cli.cmd {
        Cmd::Run {
            scenario,
            pretty,
            live,
        } => {
            let scenario = Scenario::load(&scenario)?;
            let remote = if live { Remote::Live } else { Remote::Scripted };
            let report = replay(scenario, remote).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", json);
        }
        Cmd::Check { scenario: path } => {
            let scenario = Scenario::load(&path)?;
            scenario.check()?;
            println!(
                "{}: ok ({} validators, {} events)",
                path.display(),
                scenario.validators.len(),
                scenario.events.len()
            );
        }
    }
    Ok(())
}
