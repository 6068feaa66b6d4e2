use std::path::PathBuf;

use clap::{Parser, Subcommand};
use simplelog::LevelFilter;

#[derive(Parser)]
#[command(name = "flexforms", version, about = "Replay form validation scenarios")]
pub struct Cli {
    /// Log level written to stderr
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Replay a scenario and print the resulting form state as JSON
    Run {
        scenario: PathBuf,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
        /// Send remote submissions over HTTP instead of the scripted reply
        #[arg(long)]
        live: bool,
    },
    /// Parse and check a scenario without running it
    Check { scenario: PathBuf },
}
