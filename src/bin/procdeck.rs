// src/bin/procdeck.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use procdeck::cli::{Cli, Command, handlers};

/// The main entry point of the `procdeck` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
#[tokio::main]
async fn main() {
    env_logger::init();

    match run_cli(Cli::parse()).await {
        Ok(true) => {}
        // A script failed or was interrupted; its output already told the story.
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Routes the parsed command to its handler. Returns whether the command fully succeeded.
async fn run_cli(cli: Cli) -> Result<bool> {
    log::debug!("CLI args parsed: {:?}", cli);

    match cli.command {
        Command::Run(args) => handlers::run::handle(args).await,
        Command::Shells => handlers::shells::handle().map(|()| true),
        Command::Shell(args) => handlers::shell::handle(args).map(|()| true),
        Command::Scripts(args) => handlers::scripts::handle(args).map(|()| true),
    }
}
