// src/cli/mod.rs

use clap::{Parser, Subcommand};

pub mod args;
pub mod handlers;

use args::{RunArgs, ScriptsArgs, ShellArgs};

/// procdeck: launch project scripts, follow their output and stop whole process trees.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// The available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one or more scripts of a project concurrently and stream their output.
    Run(RunArgs),
    /// List the command interpreters available on this host.
    Shells,
    /// Print the preferred interpreter, or set it when a path is given.
    Shell(ShellArgs),
    /// List the scripts declared in a project's package.json.
    Scripts(ScriptsArgs),
}
