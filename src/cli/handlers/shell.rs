use crate::cli::{args::ShellArgs, handlers::commons};
use anyhow::Result;
use colored::*;

/// Prints the preferred interpreter, or stores a new one.
pub fn handle(args: ShellArgs) -> Result<()> {
    let (manager, _events) = commons::open_manager()?;

    match args.path {
        Some(path) => {
            manager.set_shell_preference(&path)?;
            println!("{} {}", "Shell preference set to".green(), path.yellow());
        }
        None => println!("{}", manager.get_shell_preference()),
    }
    Ok(())
}
