use crate::cli::handlers::commons;
use anyhow::Result;
use colored::*;

/// Lists the interpreters found on this host, marking the preferred one.
pub fn handle() -> Result<()> {
    let (manager, _events) = commons::open_manager()?;
    let preferred = manager.get_shell_preference();

    for shell in manager.list_available_shells() {
        let marker = if shell.path == preferred { "*".green().bold() } else { " ".normal() };
        println!("{} {:<16} {}", marker, shell.name.yellow(), shell.path);
    }
    Ok(())
}
