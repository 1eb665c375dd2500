use crate::{
    cli::{args::ScriptsArgs, handlers::commons},
    core::scripts,
};
use anyhow::Result;
use colored::*;

/// Lists the scripts a project declares.
pub fn handle(args: ScriptsArgs) -> Result<()> {
    let project_dir = commons::resolve_project_dir(args.dir.as_deref().unwrap_or("."))?;
    let scripts = scripts::project_scripts(&project_dir)?;

    if scripts.is_empty() {
        println!("{}", "No scripts found.".yellow());
        return Ok(());
    }
    for (name, command) in &scripts {
        println!("{:<20} {}", name.cyan(), command.dimmed());
    }
    Ok(())
}
