use crate::{
    cli::{args::RunArgs, handlers::commons},
    models::{ProcessEvent, RunRequest},
};
use anyhow::Result;
use colored::*;
use std::collections::HashMap;

///
/// Main entry point for the 'run' command.
/// Launches every requested script, streams their output until all of them have exited and
/// stops the whole set on Ctrl+C. Returns whether every script exited with code 0.
///
pub async fn handle(args: RunArgs) -> Result<bool> {
    let project_dir = commons::resolve_project_dir(&args.dir)?;
    let project_name = args
        .name
        .clone()
        .unwrap_or_else(|| commons::project_name_for(&project_dir));
    let (manager, mut events) = commons::open_manager()?;

    // 1. Launch everything first; launching never waits on a child.
    let mut labels = HashMap::new();
    for script in &args.scripts {
        let response = manager.run(RunRequest {
            working_dir: project_dir.clone(),
            script_name: script.clone(),
            project_name: project_name.clone(),
            shell: args.shell.clone(),
        });
        println!(
            "{} {} {} {}",
            "→".blue(),
            format!("{}/{}", response.project_name, response.script_name).green(),
            "via".dimmed(),
            response.shell.dimmed()
        );
        labels.insert(response.id, script.clone());
    }

    // 2. Follow the event stream until every id has reported its exit.
    let mut lines = commons::LineAssembler::new();
    let mut failures = 0usize;
    let mut interrupted = false;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    while !labels.is_empty() {
        tokio::select! {
            event = events.recv() => match event {
                Some(ProcessEvent::Log { id, kind, data }) => {
                    let label = labels.get(&id).map(String::as_str).unwrap_or("?");
                    for line in lines.push(id, kind, &data) {
                        commons::print_line(label, kind, &line);
                    }
                }
                Some(ProcessEvent::Exit { id, code }) => {
                    let Some(label) = labels.remove(&id) else { continue };
                    for (kind, rest) in lines.flush(id) {
                        commons::print_line(&label, kind, &rest);
                    }
                    let code_text = code.map_or_else(|| "none".to_string(), |c| c.to_string());
                    if code == Some(0) {
                        println!("{} {} {}", "✓".green(), label.green(), "exited with code 0".dimmed());
                    } else {
                        failures += 1;
                        println!("{} {} exited with code {}", "✗".red(), label.red(), code_text.yellow());
                    }
                }
                None => break,
            },
            result = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                if let Err(e) = result {
                    log::warn!("Failed to listen for Ctrl+C: {}", e);
                    continue;
                }
                let stopped = manager.stop_all();
                println!("\n{}", format!("Stopping {} running process(es)...", stopped).yellow());
            }
        }
    }

    Ok(failures == 0 && !interrupted)
}
