// src/cli/handlers/commons.rs

use crate::{
    core::{config_loader, events::EventStream, preferences::JsonPreferenceStore},
    models::{LogKind, ProcessId},
    system::manager::ProcessManager,
};
use anyhow::{Context, Result, anyhow};
use colored::*;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Expands `~` and environment variables in a user-supplied directory and checks it exists.
pub fn resolve_project_dir(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| anyhow!("Failed to expand path '{}': {}", raw, e))?;
    let path = PathBuf::from(expanded.into_owned());
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Project directory '{}' does not exist", raw))?;
    Ok(dunce::simplified(&canonical).to_path_buf())
}

/// Display name for a project directory: its last path component.
pub fn project_name_for(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Builds a manager from the on-disk config and settings.
pub fn open_manager() -> Result<(ProcessManager, EventStream)> {
    let config = config_loader::load_config().context("Failed to load configuration")?;
    let store = JsonPreferenceStore::open_default().context("Failed to open settings")?;
    log::debug!("Using settings at {}", store.path().display());
    Ok(ProcessManager::new(config, Arc::new(store)))
}

/// Re-assembles chunked output into whole lines per (process, stream).
///
/// Chunks are cut wherever the pipe happened to be read; prefixing every chunk would put
/// labels in the middle of lines.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: HashMap<(ProcessId, LogKind), String>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the lines it completed, without their terminators.
    pub fn push(&mut self, id: ProcessId, kind: LogKind, chunk: &str) -> Vec<String> {
        let buffer = self.partial.entry((id, kind)).or_default();
        buffer.push_str(chunk);

        let Some(last_newline) = buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(buffer, rest);
        complete
            .lines()
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect()
    }

    /// Returns whatever is left for `id` once it has exited.
    pub fn flush(&mut self, id: ProcessId) -> Vec<(LogKind, String)> {
        let mut leftovers = Vec::new();
        for kind in [LogKind::Stdout, LogKind::Stderr, LogKind::Info] {
            if let Some(rest) = self.partial.remove(&(id, kind)) {
                if !rest.is_empty() {
                    leftovers.push((kind, rest));
                }
            }
        }
        leftovers
    }
}

/// Prints one line of a process's output with its label.
pub fn print_line(label: &str, kind: LogKind, line: &str) {
    let prefix = format!("[{}]", label).cyan().bold();
    match kind {
        LogKind::Stdout => println!("{} {}", prefix, line),
        LogKind::Stderr => println!("{} {}", prefix, line.red()),
        LogKind::Info => println!("{} {}", prefix, line.dimmed()),
    }
}
