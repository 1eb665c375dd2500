// src/system/shell.rs

use crate::{
    constants::{
        POSIX_FALLBACK_SHELL, POSIX_LAST_RESORT_SHELL, POSIX_SHELL_CANDIDATES,
        SYNTHETIC_SHELL_NAME, SYSTEM_DEFAULT_SHELL_NAME, WINDOWS_FALLBACK_SHELL,
        WINDOWS_SHELL_CANDIDATES,
    },
    core::preferences::{PreferenceStore, StoreError},
    models::ShellDescriptor,
    system::platform::PlatformHandler,
};
use std::{fs, path::Path, sync::Arc};

/// Chooses and enumerates command interpreters.
///
/// Holds no durable state: the preference lives in the [`PreferenceStore`], the platform
/// knowledge in the [`PlatformHandler`].
#[derive(Debug, Clone)]
pub struct ShellResolver {
    platform: Arc<dyn PlatformHandler>,
    store: Arc<dyn PreferenceStore>,
}

impl ShellResolver {
    pub fn new(platform: Arc<dyn PlatformHandler>, store: Arc<dyn PreferenceStore>) -> Self {
        Self { platform, store }
    }

    pub fn default_shell(&self) -> String {
        self.platform.default_shell()
    }

    pub fn available_shells(&self) -> Vec<ShellDescriptor> {
        self.platform.enumerate_shells()
    }

    /// The stored preference, or the platform default when none is stored or the store
    /// cannot be read.
    pub fn preference(&self) -> String {
        match self.store.load() {
            Ok(settings) => settings
                .shell_preference
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| self.default_shell()),
            Err(e) => {
                log::warn!("Could not read shell preference, using default: {}", e);
                self.default_shell()
            }
        }
    }

    pub fn set_preference(&self, shell_path: &str) -> Result<(), StoreError> {
        let mut settings = self.store.load()?;
        settings.shell_preference = Some(shell_path.to_string());
        self.store.save(&settings)
    }

    /// Explicit override, else the stored preference, else the platform default.
    pub fn resolve(&self, shell_override: Option<&str>) -> String {
        match shell_override.map(str::trim).filter(|s| !s.is_empty()) {
            Some(shell) => shell.to_string(),
            None => self.preference(),
        }
    }
}

// --- Pure resolution rules, shared by the platform handlers ---

/// `$SHELL`, or `/bin/bash`.
pub fn posix_default_shell(env_shell: Option<&str>) -> String {
    non_empty(env_shell).unwrap_or(POSIX_FALLBACK_SHELL).to_string()
}

/// `%COMSPEC%`, or `cmd.exe`.
pub fn windows_default_shell(comspec: Option<&str>) -> String {
    non_empty(comspec).unwrap_or(WINDOWS_FALLBACK_SHELL).to_string()
}

/// Probes the well-known interpreter locations.
///
/// The environment-declared shell comes first when it exists; each path appears at most
/// once; the first location found for an interpreter wins. If nothing is found a single
/// synthetic entry is returned so the list is never empty.
pub fn posix_shells(env_shell: Option<&str>, exists: impl Fn(&Path) -> bool) -> Vec<ShellDescriptor> {
    let mut shells: Vec<ShellDescriptor> = Vec::new();

    if let Some(default) = non_empty(env_shell) {
        if exists(Path::new(default)) {
            shells.push(ShellDescriptor::new(SYSTEM_DEFAULT_SHELL_NAME, default));
        }
    }

    for (name, locations) in POSIX_SHELL_CANDIDATES {
        if let Some(found) = locations.iter().find(|p| exists(Path::new(p))) {
            if !shells.iter().any(|s| s.path == *found) {
                shells.push(ShellDescriptor::new(*name, *found));
            }
        }
    }

    if shells.is_empty() {
        let fallback = non_empty(env_shell).unwrap_or(POSIX_LAST_RESORT_SHELL);
        shells.push(ShellDescriptor::new(SYNTHETIC_SHELL_NAME, fallback));
    }
    shells
}

/// The fixed Windows list plus `%COMSPEC%` when it names something else.
pub fn windows_shells(comspec: Option<&str>) -> Vec<ShellDescriptor> {
    let mut shells: Vec<ShellDescriptor> = WINDOWS_SHELL_CANDIDATES
        .iter()
        .map(|(name, path)| ShellDescriptor::new(*name, *path))
        .collect();

    if let Some(comspec) = non_empty(comspec) {
        let comspec_file = file_name_lowercase(comspec);
        let duplicate = shells
            .iter()
            .any(|s| s.path.eq_ignore_ascii_case(comspec) || s.path == comspec_file);
        if !duplicate {
            shells.push(ShellDescriptor::new(SYSTEM_DEFAULT_SHELL_NAME, comspec));
        }
    }
    shells
}

/// Existence probe used on real hosts. Any error counts as "not there".
pub fn path_is_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn file_name_lowercase(path: &str) -> String {
    path.rsplit(['\\', '/'])
        .next()
        .unwrap_or(path)
        .to_ascii_lowercase()
}
