// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::constants::DEFAULT_RUN_COMMAND;

// --- PROCESS IDENTITY ---

/// Opaque identifier of a tracked child process. Generated once per launch and never reused.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProcessId(Uuid);

impl ProcessId {
    /// Generates a fresh, random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProcessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ProcessId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// --- BOUNDARY MODELS ---

/// Read-only snapshot of a running process, as returned by `list_running`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub id: ProcessId,
    pub project_name: String,
    pub script_name: String,
    pub shell: String,
}

/// A discoverable command interpreter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShellDescriptor {
    pub name: String,
    pub path: String,
}

impl ShellDescriptor {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The stream a log line came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Stdout,
    Stderr,
    Info,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification pushed to the subscriber. `Exit` is always the last event for an id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ProcessEvent {
    Log {
        id: ProcessId,
        #[serde(rename = "type")]
        kind: LogKind,
        data: String,
    },
    Exit {
        id: ProcessId,
        /// `None` when the child was terminated by a signal or never started.
        code: Option<i32>,
    },
}

impl ProcessEvent {
    pub fn id(&self) -> ProcessId {
        match self {
            Self::Log { id, .. } | Self::Exit { id, .. } => *id,
        }
    }
}

/// Everything needed to launch one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub working_dir: PathBuf,
    pub script_name: String,
    /// Display name of the owning project.
    pub project_name: String,
    /// Explicit interpreter; wins over the stored preference and the platform default.
    pub shell: Option<String>,
}

/// What `launch` hands back: the id to follow and the interpreter actually used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReceipt {
    pub id: ProcessId,
    pub shell: String,
}

/// Structured answer of the `run` boundary operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunResponse {
    pub success: bool,
    pub id: ProcessId,
    pub project_name: String,
    pub script_name: String,
    pub shell: String,
}

/// Structured answer of the `stop` boundary operation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StopResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<E: fmt::Display> From<Result<(), E>> for StopResponse {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

// --- PERSISTED MODELS ---

/// Contents of the key-value settings file. Keys owned by other components are carried
/// through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub shell_preference: Option<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Represents the deserialized structure of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ManagerConfig {
    /// Prefix of the command line; the script name is appended after a space.
    pub run_command: String,
    /// Inject color-forcing variables on POSIX hosts.
    pub force_color: bool,
    /// Extra environment for every child.
    pub env: HashMap<String, String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            run_command: DEFAULT_RUN_COMMAND.to_string(),
            force_color: true,
            env: HashMap::new(),
        }
    }
}

impl ManagerConfig {
    /// Builds the single command string handed to the interpreter.
    pub fn command_line(&self, script_name: &str) -> String {
        let prefix = self.run_command.trim();
        if prefix.is_empty() {
            script_name.to_string()
        } else {
            format!("{} {}", prefix, script_name)
        }
    }
}
