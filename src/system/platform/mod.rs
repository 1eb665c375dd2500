//! # Platform Handlers
//!
//! Everything that differs between POSIX and Windows hosts sits behind [`PlatformHandler`]:
//! how an interpreter is asked to run a command string, how a process tree is terminated,
//! and which interpreters exist. The handler for the host is picked once by [`current`].
//!
//! - **POSIX**: the child leads its own process group, so one signal to the negated pid
//!   reaches every descendant.
//! - **Windows**: no group is created; the tree is queried and killed with `taskkill` at
//!   stop time.

use crate::models::ShellDescriptor;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::process::Child;
use tokio::runtime::Handle;
use tokio::sync::oneshot;

#[cfg(unix)]
pub mod unix;
#[cfg(windows)]
pub mod windows;

/// Parameters of a single spawn.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest<'a> {
    pub shell: &'a str,
    /// Handed to the interpreter as one string; the interpreter does the splitting.
    pub command_line: &'a str,
    pub working_dir: &'a Path,
    pub env: &'a HashMap<String, String>,
    pub force_color: bool,
}

/// What a termination needs to reach a tracked process.
#[derive(Debug)]
pub struct KillTarget {
    pub pid: Option<u32>,
    /// The leader is gone. Only its group may still be signaled; the bare pid is not ours.
    pub leader_reaped: bool,
    /// Asks the watcher task to kill the leader through its own handle.
    pub kill_switch: Option<oneshot::Sender<()>>,
}

impl KillTarget {
    /// Fallback used when the tree-wide mechanism could not be applied.
    pub fn kill_leader(self) {
        match self.kill_switch {
            Some(switch) => {
                if switch.send(()).is_err() {
                    log::debug!("Watcher already finished; nothing left to kill.");
                }
            }
            None => log::debug!("No kill switch available for direct termination."),
        }
    }
}

/// Host-specific process operations.
pub trait PlatformHandler: Send + Sync + fmt::Debug {
    /// The host's standard interpreter, derived from the environment.
    fn default_shell(&self) -> String;

    /// Interpreters present on the host. Never empty.
    fn enumerate_shells(&self) -> Vec<ShellDescriptor>;

    /// Starts `request.command_line` inside `request.shell` with stdin closed and both
    /// output streams piped.
    fn spawn(&self, request: &SpawnRequest<'_>) -> io::Result<Child>;

    /// Issues a best-effort termination of the process and its descendants. Returns as soon
    /// as the request is issued; failures are logged, never returned.
    fn terminate(&self, target: KillTarget, runtime: &Handle);

    /// Name of the signal that ended the process, if any.
    fn termination_signal(&self, status: &ExitStatus) -> Option<String>;
}

/// The handler for the host this binary was built for.
#[cfg(unix)]
pub fn current() -> Arc<dyn PlatformHandler> {
    Arc::new(unix::UnixPlatform)
}

/// The handler for the host this binary was built for.
#[cfg(windows)]
pub fn current() -> Arc<dyn PlatformHandler> {
    Arc::new(windows::WindowsPlatform)
}

/// "Run this string" flag of a Windows interpreter.
pub fn windows_exec_flag(shell: &str) -> &'static str {
    let file_name = shell
        .rsplit(['\\', '/'])
        .next()
        .unwrap_or(shell)
        .to_ascii_lowercase();
    if file_name.starts_with("powershell") || file_name.starts_with("pwsh") {
        "-Command"
    } else {
        "/C"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_exec_flag() {
        assert_eq!(windows_exec_flag("cmd.exe"), "/C");
        assert_eq!(windows_exec_flag(r"C:\Windows\System32\cmd.exe"), "/C");
        assert_eq!(windows_exec_flag("powershell.exe"), "-Command");
        assert_eq!(windows_exec_flag(r"C:\Program Files\PowerShell\7\pwsh.exe"), "-Command");
        assert_eq!(windows_exec_flag("PWSH"), "-Command");
    }

    #[test]
    fn test_current_platform_lists_at_least_one_shell() {
        let platform = current();
        assert!(!platform.enumerate_shells().is_empty());
        assert!(!platform.default_shell().is_empty());
    }

    #[tokio::test]
    async fn test_kill_leader_fires_switch() {
        let (tx, rx) = oneshot::channel();
        let target = KillTarget {
            pid: None,
            leader_reaped: false,
            kill_switch: Some(tx),
        };
        target.kill_leader();
        assert!(rx.await.is_ok());
    }
}
