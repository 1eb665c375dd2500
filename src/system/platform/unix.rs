// src/system/platform/unix.rs

use super::{KillTarget, PlatformHandler, SpawnRequest};
use crate::{
    constants::FORCE_COLOR_ENV,
    models::ShellDescriptor,
    system::shell::{path_is_file, posix_default_shell, posix_shells},
};
use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;
use std::env;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tokio::runtime::Handle;

/// Process groups and signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixPlatform;

impl PlatformHandler for UnixPlatform {
    fn default_shell(&self) -> String {
        posix_default_shell(env::var("SHELL").ok().as_deref())
    }

    fn enumerate_shells(&self) -> Vec<ShellDescriptor> {
        posix_shells(env::var("SHELL").ok().as_deref(), path_is_file)
    }

    fn spawn(&self, request: &SpawnRequest<'_>) -> io::Result<Child> {
        let mut command = StdCommand::new(request.shell);
        command
            .arg("-c")
            .arg(request.command_line)
            .current_dir(dunce::simplified(request.working_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Own group: the pid doubles as the pgid every descendant inherits.
            .process_group(0);

        if request.force_color {
            command.envs(FORCE_COLOR_ENV.iter().copied());
        }
        command.envs(request.env);

        let mut command = Command::from(command);
        command.kill_on_drop(false);
        command.spawn()
    }

    fn terminate(&self, target: KillTarget, _runtime: &Handle) {
        let Some(pid) = target.pid.and_then(|p| i32::try_from(p).ok()).filter(|p| *p > 0) else {
            log::warn!("Tracked process has no usable pid; killing the leader directly.");
            target.kill_leader();
            return;
        };
        let pid = Pid::from_raw(pid);

        match killpg(pid, Signal::SIGTERM) {
            Ok(()) => log::debug!("Sent SIGTERM to process group {}", pid),
            Err(group_err) if target.leader_reaped => {
                log::debug!("Process group {} is gone ({}); nothing left to signal.", pid, group_err);
            }
            Err(group_err) => {
                log::debug!(
                    "Signaling process group {} failed ({}); signaling the leader.",
                    pid,
                    group_err
                );
                if let Err(e) = kill(pid, Signal::SIGTERM) {
                    log::warn!("Failed to signal process {}: {}", pid, e);
                }
            }
        }
    }

    fn termination_signal(&self, status: &ExitStatus) -> Option<String> {
        status.signal().map(|raw| {
            Signal::try_from(raw)
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|_| format!("signal {}", raw))
        })
    }
}
