// src/system/platform/windows.rs

use super::{KillTarget, PlatformHandler, SpawnRequest, windows_exec_flag};
use crate::{
    models::ShellDescriptor,
    system::shell::{windows_default_shell, windows_shells},
};
use std::env;
use std::io;
use std::os::windows::process::CommandExt;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tokio::runtime::Handle;

/// Keeps console windows of children hidden.
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Hidden consoles and `taskkill` trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPlatform;

impl PlatformHandler for WindowsPlatform {
    fn default_shell(&self) -> String {
        windows_default_shell(env::var("COMSPEC").ok().as_deref())
    }

    fn enumerate_shells(&self) -> Vec<ShellDescriptor> {
        windows_shells(env::var("COMSPEC").ok().as_deref())
    }

    fn spawn(&self, request: &SpawnRequest<'_>) -> io::Result<Child> {
        let mut command = StdCommand::new(request.shell);
        command
            .arg(windows_exec_flag(request.shell))
            // Passed verbatim: the interpreter owns quoting.
            .raw_arg(request.command_line)
            .current_dir(dunce::simplified(request.working_dir))
            .envs(request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .creation_flags(CREATE_NO_WINDOW);

        let mut command = Command::from(command);
        command.kill_on_drop(false);
        command.spawn()
    }

    fn terminate(&self, target: KillTarget, runtime: &Handle) {
        // taskkill walks the tree from the leader's pid, which may already be recycled.
        if target.leader_reaped {
            log::debug!("Leader already exited; its tree can no longer be addressed.");
            return;
        }
        let Some(pid) = target.pid else {
            log::warn!("Tracked process has no pid; killing the leader directly.");
            target.kill_leader();
            return;
        };

        // Fire-and-forget: the registry entry is already gone when this completes.
        runtime.spawn(async move {
            let outcome = Command::new("taskkill")
                .args(["/PID", &pid.to_string(), "/T", "/F"])
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .creation_flags(CREATE_NO_WINDOW)
                .status()
                .await;

            match outcome {
                Ok(status) if status.success() => {
                    log::debug!("taskkill terminated process tree {}", pid);
                }
                Ok(status) => {
                    log::warn!("taskkill for {} exited with {}; killing leader.", pid, status);
                    target.kill_leader();
                }
                Err(e) => {
                    log::warn!("Could not run taskkill for {}: {}; killing leader.", pid, e);
                    target.kill_leader();
                }
            }
        });
    }

    fn termination_signal(&self, _status: &ExitStatus) -> Option<String> {
        None
    }
}
