//! # Process Launcher
//!
//! Starts a script inside an interpreter, registers the child and attaches one watcher task
//! per child. The watcher owns the `Child`: it forwards filtered output, waits for the exit,
//! drops the registry entry and emits the final `exit` event.
//!
//! Launching never waits for the child. Spawn failures are reported through the event
//! stream, not returned.

use crate::{
    constants::{PROCESS_ERROR_PREFIX, READ_CHUNK_SIZE, SIGNAL_MESSAGE_PREFIX},
    core::{
        events::EventSink,
        output_filter::{self, Utf8ChunkDecoder},
        registry::{ProcessHandle, ProcessRecord, SharedRegistry, lock_registry},
    },
    models::{LaunchReceipt, LogKind, ManagerConfig, ProcessId, RunRequest},
    system::platform::{PlatformHandler, SpawnRequest},
};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Spawns scripts and attaches the tasks that follow them.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    platform: Arc<dyn PlatformHandler>,
    registry: SharedRegistry,
    events: EventSink,
    config: ManagerConfig,
    runtime: Handle,
}

impl ProcessLauncher {
    pub fn new(
        platform: Arc<dyn PlatformHandler>,
        registry: SharedRegistry,
        events: EventSink,
        config: ManagerConfig,
        runtime: Handle,
    ) -> Self {
        Self {
            platform,
            registry,
            events,
            config,
            runtime,
        }
    }

    /// Spawns `request.script_name` through `shell` and begins tracking it.
    ///
    /// The registry lock is held across spawn and insert, so no concurrent `stop` or
    /// `list` can observe a child that exists but is not registered.
    pub fn launch(&self, request: &RunRequest, shell: String) -> LaunchReceipt {
        let id = ProcessId::new();
        let command_line = self.config.command_line(&request.script_name);
        let spawn_request = SpawnRequest {
            shell: &shell,
            command_line: &command_line,
            working_dir: &request.working_dir,
            env: &self.config.env,
            force_color: self.config.force_color,
        };
        log::debug!(
            "Launching '{}' in '{}' via '{}' (id {})",
            command_line,
            request.working_dir.display(),
            shell,
            id
        );

        // Child processes register with the runtime's reaper.
        let _runtime_guard = self.runtime.enter();
        let mut registry = lock_registry(&self.registry);

        match self.platform.spawn(&spawn_request) {
            Ok(mut child) => {
                let (kill_tx, kill_rx) = oneshot::channel();
                let pid = child.id();
                let stdout = child.stdout.take();
                let stderr = child.stderr.take();

                registry.insert(ProcessRecord {
                    id,
                    handle: ProcessHandle::new(pid, kill_tx),
                    project_name: request.project_name.clone(),
                    script_name: request.script_name.clone(),
                    project_path: request.working_dir.clone(),
                    shell: shell.clone(),
                });
                drop(registry);
                log::debug!("Process {} started with pid {:?}", id, pid);

                let readers = [
                    stdout.map(|pipe| self.spawn_reader(pipe, id, LogKind::Stdout)),
                    stderr.map(|pipe| self.spawn_reader(pipe, id, LogKind::Stderr)),
                ];
                self.runtime.spawn(watch(
                    Watch {
                        id,
                        platform: Arc::clone(&self.platform),
                        registry: Arc::clone(&self.registry),
                        events: self.events.clone(),
                    },
                    child,
                    readers,
                    kill_rx,
                ));
            }
            Err(e) => {
                drop(registry);
                log::warn!("Failed to spawn '{}' via '{}': {}", command_line, shell, e);
                self.events
                    .log(id, LogKind::Stderr, format!("{}{}\n", PROCESS_ERROR_PREFIX, e));
                self.events.exit(id, None);
            }
        }

        LaunchReceipt { id, shell }
    }

    fn spawn_reader<R>(&self, pipe: R, id: ProcessId, kind: LogKind) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        self.runtime.spawn(pump(pipe, id, kind, self.events.clone()))
    }
}

/// What a watcher needs besides the child itself.
struct Watch {
    id: ProcessId,
    platform: Arc<dyn PlatformHandler>,
    registry: SharedRegistry,
    events: EventSink,
}

async fn watch(
    watch: Watch,
    mut child: Child,
    readers: [Option<JoinHandle<()>>; 2],
    mut kill_rx: oneshot::Receiver<()>,
) {
    let Watch {
        id,
        platform,
        registry,
        events,
    } = watch;

    let status = tokio::select! {
        status = child.wait() => status,
        // A dropped switch disables this branch; only an explicit request kills.
        Ok(()) = &mut kill_rx => {
            log::debug!("Killing leader of process {} directly.", id);
            if let Err(e) = child.start_kill() {
                log::warn!("Failed to kill process {}: {}", id, e);
            }
            child.wait().await
        }
    };

    // Descendants may keep the pipes open; a late stop must not signal a recycled pid.
    {
        let mut registry = lock_registry(&registry);
        if let Some(record) = registry.get_mut(&id) {
            record.handle.mark_reaped();
        }
    }

    // Output already produced must be delivered before the exit event.
    for reader in readers.into_iter().flatten() {
        if let Err(e) = reader.await {
            log::warn!("Output reader of process {} failed: {}", id, e);
        }
    }

    // A prior `stop` already removed it; this is then a no-op.
    lock_registry(&registry).remove(&id);

    match status {
        Ok(status) => {
            if let Some(signal) = platform.termination_signal(&status) {
                events.log(id, LogKind::Info, format!("{}{}\n", SIGNAL_MESSAGE_PREFIX, signal));
            }
            log::debug!("Process {} closed with {}", id, status);
            events.exit(id, status.code());
        }
        Err(e) => {
            events.log(id, LogKind::Stderr, format!("{}{}\n", PROCESS_ERROR_PREFIX, e));
            events.exit(id, None);
        }
    }
}

/// Forwards one output pipe chunk by chunk, in pipe order.
async fn pump<R>(mut pipe: R, id: ProcessId, kind: LogKind, events: EventSink)
where
    R: AsyncRead + Unpin,
{
    let mut decoder = Utf8ChunkDecoder::new();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = decoder.decode(buf.get(..n).unwrap_or_default());
                forward(&events, id, kind, &text);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::debug!("Reading {} of process {} stopped: {}", kind, id, e);
                break;
            }
        }
    }
    forward(&events, id, kind, &decoder.finish());
}

fn forward(events: &EventSink, id: ProcessId, kind: LogKind, text: &str) {
    let filtered = output_filter::strip(text);
    if !filtered.is_empty() {
        log::trace!("{} chunk of {} bytes from {}", kind, filtered.len(), id);
        events.log(id, kind, filtered.into_owned());
    }
}
