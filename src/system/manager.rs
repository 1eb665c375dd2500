//! # Process Manager
//!
//! The service object the presentation layer talks to. One instance owns one registry for
//! the lifetime of an application session and exposes the boundary operations:
//! `run`, `stop`, `list_running`, `list_available_shells` and the shell preference pair.
//!
//! Log and exit notifications arrive on the [`EventStream`] returned by the constructor.

use crate::{
    core::{
        events::{self, EventStream},
        preferences::{PreferenceStore, StoreError},
        registry::{ProcessRegistry, SharedRegistry, lock_registry},
    },
    models::{
        ManagerConfig, ProcessId, ProcessInfo, RunRequest, RunResponse, ShellDescriptor,
        StopResponse,
    },
    system::{
        controller::ProcessController,
        launcher::ProcessLauncher,
        platform::{self, PlatformHandler},
        shell::ShellResolver,
    },
};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::runtime::Handle;

/// Failures reported by [`ProcessManager`] operations.
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Process not found: {0}")]
    ProcessNotFound(ProcessId),
    #[error("Could not store shell preference: {0}")]
    Store(#[from] StoreError),
}

/// Owns the registry and the collaborators behind the boundary operations.
#[derive(Debug)]
pub struct ProcessManager {
    shells: ShellResolver,
    launcher: ProcessLauncher,
    controller: ProcessController,
    registry: SharedRegistry,
}

impl ProcessManager {
    /// Creates a manager for the host platform, bound to the current Tokio runtime.
    ///
    /// # Panics
    /// When called outside a Tokio runtime.
    pub fn new(config: ManagerConfig, store: Arc<dyn PreferenceStore>) -> (Self, EventStream) {
        Self::with_platform(config, store, platform::current(), Handle::current())
    }

    /// Creates a manager with an explicit platform handler and runtime. Its operations may
    /// then be called from any thread.
    pub fn with_platform(
        config: ManagerConfig,
        store: Arc<dyn PreferenceStore>,
        platform: Arc<dyn PlatformHandler>,
        runtime: Handle,
    ) -> (Self, EventStream) {
        let (sink, stream) = events::channel();
        let registry: SharedRegistry = Arc::new(Mutex::new(ProcessRegistry::new()));

        let manager = Self {
            shells: ShellResolver::new(Arc::clone(&platform), store),
            launcher: ProcessLauncher::new(
                Arc::clone(&platform),
                Arc::clone(&registry),
                sink,
                config,
                runtime.clone(),
            ),
            controller: ProcessController::new(platform, Arc::clone(&registry), runtime),
            registry,
        };
        (manager, stream)
    }

    /// Launches a script and returns immediately.
    ///
    /// Always succeeds synchronously: if the child cannot be created, a `Process error`
    /// line followed by an `exit` event is delivered for the returned id instead.
    pub fn run(&self, request: RunRequest) -> RunResponse {
        let shell = self.shells.resolve(request.shell.as_deref());
        let receipt = self.launcher.launch(&request, shell);
        RunResponse {
            success: true,
            id: receipt.id,
            project_name: request.project_name,
            script_name: request.script_name,
            shell: receipt.shell,
        }
    }

    /// Stops a process and its descendants. An unknown id yields `success: false` and
    /// leaves the registry untouched.
    pub fn stop(&self, id: &ProcessId) -> StopResponse {
        self.try_stop(id).into()
    }

    pub fn try_stop(&self, id: &ProcessId) -> Result<(), ManagerError> {
        self.controller.stop(id)
    }

    /// Stops every tracked process, returning how many were signaled.
    pub fn stop_all(&self) -> usize {
        self.list_running()
            .iter()
            .filter(|p| self.try_stop(&p.id).is_ok())
            .count()
    }

    /// Tracked processes in launch order.
    pub fn list_running(&self) -> Vec<ProcessInfo> {
        lock_registry(&self.registry).list()
    }

    pub fn is_running(&self, id: &ProcessId) -> bool {
        lock_registry(&self.registry).contains(id)
    }

    /// Interpreters present on the host. Never empty.
    pub fn list_available_shells(&self) -> Vec<ShellDescriptor> {
        self.shells.available_shells()
    }

    pub fn set_shell_preference(&self, shell_path: &str) -> Result<(), ManagerError> {
        Ok(self.shells.set_preference(shell_path)?)
    }

    /// The stored interpreter, or the host default when none is stored.
    pub fn get_shell_preference(&self) -> String {
        self.shells.preference()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::preferences::MemoryPreferenceStore;
    use crate::models::{LogKind, ProcessEvent};
    use crate::system::platform::{KillTarget, SpawnRequest, unix::UnixPlatform};
    use std::collections::{HashMap, HashSet};
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    const RUNNER: &str = r#"case "$1" in
  hello) echo hello; echo oops >&2 ;;
  color) printf '\033[1;31mred\033[0m\n' ;;
  seven) exit 7 ;;
  pause) sleep 1 ;;
  count) for i in 1 2 3 4 5; do echo "$i"; done ;;
  sleep) sleep 30 ;;
  tree) sleep 30 & sleep 30 ;;
  linger) sleep 30 & exit 0 ;;
  solo) exec sleep 30 ;;
esac
"#;

    // --- Helpers ---

    fn project() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.sh"), RUNNER).unwrap();
        dir
    }

    fn config(run_command: &str) -> ManagerConfig {
        ManagerConfig {
            run_command: run_command.to_string(),
            force_color: false,
            env: HashMap::new(),
        }
    }

    fn manager() -> (ProcessManager, EventStream) {
        ProcessManager::new(config("sh run.sh"), Arc::new(MemoryPreferenceStore::default()))
    }

    /// Host platform whose tree-wide termination always fails over to the watcher's switch.
    #[derive(Debug)]
    struct LeaderOnlyPlatform;

    impl PlatformHandler for LeaderOnlyPlatform {
        fn default_shell(&self) -> String {
            UnixPlatform.default_shell()
        }

        fn enumerate_shells(&self) -> Vec<ShellDescriptor> {
            UnixPlatform.enumerate_shells()
        }

        fn spawn(&self, request: &SpawnRequest<'_>) -> std::io::Result<tokio::process::Child> {
            UnixPlatform.spawn(request)
        }

        fn terminate(&self, target: KillTarget, _runtime: &Handle) {
            target.kill_leader();
        }

        fn termination_signal(&self, status: &std::process::ExitStatus) -> Option<String> {
            UnixPlatform.termination_signal(status)
        }
    }

    fn is_reaped(manager: &ProcessManager, id: &ProcessId) -> bool {
        lock_registry(&manager.registry)
            .get(id)
            .is_some_and(|r| r.handle.is_reaped())
    }

    fn request(dir: &Path, script: &str) -> RunRequest {
        RunRequest {
            working_dir: dir.to_path_buf(),
            script_name: script.to_string(),
            project_name: "demo".to_string(),
            shell: Some("/bin/sh".to_string()),
        }
    }

    /// Collects events until every id in `ids` has reported its exit.
    async fn collect_until_exits(stream: &mut EventStream, ids: &[ProcessId]) -> Vec<ProcessEvent> {
        let mut pending: HashSet<ProcessId> = ids.iter().copied().collect();
        let mut events = Vec::new();
        while !pending.is_empty() {
            let event = timeout(Duration::from_secs(15), stream.recv())
                .await
                .expect("timed out waiting for events")
                .expect("event stream closed");
            if let ProcessEvent::Exit { id, .. } = &event {
                assert!(pending.remove(id), "second exit for {}", id);
            }
            events.push(event);
        }
        events
    }

    fn logs_of(events: &[ProcessEvent], id: ProcessId, kind: LogKind) -> String {
        events
            .iter()
            .filter_map(|e| match e {
                ProcessEvent::Log { id: i, kind: k, data } if *i == id && *k == kind => {
                    Some(data.as_str())
                }
                _ => None,
            })
            .collect()
    }

    fn exit_code(events: &[ProcessEvent], id: ProcessId) -> Option<i32> {
        match events.iter().rev().find(|e| e.id() == id) {
            Some(ProcessEvent::Exit { code, .. }) => *code,
            other => unreachable!("last event for {} is not an exit: {:?}", id, other),
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_run_is_listed_until_exit() {
        let dir = project();
        let (manager, mut stream) = manager();

        let response = manager.run(request(dir.path(), "pause"));

        assert!(response.success);
        assert_eq!(response.shell, "/bin/sh");
        assert_eq!(response.script_name, "pause");
        let listed = manager.list_running();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, response.id);
        assert_eq!(listed[0].project_name, "demo");

        let events = collect_until_exits(&mut stream, &[response.id]).await;
        assert_eq!(exit_code(&events, response.id), Some(0));
        assert!(!manager.is_running(&response.id));
        assert!(manager.list_running().is_empty());
    }

    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let dir = project();
        let (manager, mut stream) = manager();

        let response = manager.run(request(dir.path(), "seven"));
        let events = collect_until_exits(&mut stream, &[response.id]).await;

        assert_eq!(exit_code(&events, response.id), Some(7));
        assert!(manager.list_running().is_empty());
    }

    #[tokio::test]
    async fn test_output_is_split_by_stream_and_stripped() {
        let dir = project();
        let (manager, mut stream) = manager();

        let hello = manager.run(request(dir.path(), "hello")).id;
        let color = manager.run(request(dir.path(), "color")).id;
        let events = collect_until_exits(&mut stream, &[hello, color]).await;

        assert_eq!(logs_of(&events, hello, LogKind::Stdout), "hello\n");
        assert_eq!(logs_of(&events, hello, LogKind::Stderr), "oops\n");
        assert_eq!(logs_of(&events, color, LogKind::Stdout), "red\n");
        assert!(events.iter().all(|e| match e {
            ProcessEvent::Log { data, .. } => !data.is_empty(),
            ProcessEvent::Exit { .. } => true,
        }));
    }

    #[tokio::test]
    async fn test_stop_unknown_id_changes_nothing() {
        let dir = project();
        let (manager, mut stream) = manager();
        let running = manager.run(request(dir.path(), "sleep")).id;

        let result = manager.try_stop(&ProcessId::new());

        assert!(matches!(result, Err(ManagerError::ProcessNotFound(_))));
        assert_eq!(manager.list_running().len(), 1);
        assert!(manager.is_running(&running));

        manager.try_stop(&running).unwrap();
        collect_until_exits(&mut stream, &[running]).await;
    }

    #[tokio::test]
    async fn test_stop_answers_with_structured_response() {
        let dir = project();
        let (manager, mut stream) = manager();
        let running = manager.run(request(dir.path(), "sleep")).id;

        let unknown = manager.stop(&ProcessId::new());
        assert!(!unknown.success);
        assert!(unknown.error.as_deref().is_some_and(|e| e.contains("not found")));
        assert!(manager.is_running(&running));

        let known = manager.stop(&running);
        assert_eq!(known, StopResponse { success: true, error: None });
        collect_until_exits(&mut stream, &[running]).await;
    }

    #[tokio::test]
    async fn test_stop_reports_signal_then_exit() {
        let dir = project();
        let (manager, mut stream) = manager();
        let id = manager.run(request(dir.path(), "sleep")).id;

        manager.try_stop(&id).unwrap();
        assert!(!manager.is_running(&id));
        assert!(matches!(manager.try_stop(&id), Err(ManagerError::ProcessNotFound(_))));

        let events = collect_until_exits(&mut stream, &[id]).await;
        let info: Vec<&ProcessEvent> = events
            .iter()
            .filter(|e| matches!(e, ProcessEvent::Log { kind: LogKind::Info, .. }))
            .collect();
        assert_eq!(info.len(), 1);
        assert!(matches!(info[0], ProcessEvent::Log { data, .. } if data.contains("SIGTERM")));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ProcessEvent::Exit { id, code: None });
    }

    #[tokio::test]
    async fn test_kill_switch_fallback_reports_signal_then_exit() {
        let dir = project();
        // `exec` all the way down, so the leader is the only holder of the pipes.
        let (manager, mut stream) = ProcessManager::with_platform(
            config("exec sh run.sh"),
            Arc::new(MemoryPreferenceStore::default()),
            Arc::new(LeaderOnlyPlatform),
            Handle::current(),
        );
        let id = manager.run(request(dir.path(), "solo")).id;

        assert!(manager.stop(&id).success);

        let events = collect_until_exits(&mut stream, &[id]).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            ProcessEvent::Log { id: i, kind: LogKind::Info, data }
                if *i == id && data.starts_with("Process terminated by signal: ")
        ));
        assert_eq!(events[1], ProcessEvent::Exit { id, code: None });
    }

    #[tokio::test]
    async fn test_stop_after_leader_exit_reaches_group_only() {
        let dir = project();
        let (manager, mut stream) = manager();
        let id = manager.run(request(dir.path(), "linger")).id;

        // The background sleep keeps the pipes, so the record outlives the leader.
        let mut waited = 0;
        while !is_reaped(&manager, &id) {
            assert!(waited < 100, "leader was never reaped");
            tokio::time::sleep(Duration::from_millis(50)).await;
            waited += 1;
        }
        assert!(manager.is_running(&id));

        manager.try_stop(&id).unwrap();

        // The group signal ends the sleep well before its 30 seconds.
        let events = collect_until_exits(&mut stream, &[id]).await;
        assert_eq!(events, vec![ProcessEvent::Exit { id, code: Some(0) }]);
    }

    #[tokio::test]
    async fn test_stop_reaches_descendants() {
        let dir = project();
        let (manager, mut stream) = manager();
        let id = manager.run(request(dir.path(), "tree")).id;
        // Give the shell time to fork the background sleep.
        tokio::time::sleep(Duration::from_millis(300)).await;

        manager.try_stop(&id).unwrap();

        // The exit only arrives once every holder of the pipes is gone.
        let events = collect_until_exits(&mut stream, &[id]).await;
        assert!(matches!(events.last(), Some(ProcessEvent::Exit { .. })));
    }

    #[tokio::test]
    async fn test_missing_interpreter_reports_one_error() {
        let dir = project();
        let (manager, mut stream) = manager();
        let mut req = request(dir.path(), "hello");
        req.shell = Some("/nonexistent/interpreter".to_string());

        let response = manager.run(req);

        assert!(response.success);
        assert_eq!(response.shell, "/nonexistent/interpreter");
        assert!(manager.list_running().is_empty());
        let events = collect_until_exits(&mut stream, &[response.id]).await;
        let errors: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                ProcessEvent::Log { kind: LogKind::Stderr, data, .. } => Some(data.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Process error: "));
        assert_eq!(exit_code(&events, response.id), None);
    }

    #[tokio::test]
    async fn test_missing_working_directory_is_an_async_error() {
        let (manager, mut stream) = manager();
        let response = manager.run(request(Path::new("/definitely/not/a/project"), "hello"));

        let events = collect_until_exits(&mut stream, &[response.id]).await;
        assert!(logs_of(&events, response.id, LogKind::Stderr).contains("Process error"));
    }

    #[tokio::test]
    async fn test_concurrent_runs_keep_their_own_order() {
        let dir = project();
        let (manager, mut stream) = manager();

        let ids: Vec<ProcessId> = (0..4)
            .map(|_| manager.run(request(dir.path(), "count")).id)
            .collect();
        let distinct: HashSet<ProcessId> = ids.iter().copied().collect();
        assert_eq!(distinct.len(), ids.len());

        let events = collect_until_exits(&mut stream, &ids).await;
        for id in &ids {
            assert_eq!(logs_of(&events, *id, LogKind::Stdout), "1\n2\n3\n4\n5\n");
            assert_eq!(exit_code(&events, *id), Some(0));
        }
    }

    #[tokio::test]
    async fn test_stopping_one_leaves_others_running() {
        let dir = project();
        let (manager, mut stream) = manager();
        let keep = manager.run(request(dir.path(), "pause")).id;
        let kill = manager.run(request(dir.path(), "sleep")).id;

        manager.try_stop(&kill).unwrap();

        assert!(manager.is_running(&keep));
        let events = collect_until_exits(&mut stream, &[keep, kill]).await;
        assert_eq!(exit_code(&events, keep), Some(0));
        assert_eq!(exit_code(&events, kill), None);
    }

    #[tokio::test]
    async fn test_shell_preference_round_trip() {
        let dir = project();
        let (manager, mut stream) = manager();
        let default = manager.get_shell_preference();
        assert!(!default.is_empty());

        manager.set_shell_preference("/bin/sh").unwrap();
        assert_eq!(manager.get_shell_preference(), "/bin/sh");

        let mut req = request(dir.path(), "seven");
        req.shell = None;
        let response = manager.run(req);
        assert_eq!(response.shell, "/bin/sh");
        collect_until_exits(&mut stream, &[response.id]).await;
    }

    #[tokio::test]
    async fn test_available_shells_never_empty() {
        let (manager, _stream) = manager();
        assert!(!manager.list_available_shells().is_empty());
    }
}
