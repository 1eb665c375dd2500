//! # Process Registry
//!
//! In-memory table of the child processes currently tracked by one `ProcessManager`.
//! Presence of an id here is what "running" means; removal is final.
//!
//! The registry itself is not synchronized. Its owner keeps it behind a single mutex so
//! that spawn + insert, stop + remove and close + remove are each one critical section.

use crate::models::{ProcessId, ProcessInfo};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// The registry as owned by a manager and shared with its watcher tasks.
pub type SharedRegistry = Arc<Mutex<ProcessRegistry>>;

/// Locks the registry. Every mutation completes within one critical section, so a poisoned
/// lock still guards a consistent table and is recovered.
pub fn lock_registry(registry: &SharedRegistry) -> MutexGuard<'_, ProcessRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive reference to a live OS process.
///
/// The `tokio::process::Child` itself lives in the watcher task that awaits its exit; this
/// handle carries what termination needs: the pid and a switch that asks the watcher to
/// kill the leader directly.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Option<u32>,
    reaped: bool,
    kill_switch: Option<oneshot::Sender<()>>,
}

impl ProcessHandle {
    pub fn new(pid: Option<u32>, kill_switch: oneshot::Sender<()>) -> Self {
        Self {
            pid,
            reaped: false,
            kill_switch: Some(kill_switch),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Whether the leader has exited and been reaped. Its pid may then name another process,
    /// while its group lives on as long as a descendant does.
    pub fn is_reaped(&self) -> bool {
        self.reaped
    }

    pub fn mark_reaped(&mut self) {
        self.reaped = true;
    }

    /// Hands out the kill switch. Only the first call gets it.
    pub fn take_kill_switch(&mut self) -> Option<oneshot::Sender<()>> {
        self.kill_switch.take()
    }
}

/// One tracked child process.
#[derive(Debug)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub handle: ProcessHandle,
    pub project_name: String,
    pub script_name: String,
    pub project_path: PathBuf,
    pub shell: String,
}

impl ProcessRecord {
    fn info(&self) -> ProcessInfo {
        ProcessInfo {
            id: self.id,
            project_name: self.project_name.clone(),
            script_name: self.script_name.clone(),
            shell: self.shell.clone(),
        }
    }
}

/// Tracked processes keyed by id, remembering launch order.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    entries: HashMap<ProcessId, (u64, ProcessRecord)>,
    next_seq: u64,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a record. An id already present is replaced, which cannot happen with
    /// freshly generated ids.
    pub fn insert(&mut self, record: ProcessRecord) {
        let seq = self.next_seq;
        self.next_seq += 1;
        if self.entries.insert(record.id, (seq, record)).is_some() {
            log::warn!("Process id was registered twice; previous record dropped.");
        }
    }

    /// Stops tracking `id`. Returns `None` when it was already gone, making a second
    /// removal a no-op.
    pub fn remove(&mut self, id: &ProcessId) -> Option<ProcessRecord> {
        self.entries.remove(id).map(|(_, record)| record)
    }

    pub fn get(&self, id: &ProcessId) -> Option<&ProcessRecord> {
        self.entries.get(id).map(|(_, record)| record)
    }

    pub fn get_mut(&mut self, id: &ProcessId) -> Option<&mut ProcessRecord> {
        self.entries.get_mut(id).map(|(_, record)| record)
    }

    pub fn contains(&self, id: &ProcessId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of every tracked process, in launch order. Native handles are not exposed.
    pub fn list(&self) -> Vec<ProcessInfo> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, record)| record.info()).collect()
    }
}
