// src/system/controller.rs

use crate::{
    core::registry::{SharedRegistry, lock_registry},
    models::ProcessId,
    system::{
        manager::ManagerError,
        platform::{KillTarget, PlatformHandler},
    },
};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Terminates tracked processes together with their descendants.
#[derive(Debug, Clone)]
pub struct ProcessController {
    platform: Arc<dyn PlatformHandler>,
    registry: SharedRegistry,
    runtime: Handle,
}

impl ProcessController {
    pub fn new(platform: Arc<dyn PlatformHandler>, registry: SharedRegistry, runtime: Handle) -> Self {
        Self {
            platform,
            registry,
            runtime,
        }
    }

    /// Issues a best-effort termination and forgets the process.
    ///
    /// Returns once the request is issued, not once the process is dead: the entry is
    /// removed immediately and the later `exit` event confirms the death. There is no
    /// escalation to a forceful kill if the graceful request is ignored.
    pub fn stop(&self, id: &ProcessId) -> Result<(), ManagerError> {
        let mut registry = lock_registry(&self.registry);
        let mut record = registry
            .remove(id)
            .ok_or(ManagerError::ProcessNotFound(*id))?;

        log::debug!(
            "Stopping process {} ('{}' of '{}', pid {:?})",
            id,
            record.script_name,
            record.project_name,
            record.handle.pid()
        );
        let target = KillTarget {
            pid: record.handle.pid(),
            leader_reaped: record.handle.is_reaped(),
            kill_switch: record.handle.take_kill_switch(),
        };
        self.platform.terminate(target, &self.runtime);
        Ok(())
    }
}
