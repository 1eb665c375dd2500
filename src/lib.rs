//! Launch package-manager scripts of local projects as child processes, follow their
//! output live and stop them together with everything they spawned.

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use crate::core::events::EventStream;
pub use crate::core::preferences::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use crate::models::{ProcessEvent, ProcessId, RunRequest};
pub use crate::system::manager::{ManagerError, ProcessManager};
