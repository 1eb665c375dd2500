//! # System Interaction Layer
//!
//! This module provides abstractions for interacting with the underlying operating system.
//! It serves as a boundary between the manager's bookkeeping and the specifics of process
//! creation, termination and shell environments.
//!
//! ## Modules
//!
//! - **`platform`**: The `PlatformHandler` capability with POSIX and Windows implementations
//!   (spawn, terminate, enumerate shells), selected once at startup.
//! - **`shell`**: `ShellResolver`, which picks the interpreter for a launch and lists the
//!   interpreters present on the host.
//! - **`launcher`**: Spawns a script as a child process, registers it and streams its output.
//! - **`controller`**: Terminates a tracked process and its descendants.
//! - **`manager`**: `ProcessManager`, the service object exposing all of the above.

pub mod controller;
pub mod launcher;
pub mod manager;
pub mod platform;
pub mod shell;
