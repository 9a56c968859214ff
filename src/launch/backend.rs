// src/launch/backend.rs

//! Pluggable process backend.
//!
//! The supervisor talks to a `ProcessBackend` instead of spawning processes
//! itself, so tests can replace real processes with scripted fakes.
//! Backends report what happens to their processes by sending
//! [`LaunchEvent`](crate::launch::LaunchEvent)s on the channel they were
//! constructed with:
//!
//! - `ProcessStarted` once a spawn succeeded (before any `ProcessExited`
//!   for the same role);
//! - `ProcessExited` when the process is gone, whether it exited on its own
//!   or was terminated.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::launch::ProcessSpec;
use crate::types::ProcessRole;

pub trait ProcessBackend: Send {
    /// Start a process. An `Err` means it never started; the supervisor
    /// turns it into a `SpawnFailed` event.
    fn spawn(
        &mut self,
        spec: ProcessSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Ask a running process to stop. Completion is reported through a
    /// later `ProcessExited` event.
    fn terminate(
        &mut self,
        role: ProcessRole,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
