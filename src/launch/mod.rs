// src/launch/mod.rs

//! Short-lived supervised runs of a single ROS executable.
//!
//! - [`description`] turns a package/executable pair into an
//!   [`AnalysisPlan`]: the two command lines and the timer period.
//! - [`core`] is the pure state machine deciding what happens on each
//!   [`LaunchEvent`] (start capture once the node is up, shut down when the
//!   capture exits or the timer fires).
//! - [`supervisor`] is the async shell that feeds events into the core and
//!   executes its commands.
//! - [`backend`] abstracts process management; [`process`] holds the real
//!   `tokio::process` implementation with signal escalation on shutdown.

pub mod backend;
pub mod core;
pub mod description;
pub mod process;
pub mod supervisor;

use tokio::sync::{mpsc, watch};

use crate::errors::Result;
use crate::types::{ProcessOutcome, ProcessRole, ShutdownReason};

pub use backend::ProcessBackend;
pub use core::{LaunchCommand, LaunchStep, SupervisorCore};
pub use description::{
    generate_launch_analysis_description, node_name_for, AnalysisPlan, ProcessSpec,
};
pub use process::{RealProcessBackend, ShutdownTimeouts};
pub use supervisor::Supervisor;

/// Events flowing into the supervisor from process backends, the timer and
/// the Ctrl-C handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    ProcessStarted {
        role: ProcessRole,
    },
    ProcessExited {
        role: ProcessRole,
        outcome: ProcessOutcome,
    },
    SpawnFailed {
        role: ProcessRole,
        reason: String,
    },
    TimerElapsed,
    ShutdownRequested,
}

/// What happened during one supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub reason: ShutdownReason,
    /// `None` if the process never started.
    pub node: Option<ProcessOutcome>,
    pub capture: Option<ProcessOutcome>,
}

/// Channel capacity for supervisor events; a run only ever sees a handful.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Run a plan with real OS processes.
pub async fn run_plan(
    plan: AnalysisPlan,
    timeouts: ShutdownTimeouts,
    interrupt: watch::Receiver<bool>,
) -> Result<LaunchReport> {
    let (tx, rx) = mpsc::channel::<LaunchEvent>(EVENT_CHANNEL_CAPACITY);
    let backend = RealProcessBackend::new(tx.clone(), timeouts);
    Supervisor::new(plan, rx, tx, backend, interrupt).run().await
}

/// An interrupt receiver that never fires.
///
/// The sender is dropped right away; the supervisor stops listening once
/// the channel reports closed.
pub fn never_interrupted() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}
