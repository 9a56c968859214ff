// src/launch/core.rs

//! Pure supervisor state machine.
//!
//! Consumes [`LaunchEvent`]s and produces [`LaunchCommand`]s for the async
//! shell in `launch::supervisor`. No Tokio types, channels or processes
//! here, so every transition can be unit tested directly.
//!
//! The rules:
//! - the node is spawned and the timer armed at start;
//! - the capture tool is spawned once the node has started;
//! - the capture tool exiting, the timer firing, a spawn failure or an
//!   interrupt begin shutdown, which terminates every running process;
//! - the run is over once shutdown has begun and nothing is running.

use std::time::Duration;

use tracing::debug;

use crate::launch::{LaunchEvent, LaunchReport};
use crate::types::{ProcessOutcome, ProcessRole, ShutdownReason};

/// Command produced by the core, to be executed by the supervisor shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchCommand {
    Spawn(ProcessRole),
    StartTimer(Duration),
    Terminate(ProcessRole),
}

/// Decision returned by the core after handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchStep {
    pub commands: Vec<LaunchCommand>,
    /// Whether the shell should keep waiting for events.
    pub keep_running: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcState {
    NotStarted,
    /// Spawn requested, no answer from the backend yet.
    Starting,
    Running,
    Exited(ProcessOutcome),
    SpawnFailed,
}

impl ProcState {
    fn is_active(self) -> bool {
        matches!(self, ProcState::Starting | ProcState::Running)
    }

    fn outcome(self) -> Option<ProcessOutcome> {
        match self {
            ProcState::Exited(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct SupervisorCore {
    max_duration: Duration,
    node: ProcState,
    capture: ProcState,
    shutdown: Option<ShutdownReason>,
}

impl SupervisorCore {
    pub fn new(max_duration: Duration) -> Self {
        Self {
            max_duration,
            node: ProcState::NotStarted,
            capture: ProcState::NotStarted,
            shutdown: None,
        }
    }

    /// Initial commands: start the node and arm the timer.
    pub fn start(&mut self) -> LaunchStep {
        self.node = ProcState::Starting;
        LaunchStep {
            commands: vec![
                LaunchCommand::Spawn(ProcessRole::Node),
                LaunchCommand::StartTimer(self.max_duration),
            ],
            keep_running: true,
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_some()
    }

    pub fn step(&mut self, event: LaunchEvent) -> LaunchStep {
        let mut commands = Vec::new();

        match event {
            LaunchEvent::ProcessStarted { role } => {
                *self.state_mut(role) = ProcState::Running;
                if self.shutdown.is_some() {
                    // Came up after shutdown began.
                    commands.push(LaunchCommand::Terminate(role));
                } else if role == ProcessRole::Node && self.capture == ProcState::NotStarted {
                    self.capture = ProcState::Starting;
                    commands.push(LaunchCommand::Spawn(ProcessRole::Capture));
                }
            }
            LaunchEvent::ProcessExited { role, outcome } => {
                *self.state_mut(role) = ProcState::Exited(outcome);
                if role == ProcessRole::Capture {
                    self.begin_shutdown(ShutdownReason::CaptureExited, &mut commands);
                }
            }
            LaunchEvent::SpawnFailed { role, reason } => {
                *self.state_mut(role) = ProcState::SpawnFailed;
                self.begin_shutdown(ShutdownReason::SpawnFailed { role, reason }, &mut commands);
            }
            LaunchEvent::TimerElapsed => {
                self.begin_shutdown(ShutdownReason::Timeout, &mut commands);
            }
            LaunchEvent::ShutdownRequested => {
                if self.shutdown.is_some() {
                    // Already stopping; only record that the batch must end.
                    self.shutdown = Some(ShutdownReason::Interrupted);
                } else {
                    self.begin_shutdown(ShutdownReason::Interrupted, &mut commands);
                }
            }
        }

        LaunchStep {
            commands,
            keep_running: !self.is_finished(),
        }
    }

    /// Shutdown has begun and no process is starting or running.
    pub fn is_finished(&self) -> bool {
        self.shutdown.is_some() && !self.node.is_active() && !self.capture.is_active()
    }

    /// Final report, available once shutdown has begun.
    pub fn report(&self) -> Option<LaunchReport> {
        let reason = self.shutdown.clone()?;
        Some(LaunchReport {
            reason,
            node: self.node.outcome(),
            capture: self.capture.outcome(),
        })
    }

    fn state_mut(&mut self, role: ProcessRole) -> &mut ProcState {
        match role {
            ProcessRole::Node => &mut self.node,
            ProcessRole::Capture => &mut self.capture,
        }
    }

    fn begin_shutdown(&mut self, reason: ShutdownReason, commands: &mut Vec<LaunchCommand>) {
        if self.shutdown.is_some() {
            return;
        }
        debug!(%reason, "shutting down analysis run");
        self.shutdown = Some(reason);

        for (role, state) in [(ProcessRole::Capture, self.capture), (ProcessRole::Node, self.node)] {
            if state == ProcState::Running {
                commands.push(LaunchCommand::Terminate(role));
            }
        }
    }
}
