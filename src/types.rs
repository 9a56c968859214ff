// src/types.rs

//! Small value types shared by the launch supervisor and the batch driver.

use std::fmt;

/// Which of the two processes of an analysis run an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    /// The ROS executable being documented.
    Node,
    /// The graph-capture tool introspecting the running node.
    Capture,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessRole::Node => write!(f, "node"),
            ProcessRole::Capture => write!(f, "capture"),
        }
    }
}

/// Exit outcome of a supervised process.
///
/// Processes killed by a signal report `Failed(-1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    Failed(i32),
}

impl ProcessOutcome {
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => ProcessOutcome::Success,
            Some(c) => ProcessOutcome::Failed(c),
            None => ProcessOutcome::Failed(-1),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProcessOutcome::Success)
    }
}

/// Why an analysis run was shut down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The capture tool exited on its own (the normal case).
    CaptureExited,
    /// `max_duration` elapsed first.
    Timeout,
    /// One of the processes could not be started.
    SpawnFailed { role: ProcessRole, reason: String },
    /// Ctrl-C.
    Interrupted,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::CaptureExited => write!(f, "capture exited"),
            ShutdownReason::Timeout => write!(f, "timeout"),
            ShutdownReason::SpawnFailed { role, reason } => {
                write!(f, "{role} failed to start: {reason}")
            }
            ShutdownReason::Interrupted => write!(f, "interrupted"),
        }
    }
}
