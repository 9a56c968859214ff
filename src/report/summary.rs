// src/report/summary.rs

use std::fmt;

use tracing::{info, warn};

use crate::types::ShutdownReason;

/// Result of analyzing a single executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableResult {
    /// The capture tool finished and its output was post-processed.
    Documented,
    /// The capture tool finished without producing a diagram.
    NoOutput,
    /// `max_duration` elapsed before the capture tool finished.
    TimedOut { documented: bool },
    Failed(String),
}

/// Counters for the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub packages: usize,
    pub executables: usize,
    pub documented: usize,
    pub timed_out: usize,
    pub without_output: usize,
    /// `package/executable: reason` (or `package: reason` for lookup
    /// failures).
    pub failures: Vec<String>,
}

impl BatchSummary {
    pub fn record(&mut self, package: &str, executable: &str, result: &ExecutableResult) {
        self.executables += 1;
        match result {
            ExecutableResult::Documented => self.documented += 1,
            ExecutableResult::NoOutput => self.without_output += 1,
            ExecutableResult::TimedOut { documented } => {
                self.timed_out += 1;
                if *documented {
                    self.documented += 1;
                } else {
                    self.without_output += 1;
                }
            }
            ExecutableResult::Failed(reason) => {
                self.failures.push(format!("{package}/{executable}: {reason}"));
            }
        }
    }

    pub fn record_package_failure(&mut self, package: &str, reason: &str) {
        self.failures.push(format!("{package}: {reason}"));
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn log(&self) {
        info!(
            packages = self.packages,
            executables = self.executables,
            documented = self.documented,
            timed_out = self.timed_out,
            without_output = self.without_output,
            failed = self.failures.len(),
            "analysis finished: {}",
            self
        );
        for failure in &self.failures {
            warn!("failed: {failure}");
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} packages, {} executables: {} documented, {} timed out, {} without output, {} failed",
            self.packages,
            self.executables,
            self.documented,
            self.timed_out,
            self.without_output,
            self.failures.len()
        )
    }
}

/// Map how a run ended to a per-executable result.
pub fn classify(reason: &ShutdownReason, capture_ok: bool, documented: bool) -> ExecutableResult {
    match reason {
        ShutdownReason::CaptureExited if !capture_ok => {
            ExecutableResult::Failed("graph capture tool failed".to_string())
        }
        ShutdownReason::CaptureExited if documented => ExecutableResult::Documented,
        ShutdownReason::CaptureExited => ExecutableResult::NoOutput,
        ShutdownReason::Timeout => ExecutableResult::TimedOut { documented },
        ShutdownReason::SpawnFailed { role, reason } => {
            ExecutableResult::Failed(format!("{role} failed to start: {reason}"))
        }
        ShutdownReason::Interrupted => ExecutableResult::Failed("interrupted".to_string()),
    }
}
