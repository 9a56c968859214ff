// src/launch/process.rs

//! Real process backend on top of `tokio::process`.
//!
//! Shutdown follows the ROS launch escalation: SIGINT first, SIGTERM after
//! `sigterm` has elapsed, SIGKILL after a further `sigkill`. Non-unix
//! targets go straight to a hard kill.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::errors::{Result, RosdocError};
use crate::launch::{LaunchEvent, ProcessBackend, ProcessSpec};
use crate::types::{ProcessOutcome, ProcessRole};

/// Delays between the signals sent when stopping a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownTimeouts {
    pub sigterm: Duration,
    pub sigkill: Duration,
}

impl Default for ShutdownTimeouts {
    fn default() -> Self {
        Self {
            sigterm: Duration::from_secs(5),
            sigkill: Duration::from_secs(5),
        }
    }
}

/// Handle for a running process.
///
/// - `stop` asks the watcher task to shut the process down.
/// - `handle` is the Tokio task waiting on the child.
struct RunningProcess {
    stop: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

pub struct RealProcessBackend {
    events_tx: mpsc::Sender<LaunchEvent>,
    timeouts: ShutdownTimeouts,
    running: HashMap<ProcessRole, RunningProcess>,
}

impl RealProcessBackend {
    pub fn new(events_tx: mpsc::Sender<LaunchEvent>, timeouts: ShutdownTimeouts) -> Self {
        Self {
            events_tx,
            timeouts,
            running: HashMap::new(),
        }
    }
}

impl ProcessBackend for RealProcessBackend {
    fn spawn(
        &mut self,
        spec: ProcessSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let role = spec.role;
            if let Some(previous) = self.running.get(&role) {
                if !previous.handle.is_finished() {
                    return Err(RosdocError::SpawnFailed {
                        program: spec.program,
                        reason: format!("{role} process is already running"),
                    });
                }
            }

            info!(%role, cmd = %spec.command_line(), "starting process");

            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let mut child = cmd.spawn().map_err(|e| RosdocError::SpawnFailed {
                program: spec.program.clone(),
                reason: e.to_string(),
            })?;

            if let Some(stdout) = child.stdout.take() {
                forward_lines(role, "stdout", stdout);
            }
            if let Some(stderr) = child.stderr.take() {
                forward_lines(role, "stderr", stderr);
            }

            self.events_tx
                .send(LaunchEvent::ProcessStarted { role })
                .await
                .map_err(anyhow::Error::from)?;

            let (stop_tx, stop_rx) = oneshot::channel::<()>();
            let events_tx = self.events_tx.clone();
            let timeouts = self.timeouts;
            let handle = tokio::spawn(async move {
                watch_process(role, child, stop_rx, timeouts, events_tx).await;
            });

            self.running.insert(
                role,
                RunningProcess {
                    stop: Some(stop_tx),
                    handle,
                },
            );
            Ok(())
        })
    }

    fn terminate(
        &mut self,
        role: ProcessRole,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            match self.running.get_mut(&role).and_then(|p| p.stop.take()) {
                Some(stop) => {
                    if stop.send(()).is_err() {
                        debug!(%role, "process already finished while terminating");
                    }
                }
                None => debug!(%role, "no running process to terminate"),
            }
            Ok(())
        })
    }
}

/// Wait for the child to exit, stopping it when asked, then report the exit.
async fn watch_process(
    role: ProcessRole,
    mut child: Child,
    stop_rx: oneshot::Receiver<()>,
    timeouts: ShutdownTimeouts,
    events_tx: mpsc::Sender<LaunchEvent>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        // A dropped sender means the backend is gone; stop the process too.
        _ = stop_rx => stop_gracefully(role, &mut child, timeouts).await,
    };

    let outcome = match status {
        Ok(status) => ProcessOutcome::from_code(status.code()),
        Err(e) => {
            warn!(%role, error = %e, "failed to wait for process");
            ProcessOutcome::Failed(-1)
        }
    };

    info!(%role, ?outcome, "process exited");

    if events_tx
        .send(LaunchEvent::ProcessExited { role, outcome })
        .await
        .is_err()
    {
        debug!(%role, "supervisor gone before process exit was reported");
    }
}

async fn stop_gracefully(
    role: ProcessRole,
    child: &mut Child,
    timeouts: ShutdownTimeouts,
) -> std::io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        use nix::sys::signal::Signal;

        if let Some(pid) = child.id() {

            for (signal, grace) in [
                (Signal::SIGINT, timeouts.sigterm),
                (Signal::SIGTERM, timeouts.sigkill),
            ] {
                debug!(%role, pid, %signal, "signalling process");
                if let Err(e) = send_signal(pid, signal) {
                    debug!(%role, pid, %signal, error = %e, "signal not delivered");
                }
                match tokio::time::timeout(grace, child.wait()).await {
                    Ok(status) => return status,
                    Err(_) => warn!(
                        %role,
                        pid,
                        %signal,
                        grace_secs = grace.as_secs_f64(),
                        "process still running after signal; escalating"
                    ),
                }
            }
        }
    }

    #[cfg(not(unix))]
    let _ = timeouts;

    if let Err(e) = child.kill().await {
        debug!(%role, error = %e, "kill failed; process probably already exited");
    }
    child.wait().await
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: nix::sys::signal::Signal) -> nix::Result<()> {
    use nix::unistd::Pid;

    let pid = i32::try_from(pid).map_err(|_| nix::errno::Errno::ESRCH)?;
    nix::sys::signal::kill(Pid::from_raw(pid), signal)
}

/// Consume a child output stream so pipes never fill, logging each line.
/// Capture output is logged at info, node output at debug.
fn forward_lines<R>(role: ProcessRole, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        // Keep draining until EOF even on non-UTF-8 output; a closed pipe
        // would kill the child on its next write.
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']);
                    match role {
                        ProcessRole::Capture => info!(%role, stream, "{}", line),
                        ProcessRole::Node => debug!(%role, stream, "{}", line),
                    }
                }
                Err(err) => {
                    debug!(%role, stream, error = %err, "stopped reading process output");
                    break;
                }
            }
        }
    });
}
