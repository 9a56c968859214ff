// src/launch/supervisor.rs

use std::collections::VecDeque;
use std::fmt;

use anyhow::anyhow;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::launch::core::{LaunchCommand, SupervisorCore};
use crate::launch::{AnalysisPlan, LaunchEvent, LaunchReport, ProcessBackend};

/// Runs one [`AnalysisPlan`] to completion.
///
/// This is the async shell around [`SupervisorCore`]: it reads events from
/// the backend channel, the timer and the interrupt signal, feeds them to
/// the core and executes the commands the core returns.
pub struct Supervisor<B: ProcessBackend> {
    plan: AnalysisPlan,
    core: SupervisorCore,
    event_rx: mpsc::Receiver<LaunchEvent>,
    event_tx: mpsc::Sender<LaunchEvent>,
    backend: B,
    interrupt: watch::Receiver<bool>,
    /// Events generated by the shell itself (spawn failures).
    pending: VecDeque<LaunchEvent>,
    timer: Option<JoinHandle<()>>,
}

impl<B: ProcessBackend> fmt::Debug for Supervisor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("plan", &self.plan)
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Supervisor<B> {
    /// `event_tx` must feed `event_rx`; the backend should hold a clone of
    /// the same sender.
    pub fn new(
        plan: AnalysisPlan,
        event_rx: mpsc::Receiver<LaunchEvent>,
        event_tx: mpsc::Sender<LaunchEvent>,
        backend: B,
        interrupt: watch::Receiver<bool>,
    ) -> Self {
        let core = SupervisorCore::new(plan.max_duration);
        Self {
            plan,
            core,
            event_rx,
            event_tx,
            backend,
            interrupt,
            pending: VecDeque::new(),
            timer: None,
        }
    }

    pub async fn run(mut self) -> Result<LaunchReport> {
        info!(
            package = %self.plan.package,
            executable = %self.plan.executable,
            node = %self.plan.node_name,
            "supervised run started"
        );

        if *self.interrupt.borrow() {
            self.pending.push_back(LaunchEvent::ShutdownRequested);
        }

        let start = self.core.start();
        self.execute_all(start.commands).await;

        let result = self.event_loop().await;

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let report = result?;
        info!(
            package = %self.plan.package,
            executable = %self.plan.executable,
            reason = %report.reason,
            node = ?report.node,
            capture = ?report.capture,
            "supervised run finished"
        );
        Ok(report)
    }

    async fn event_loop(&mut self) -> Result<LaunchReport> {
        let mut listen_for_interrupt = true;

        loop {
            let event = match self.pending.pop_front() {
                Some(event) => event,
                None => tokio::select! {
                    event = self.event_rx.recv() => match event {
                        Some(event) => event,
                        None => {
                            return Err(anyhow!("supervisor event channel closed").into());
                        }
                    },
                    changed = self.interrupt.changed(), if listen_for_interrupt => {
                        match changed {
                            Ok(()) if *self.interrupt.borrow() => LaunchEvent::ShutdownRequested,
                            Ok(()) => continue,
                            Err(_) => {
                                listen_for_interrupt = false;
                                continue;
                            }
                        }
                    }
                },
            };

            debug!(?event, "supervisor received event");

            let step = self.core.step(event);
            self.execute_all(step.commands).await;

            if !step.keep_running {
                break;
            }
        }

        self.core
            .report()
            .ok_or_else(|| anyhow!("supervised run ended before shutdown").into())
    }

    async fn execute_all(&mut self, commands: Vec<LaunchCommand>) {
        for command in commands {
            self.execute(command).await;
        }
    }

    async fn execute(&mut self, command: LaunchCommand) {
        match command {
            LaunchCommand::Spawn(role) => {
                let spec = self.plan.spec(role).clone();
                if let Err(err) = self.backend.spawn(spec).await {
                    warn!(%role, error = %err, "failed to start process");
                    self.pending.push_back(LaunchEvent::SpawnFailed {
                        role,
                        reason: err.to_string(),
                    });
                }
            }
            LaunchCommand::StartTimer(period) => {
                let tx = self.event_tx.clone();
                self.timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(period).await;
                    let _ = tx.send(LaunchEvent::TimerElapsed).await;
                }));
            }
            LaunchCommand::Terminate(role) => {
                if let Err(err) = self.backend.terminate(role).await {
                    warn!(%role, error = %err, "failed to terminate process");
                }
            }
        }
    }
}
