use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use rosdocgen::errors::{Result, RosdocError};
use rosdocgen::fs::mock::MockFileSystem;
use rosdocgen::fs::FileSystem;
use rosdocgen::launch::{LaunchEvent, ProcessBackend, ProcessSpec};
use rosdocgen::types::{ProcessOutcome, ProcessRole};

/// How a fake process behaves once spawned.
#[derive(Debug, Clone)]
pub enum FakeBehaviour {
    /// Start, then exit immediately with this outcome.
    ExitAfterStart(ProcessOutcome),
    /// Start and keep running until terminated.
    RunUntilTerminated,
    /// Never start.
    FailToSpawn(String),
}

/// Something the supervisor asked the backend to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Spawn(ProcessSpec),
    Terminate(ProcessRole),
}

/// A process backend that never starts real processes.
///
/// - behaviour per role is scripted up front;
/// - every call is recorded in a shared log;
/// - optionally, a started capture process writes `<output>.md` with the
///   given content into a `MockFileSystem`, the way the graph tool would.
pub struct FakeProcessBackend {
    events_tx: mpsc::Sender<LaunchEvent>,
    behaviour: HashMap<ProcessRole, FakeBehaviour>,
    running: HashSet<ProcessRole>,
    calls: Arc<Mutex<Vec<FakeCall>>>,
    capture_output: Option<(MockFileSystem, String)>,
}

impl FakeProcessBackend {
    pub fn new(events_tx: mpsc::Sender<LaunchEvent>, calls: Arc<Mutex<Vec<FakeCall>>>) -> Self {
        let behaviour = HashMap::from([
            (ProcessRole::Node, FakeBehaviour::RunUntilTerminated),
            (
                ProcessRole::Capture,
                FakeBehaviour::ExitAfterStart(ProcessOutcome::Success),
            ),
        ]);
        Self {
            events_tx,
            behaviour,
            running: HashSet::new(),
            calls,
            capture_output: None,
        }
    }

    pub fn with(mut self, role: ProcessRole, behaviour: FakeBehaviour) -> Self {
        self.behaviour.insert(role, behaviour);
        self
    }

    pub fn writing_output(mut self, fs: MockFileSystem, content: &str) -> Self {
        self.capture_output = Some((fs, content.to_string()));
        self
    }

    fn write_capture_output(&self, spec: &ProcessSpec) {
        let Some((fs, content)) = &self.capture_output else {
            return;
        };
        let output = spec
            .args
            .iter()
            .position(|a| a == "-o")
            .and_then(|i| spec.args.get(i + 1));
        if let Some(base) = output {
            let path = PathBuf::from(format!("{base}.md"));
            fs.write(&path, content.as_bytes())
                .expect("mock write cannot fail");
        }
    }
}

impl ProcessBackend for FakeProcessBackend {
    fn spawn(
        &mut self,
        spec: ProcessSpec,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let role = spec.role;
            self.calls.lock().unwrap().push(FakeCall::Spawn(spec.clone()));

            let behaviour = self
                .behaviour
                .get(&role)
                .cloned()
                .unwrap_or(FakeBehaviour::RunUntilTerminated);

            if let FakeBehaviour::FailToSpawn(reason) = &behaviour {
                return Err(RosdocError::SpawnFailed {
                    program: spec.program,
                    reason: reason.clone(),
                });
            }

            if role == ProcessRole::Capture {
                self.write_capture_output(&spec);
            }

            self.events_tx
                .send(LaunchEvent::ProcessStarted { role })
                .await
                .map_err(anyhow::Error::from)?;

            match behaviour {
                FakeBehaviour::ExitAfterStart(outcome) => {
                    self.events_tx
                        .send(LaunchEvent::ProcessExited { role, outcome })
                        .await
                        .map_err(anyhow::Error::from)?;
                }
                _ => {
                    self.running.insert(role);
                }
            }
            Ok(())
        })
    }

    fn terminate(
        &mut self,
        role: ProcessRole,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(FakeCall::Terminate(role));
            if self.running.remove(&role) {
                self.events_tx
                    .send(LaunchEvent::ProcessExited {
                        role,
                        outcome: ProcessOutcome::Failed(-1),
                    })
                    .await
                    .map_err(anyhow::Error::from)?;
            }
            Ok(())
        })
    }
}
