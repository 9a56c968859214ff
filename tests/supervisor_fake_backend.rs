// tests/supervisor_fake_backend.rs

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use rosdocgen::config::GraphSection;
use rosdocgen::discovery::Executable;
use rosdocgen::fs::mock::MockFileSystem;
use rosdocgen::launch::{
    generate_launch_analysis_description, never_interrupted, AnalysisPlan, LaunchEvent,
    LaunchReport, Supervisor, EVENT_CHANNEL_CAPACITY,
};
use rosdocgen::types::{ProcessOutcome, ProcessRole, ShutdownReason};
use rosdocgen_test_utils::fake_backend::{FakeBehaviour, FakeCall, FakeProcessBackend};
use rosdocgen_test_utils::{init_tracing, with_timeout};

fn plan(max_duration: Duration) -> AnalysisPlan {
    let fs = MockFileSystem::new();
    let executable = Executable {
        name: "talker".to_string(),
        path: PathBuf::from("/install/lib/demo/talker"),
    };
    generate_launch_analysis_description(
        &fs,
        "demo",
        &executable,
        Path::new("/doc/demo/talker"),
        None,
        max_duration,
        &GraphSection::default(),
    )
}

async fn run_with(
    max_duration: Duration,
    configure: impl FnOnce(FakeProcessBackend) -> FakeProcessBackend,
    interrupt: watch::Receiver<bool>,
) -> (LaunchReport, Vec<FakeCall>) {
    init_tracing();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = mpsc::channel::<LaunchEvent>(EVENT_CHANNEL_CAPACITY);
    let backend = configure(FakeProcessBackend::new(tx.clone(), Arc::clone(&calls)));

    let report = with_timeout(Supervisor::new(plan(max_duration), rx, tx, backend, interrupt).run())
        .await
        .expect("supervised run failed");

    let calls = calls.lock().unwrap().clone();
    (report, calls)
}

fn roles_of(calls: &[FakeCall]) -> Vec<String> {
    calls
        .iter()
        .map(|c| match c {
            FakeCall::Spawn(spec) => format!("spawn {}", spec.role),
            FakeCall::Terminate(role) => format!("terminate {role}"),
        })
        .collect()
}

#[tokio::test]
async fn capture_exit_shuts_down_the_node() {
    let (report, calls) =
        run_with(Duration::from_secs(30), |b| b, never_interrupted()).await;

    assert_eq!(report.reason, ShutdownReason::CaptureExited);
    assert_eq!(report.capture, Some(ProcessOutcome::Success));
    assert_eq!(report.node, Some(ProcessOutcome::Failed(-1)));
    assert_eq!(
        roles_of(&calls),
        vec!["spawn node", "spawn capture", "terminate node"]
    );

    // The capture tool targets the remapped node name.
    match &calls[1] {
        FakeCall::Spawn(spec) => assert!(spec.args.contains(&"/talker".to_string())),
        other => panic!("expected capture spawn, got {other:?}"),
    }
}

#[tokio::test]
async fn timer_stops_a_hanging_capture() {
    let (report, calls) = run_with(
        Duration::from_millis(50),
        |b| b.with(ProcessRole::Capture, FakeBehaviour::RunUntilTerminated),
        never_interrupted(),
    )
    .await;

    assert_eq!(report.reason, ShutdownReason::Timeout);
    assert_eq!(
        roles_of(&calls),
        vec!["spawn node", "spawn capture", "terminate capture", "terminate node"]
    );
}

#[tokio::test]
async fn node_that_cannot_start_skips_capture() {
    let (report, calls) = run_with(
        Duration::from_secs(30),
        |b| b.with(ProcessRole::Node, FakeBehaviour::FailToSpawn("No such file".to_string())),
        never_interrupted(),
    )
    .await;

    match report.reason {
        ShutdownReason::SpawnFailed { role, reason } => {
            assert_eq!(role, ProcessRole::Node);
            assert!(reason.contains("No such file"));
        }
        other => panic!("expected SpawnFailed, got {other:?}"),
    }
    assert_eq!(roles_of(&calls), vec!["spawn node"]);
}

#[tokio::test]
async fn failing_capture_tool_is_reported() {
    let (report, _calls) = run_with(
        Duration::from_secs(30),
        |b| b.with(
            ProcessRole::Capture,
            FakeBehaviour::ExitAfterStart(ProcessOutcome::Failed(2)),
        ),
        never_interrupted(),
    )
    .await;

    assert_eq!(report.reason, ShutdownReason::CaptureExited);
    assert_eq!(report.capture, Some(ProcessOutcome::Failed(2)));
}

#[tokio::test]
async fn interrupt_stops_the_run() {
    let (interrupt_tx, interrupt_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        run_with(
            Duration::from_secs(30),
            |b| b.with(ProcessRole::Capture, FakeBehaviour::RunUntilTerminated),
            interrupt_rx,
        )
        .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    interrupt_tx.send(true).unwrap();

    let (report, calls) = handle.await.unwrap();
    assert_eq!(report.reason, ShutdownReason::Interrupted);
    assert!(calls.contains(&FakeCall::Terminate(ProcessRole::Node)));
    assert!(calls.contains(&FakeCall::Terminate(ProcessRole::Capture)));
}
