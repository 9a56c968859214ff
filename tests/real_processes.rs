// tests/real_processes.rs
//
// Supervised runs with real OS processes. Small shell scripts stand in for
// ROS nodes and the graph capture tool.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use rosdocgen::batch::{run_batch, BatchContext};
use rosdocgen::discovery::{AmentIndex, Executable};
use rosdocgen::fs::RealFileSystem;
use rosdocgen::launch::{
    generate_launch_analysis_description, never_interrupted, run_plan, ShutdownTimeouts,
    RealProcessBackend,
};
use rosdocgen::types::{ProcessOutcome, ShutdownReason};
use rosdocgen_test_utils::builders::{ament_marker, manifest_xml, SettingsBuilder};
use rosdocgen_test_utils::{init_tracing, with_timeout};

fn write_script(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Graph tool stand-in: `tool /<node> -o <base>` writes `<base>.md`.
const FAKE_GRAPH_TOOL: &str = r#"printf '```mermaid\nflowchart LR\n  %s\n```\n' "$1" > "$3.md""#;

fn timeouts() -> ShutdownTimeouts {
    ShutdownTimeouts {
        sigterm: Duration::from_millis(300),
        sigkill: Duration::from_millis(300),
    }
}

fn executable(path: PathBuf) -> Executable {
    Executable {
        name: path.file_name().unwrap().to_string_lossy().into_owned(),
        path,
    }
}

#[tokio::test]
async fn capture_exit_interrupts_long_running_node() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let node = tmp.path().join("lib/demo/talker");
    let tool = tmp.path().join("bin/graph_tool");
    write_script(&node, "exec sleep 30");
    write_script(&tool, FAKE_GRAPH_TOOL);

    let settings = SettingsBuilder::new(tmp.path().join("src"), tmp.path().join("doc"))
        .graph_tool(tool.to_str().unwrap(), &[])
        .build();
    let doc_dir = tmp.path().join("doc/demo/talker");
    fs::create_dir_all(&doc_dir).unwrap();

    let plan = generate_launch_analysis_description(
        &RealFileSystem,
        "demo",
        &executable(node),
        &doc_dir,
        None,
        Duration::from_secs(20),
        &settings.graph,
    );

    let started = Instant::now();
    let report = with_timeout(run_plan(plan, timeouts(), never_interrupted()))
        .await
        .unwrap();

    assert_eq!(report.reason, ShutdownReason::CaptureExited);
    assert_eq!(report.capture, Some(ProcessOutcome::Success));
    // Killed by SIGINT, so no exit code.
    assert_eq!(report.node, Some(ProcessOutcome::Failed(-1)));
    assert!(started.elapsed() < Duration::from_secs(5));

    let md = fs::read_to_string(doc_dir.join("io_graph.md")).unwrap();
    assert!(md.contains("/talker"));
}

#[tokio::test]
async fn timeout_escalates_past_ignored_sigint() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let node = tmp.path().join("lib/demo/stubborn");
    let tool = tmp.path().join("bin/graph_tool");
    write_script(&node, "trap '' INT\nwhile true; do sleep 0.05; done");
    write_script(&tool, "exec sleep 30");

    let settings = SettingsBuilder::new(tmp.path().join("src"), tmp.path().join("doc"))
        .graph_tool(tool.to_str().unwrap(), &[])
        .build();

    let plan = generate_launch_analysis_description(
        &RealFileSystem,
        "demo",
        &executable(node),
        &tmp.path().join("doc/demo/stubborn"),
        None,
        Duration::from_millis(300),
        &settings.graph,
    );

    let started = Instant::now();
    let report = with_timeout(run_plan(plan, timeouts(), never_interrupted()))
        .await
        .unwrap();

    assert_eq!(report.reason, ShutdownReason::Timeout);
    assert!(matches!(report.node, Some(ProcessOutcome::Failed(_))));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn node_keeps_running_after_non_utf8_output() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let node = tmp.path().join("lib/demo/binary_chatter");
    let tool = tmp.path().join("bin/graph_tool");
    let marker = tmp.path().join("still_alive");
    write_script(
        &node,
        &format!(
            "printf '\\377\\n'\nsleep 0.3\necho hello\necho hello\ntouch '{}'\nexec sleep 30",
            marker.display()
        ),
    );
    write_script(&tool, "exec sleep 30");

    let settings = SettingsBuilder::new(tmp.path().join("src"), tmp.path().join("doc"))
        .graph_tool(tool.to_str().unwrap(), &[])
        .build();

    let plan = generate_launch_analysis_description(
        &RealFileSystem,
        "demo",
        &executable(node),
        &tmp.path().join("doc/demo/binary_chatter"),
        None,
        Duration::from_secs(1),
        &settings.graph,
    );

    let report = with_timeout(run_plan(plan, timeouts(), never_interrupted()))
        .await
        .unwrap();

    assert_eq!(report.reason, ShutdownReason::Timeout);
    assert!(marker.exists(), "node died after writing invalid UTF-8");
}

#[tokio::test]
async fn missing_executable_fails_to_spawn() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let settings = SettingsBuilder::new(tmp.path().join("src"), tmp.path().join("doc")).build();

    let plan = generate_launch_analysis_description(
        &RealFileSystem,
        "demo",
        &executable(tmp.path().join("lib/demo/does_not_exist")),
        &tmp.path().join("doc/demo/does_not_exist"),
        None,
        Duration::from_secs(20),
        &settings.graph,
    );

    let report = with_timeout(run_plan(plan, timeouts(), never_interrupted()))
        .await
        .unwrap();

    assert!(matches!(report.reason, ShutdownReason::SpawnFailed { .. }));
    assert_eq!(report.node, None);
    assert_eq!(report.capture, None);
}

#[tokio::test]
async fn end_to_end_batch_on_real_filesystem() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    let doc = tmp.path().join("doc");
    let install = tmp.path().join("install");
    let tool = tmp.path().join("bin/graph_tool");

    fs::create_dir_all(src.join("demo")).unwrap();
    fs::write(src.join("demo/package.xml"), manifest_xml("demo")).unwrap();
    fs::create_dir_all(install.join(ament_marker("demo")).parent().unwrap()).unwrap();
    fs::write(install.join(ament_marker("demo")), "").unwrap();
    write_script(&install.join("lib/demo/talker"), "exec sleep 30");
    write_script(&install.join("lib/demo/listener.py"), "exec sleep 30");
    fs::write(install.join("lib/demo/params.yaml"), "not executable").unwrap();
    write_script(&tool, FAKE_GRAPH_TOOL);

    let settings = SettingsBuilder::new(&src, &doc)
        .graph_tool(tool.to_str().unwrap(), &[])
        .build();
    let index = AmentIndex::new(vec![install]);
    let ctx = BatchContext {
        fs: &RealFileSystem,
        index: &index,
        settings: &settings,
        interrupt: never_interrupted(),
    };

    let timeouts = settings.shutdown;
    let summary = with_timeout(run_batch(&ctx, |tx| RealProcessBackend::new(tx, timeouts)))
        .await
        .unwrap();

    assert_eq!(summary.executables, 2);
    assert_eq!(summary.documented, 2);
    assert!(!summary.has_failures());

    let md = fs::read_to_string(doc.join("demo/listener_py/io_graph.md")).unwrap();
    assert_eq!(md, "\nflowchart LR\n  /listener_py\n\n");
}
