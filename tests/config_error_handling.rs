// tests/config_error_handling.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use rosdocgen::cli::CliArgs;
use rosdocgen::config::{load_and_validate, Settings};
use rosdocgen::errors::RosdocError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_is_loaded() {
    let file = config_file(
        r#"
[analysis]
src_path = "/ws/src"
doc_path = "/ws/doc"
graph_style = "/ws/style.yaml"
max_duration = 2.5

[discovery]
exclude = ["**/test/**"]
skip_packages = ["slow_pkg"]
respect_colcon_ignore = false

[graph]
program = "ros2_graph"
args = []

[shutdown]
sigterm_timeout = 1.0
sigkill_timeout = 0.5
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let settings = Settings::resolve(&CliArgs::default(), &cfg).unwrap();

    assert_eq!(settings.src_path, PathBuf::from("/ws/src"));
    assert_eq!(settings.graph_style, Some(PathBuf::from("/ws/style.yaml")));
    assert_eq!(settings.max_duration, Duration::from_millis(2500));
    assert!(!settings.discovery.respect_colcon_ignore);
    assert!(settings.discovery.skip_packages.contains("slow_pkg"));
    assert!(settings.discovery.exclude.is_match("pkg/test/x/package.xml"));
    assert_eq!(settings.graph.program, "ros2_graph");
    assert!(settings.graph.args.is_empty());
    assert_eq!(settings.graph.output_stem, "io_graph");
    assert_eq!(settings.shutdown.sigkill, Duration::from_millis(500));
}

#[test]
fn unknown_key_is_a_toml_error() {
    let file = config_file("[analysis]\nmax_duraton = 3.0\n");
    match load_and_validate(file.path()) {
        Err(RosdocError::TomlError(e)) => assert!(e.to_string().contains("max_duraton")),
        other => panic!("expected TomlError, got {other:?}"),
    }
}

#[test]
fn non_positive_timeout_is_a_config_error() {
    let file = config_file("[shutdown]\nsigterm_timeout = 0.0\n");
    match load_and_validate(file.path()) {
        Err(RosdocError::ConfigError(msg)) => assert!(msg.contains("sigterm_timeout")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn empty_graph_program_is_a_config_error() {
    let file = config_file("[graph]\nprogram = \"  \"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(RosdocError::ConfigError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = load_and_validate("/definitely/not/here/rosdocgen.toml");
    assert!(matches!(result, Err(RosdocError::IoError(_))));
}
