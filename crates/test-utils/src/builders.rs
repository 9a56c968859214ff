#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use rosdocgen::config::{DiscoverySettings, GraphSection, Settings};
use rosdocgen::fs::mock::MockFileSystem;
use rosdocgen::launch::ShutdownTimeouts;

/// Builder for `Settings` to simplify test setup.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(src_path: impl Into<PathBuf>, doc_path: impl Into<PathBuf>) -> Self {
        Self {
            settings: Settings {
                src_path: src_path.into(),
                doc_path: doc_path.into(),
                graph_style: None,
                max_duration: Duration::from_secs(5),
                discovery: DiscoverySettings::default(),
                graph: GraphSection::default(),
                shutdown: ShutdownTimeouts {
                    sigterm: Duration::from_millis(500),
                    sigkill: Duration::from_millis(500),
                },
            },
        }
    }

    pub fn max_duration(mut self, d: Duration) -> Self {
        self.settings.max_duration = d;
        self
    }

    pub fn graph_style(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.graph_style = Some(path.into());
        self
    }

    /// Replace the capture tool invocation.
    pub fn graph_tool(mut self, program: &str, args: &[&str]) -> Self {
        self.settings.graph.program = program.to_string();
        self.settings.graph.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn skip_package(mut self, name: &str) -> Self {
        self.settings.discovery.skip_packages.insert(name.to_string());
        self
    }

    pub fn only_package(mut self, name: &str) -> Self {
        self.settings.discovery.only_packages.insert(name.to_string());
        self
    }

    pub fn shutdown(mut self, sigterm: Duration, sigkill: Duration) -> Self {
        self.settings.shutdown = ShutdownTimeouts { sigterm, sigkill };
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Minimal `package.xml` declaring `name`.
pub fn manifest_xml(name: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<package format="3">
  <name>{name}</name>
  <version>0.0.1</version>
  <description>test package</description>
</package>
"#
    )
}

/// Relative path of the ament marker file registering `package`.
pub fn ament_marker(package: &str) -> PathBuf {
    Path::new("share/ament_index/resource_index/packages").join(package)
}

/// Populate a mock filesystem with a source package and its installed
/// executables under `prefix`.
pub fn add_installed_package(
    fs: &MockFileSystem,
    src_dir: impl AsRef<Path>,
    prefix: impl AsRef<Path>,
    package: &str,
    executables: &[&str],
) {
    let src_dir = src_dir.as_ref();
    let prefix = prefix.as_ref();
    fs.add_file(src_dir.join("package.xml"), manifest_xml(package));
    fs.add_file(prefix.join(ament_marker(package)), "");
    for exe in executables {
        fs.add_executable(prefix.join("lib").join(package).join(exe), "#!/bin/sh\n");
    }
}
