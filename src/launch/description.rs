// src/launch/description.rs

//! Building the launch description for analyzing one executable.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::config::GraphSection;
use crate::discovery::Executable;
use crate::fs::FileSystem;
use crate::types::ProcessRole;

static INVALID_NODE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex is valid"));

/// A process to start: program plus arguments, no shell involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub role: ProcessRole,
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessSpec {
    /// Human-readable command line for logs and `--dry-run`.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_arg)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Everything needed to analyze one executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPlan {
    pub package: String,
    pub executable: String,
    pub node_name: String,
    /// Per-executable output directory.
    pub doc_dir: PathBuf,
    /// Where the capture tool writes its Markdown output.
    pub output_md: PathBuf,
    pub node: ProcessSpec,
    pub capture: ProcessSpec,
    pub max_duration: Duration,
}

impl AnalysisPlan {
    pub fn spec(&self, role: ProcessRole) -> &ProcessSpec {
        match role {
            ProcessRole::Node => &self.node,
            ProcessRole::Capture => &self.capture,
        }
    }
}

/// ROS node name used for an executable.
///
/// `.py` becomes `_py`; any other character a node name may not contain is
/// replaced by `_`, and a leading digit is prefixed with `_`.
pub fn node_name_for(executable: &str) -> String {
    let name = executable.replace(".py", "_py");
    let name = INVALID_NODE_NAME_CHARS.replace_all(&name, "_").into_owned();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Build the plan for analyzing `executable` of `package`.
///
/// - node: `<executable> --ros-args -r __node:=<node_name>`
/// - capture: `<program> <args…> /<node_name> -o <doc_dir>/<stem>`, plus the
///   style option when `style` names an existing file.
pub fn generate_launch_analysis_description(
    fs: &dyn FileSystem,
    package: &str,
    executable: &Executable,
    doc_dir: &Path,
    style: Option<&Path>,
    max_duration: Duration,
    graph: &GraphSection,
) -> AnalysisPlan {
    let node_name = node_name_for(&executable.name);
    let output_base = doc_dir.join(&graph.output_stem);

    let node = ProcessSpec {
        role: ProcessRole::Node,
        program: executable.path.to_string_lossy().into_owned(),
        args: vec![
            "--ros-args".to_string(),
            "-r".to_string(),
            format!("__node:={node_name}"),
        ],
    };

    let mut capture_args = graph.args.clone();
    capture_args.push(format!("/{node_name}"));
    capture_args.push("-o".to_string());
    capture_args.push(output_base.to_string_lossy().into_owned());
    if let Some(style) = style.filter(|p| fs.is_file(p)) {
        capture_args.push(graph.style_flag.clone());
        capture_args.push(style.to_string_lossy().into_owned());
    }

    let capture = ProcessSpec {
        role: ProcessRole::Capture,
        program: graph.program.clone(),
        args: capture_args,
    };

    AnalysisPlan {
        package: package.to_string(),
        executable: executable.name.clone(),
        node_name,
        doc_dir: doc_dir.to_path_buf(),
        output_md: doc_dir.join(format!("{}.md", graph.output_stem)),
        node,
        capture,
        max_duration,
    }
}
