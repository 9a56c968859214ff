// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [analysis]
/// src_path = "/workspace/src"
/// doc_path = "/workspace/src/tmp"
/// graph_style = "style.yaml"
/// max_duration = 5.0
///
/// [discovery]
/// exclude = ["**/test/**"]
/// skip_packages = ["demo_pkg"]
///
/// [graph]
/// program = "python3"
///
/// [shutdown]
/// sigterm_timeout = 5.0
/// ```
///
/// All sections are optional and have reasonable defaults. This raw form is
/// not yet validated; convert it with `ConfigFile::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub analysis: AnalysisSection,

    #[serde(default)]
    pub discovery: DiscoverySection,

    #[serde(default)]
    pub graph: GraphSection,

    #[serde(default)]
    pub shutdown: ShutdownSection,
}

/// Validated configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub analysis: AnalysisSection,
    pub discovery: DiscoverySection,
    pub graph: GraphSection,
    pub shutdown: ShutdownSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            analysis: raw.analysis,
            discovery: raw.discovery,
            graph: raw.graph,
            shutdown: raw.shutdown,
        }
    }
}

/// `[analysis]` section. Every key can be overridden on the command line.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSection {
    #[serde(default)]
    pub src_path: Option<String>,

    #[serde(default)]
    pub doc_path: Option<String>,

    /// An empty string means "no style file".
    #[serde(default)]
    pub graph_style: Option<String>,

    /// Seconds each executable may run before it is shut down.
    #[serde(default)]
    pub max_duration: Option<f64>,
}

/// `[discovery]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySection {
    /// Glob patterns matched against manifest paths relative to `src_path`.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Package names that are never analyzed.
    #[serde(default)]
    pub skip_packages: Vec<String>,

    /// Skip directory trees containing a `COLCON_IGNORE` marker.
    #[serde(default = "default_true")]
    pub respect_colcon_ignore: bool,
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            skip_packages: Vec::new(),
            respect_colcon_ignore: true,
        }
    }
}

/// `[graph]` section: how the graph-capture tool is invoked.
///
/// The final command line is
/// `program args... /<node_name> -o <doc_dir>/<output_stem> [style_flag <style>]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphSection {
    #[serde(default = "default_graph_program")]
    pub program: String,

    #[serde(default = "default_graph_args")]
    pub args: Vec<String>,

    /// The tool writes `<output_stem>.md` next to the given output path.
    #[serde(default = "default_output_stem")]
    pub output_stem: String,

    #[serde(default = "default_style_flag")]
    pub style_flag: String,
}

impl Default for GraphSection {
    fn default() -> Self {
        Self {
            program: default_graph_program(),
            args: default_graph_args(),
            output_stem: default_output_stem(),
            style_flag: default_style_flag(),
        }
    }
}

/// `[shutdown]` section: SIGINT → SIGTERM → SIGKILL escalation delays.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShutdownSection {
    #[serde(default = "default_escalation_timeout")]
    pub sigterm_timeout: f64,

    #[serde(default = "default_escalation_timeout")]
    pub sigkill_timeout: f64,
}

impl Default for ShutdownSection {
    fn default() -> Self {
        Self {
            sigterm_timeout: default_escalation_timeout(),
            sigkill_timeout: default_escalation_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_graph_program() -> String {
    "python3".to_string()
}

fn default_graph_args() -> Vec<String> {
    vec![
        "-c".to_string(),
        "from ros2_graph import __main__ as ros2_graph; ros2_graph.main()".to_string(),
    ]
}

fn default_output_stem() -> String {
    "io_graph".to_string()
}

fn default_style_flag() -> String {
    "--styleConfig".to_string()
}

fn default_escalation_timeout() -> f64 {
    5.0
}
