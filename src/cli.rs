// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `rosdocgen`.
///
/// Path and duration flags are optional so that values from `--config`
/// can fill in whatever is not given on the command line.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "rosdocgen",
    version,
    about = "Analyze all ROS executables in a folder.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the source folder containing ROS packages.
    ///
    /// Default: `/workspace/src`.
    #[arg(long, value_name = "PATH")]
    pub src_path: Option<PathBuf>,

    /// Path to the documentation folder. Wiped at the start of each run.
    ///
    /// Default: `/workspace/src/tmp`.
    #[arg(long, value_name = "PATH")]
    pub doc_path: Option<PathBuf>,

    /// Path to YAML graph style file.
    #[arg(long, value_name = "PATH")]
    pub graph_style: Option<PathBuf>,

    /// Maximum duration to run each executable for analysis [s].
    #[arg(long, value_name = "SECS")]
    pub max_duration: Option<f64>,

    /// Optional TOML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only analyze these packages (may be repeated).
    #[arg(long = "package", value_name = "NAME")]
    pub packages: Vec<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ROSDOCGEN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Discover packages and print what would be launched, without running
    /// anything or touching the doc folder.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
