// src/config/settings.rs

//! Effective settings: CLI flags layered over the config file, layered over
//! built-in defaults.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use globset::GlobSet;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, GraphSection};
use crate::config::validate::{build_exclude_set, validate_output_location, validate_seconds};
use crate::errors::Result;
use crate::launch::ShutdownTimeouts;

pub const DEFAULT_SRC_PATH: &str = "/workspace/src";
pub const DEFAULT_DOC_PATH: &str = "/workspace/src/tmp";
pub const DEFAULT_MAX_DURATION_SECS: f64 = 5.0;

/// Package filtering used by discovery.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    pub exclude: GlobSet,
    pub skip_packages: BTreeSet<String>,
    /// Empty means "all packages".
    pub only_packages: BTreeSet<String>,
    pub respect_colcon_ignore: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            exclude: GlobSet::empty(),
            skip_packages: BTreeSet::new(),
            only_packages: BTreeSet::new(),
            respect_colcon_ignore: true,
        }
    }
}

impl DiscoverySettings {
    /// Whether a package with this name should be analyzed.
    pub fn wants_package(&self, name: &str) -> bool {
        if self.skip_packages.contains(name) {
            return false;
        }
        self.only_packages.is_empty() || self.only_packages.contains(name)
    }
}

/// Fully resolved settings for one batch.
#[derive(Debug, Clone)]
pub struct Settings {
    pub src_path: PathBuf,
    pub doc_path: PathBuf,
    /// `None` when no style file was configured.
    pub graph_style: Option<PathBuf>,
    pub max_duration: Duration,
    pub discovery: DiscoverySettings,
    pub graph: GraphSection,
    pub shutdown: ShutdownTimeouts,
}

impl Settings {
    /// Merge CLI arguments over a validated config file.
    pub fn resolve(args: &CliArgs, cfg: &ConfigFile) -> Result<Self> {
        let src_path = args
            .src_path
            .clone()
            .or_else(|| cfg.analysis.src_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SRC_PATH));

        let doc_path = args
            .doc_path
            .clone()
            .or_else(|| cfg.analysis.doc_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOC_PATH));

        let graph_style = args
            .graph_style
            .clone()
            .or_else(|| cfg.analysis.graph_style.as_ref().map(PathBuf::from))
            .filter(|p| !p.as_os_str().is_empty());

        let max_duration = validate_seconds(
            "max_duration",
            args.max_duration
                .or(cfg.analysis.max_duration)
                .unwrap_or(DEFAULT_MAX_DURATION_SECS),
        )?;
        let shutdown = ShutdownTimeouts {
            sigterm: validate_seconds("[shutdown].sigterm_timeout", cfg.shutdown.sigterm_timeout)?,
            sigkill: validate_seconds("[shutdown].sigkill_timeout", cfg.shutdown.sigkill_timeout)?,
        };

        validate_output_location(&src_path, &doc_path)?;

        let discovery = DiscoverySettings {
            exclude: build_exclude_set(&cfg.discovery.exclude)?,
            skip_packages: cfg.discovery.skip_packages.iter().cloned().collect(),
            only_packages: args.packages.iter().cloned().collect(),
            respect_colcon_ignore: cfg.discovery.respect_colcon_ignore,
        };

        Ok(Self {
            src_path,
            doc_path,
            graph_style,
            max_duration,
            discovery,
            graph: cfg.graph.clone(),
            shutdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawConfigFile;
    use crate::errors::RosdocError;

    #[test]
    fn defaults_without_cli_or_config() {
        let settings = Settings::resolve(&CliArgs::default(), &ConfigFile::default()).unwrap();
        assert_eq!(settings.src_path, PathBuf::from(DEFAULT_SRC_PATH));
        assert_eq!(settings.doc_path, PathBuf::from(DEFAULT_DOC_PATH));
        assert_eq!(settings.graph_style, None);
        assert_eq!(settings.max_duration, Duration::from_secs(5));
        assert_eq!(settings.shutdown.sigterm, Duration::from_secs(5));
        assert_eq!(settings.graph.output_stem, "io_graph");
    }

    #[test]
    fn cli_overrides_config() {
        let mut raw = RawConfigFile::default();
        raw.analysis.src_path = Some("/from/config/src".to_string());
        raw.analysis.doc_path = Some("/from/config/doc".to_string());
        raw.analysis.max_duration = Some(9.0);
        let cfg = ConfigFile::try_from(raw).unwrap();

        let args = CliArgs {
            doc_path: Some(PathBuf::from("/from/cli/doc")),
            max_duration: Some(1.5),
            ..CliArgs::default()
        };

        let settings = Settings::resolve(&args, &cfg).unwrap();
        assert_eq!(settings.src_path, PathBuf::from("/from/config/src"));
        assert_eq!(settings.doc_path, PathBuf::from("/from/cli/doc"));
        assert_eq!(settings.max_duration, Duration::from_millis(1500));
    }

    #[test]
    fn empty_graph_style_means_no_style() {
        let args = CliArgs {
            graph_style: Some(PathBuf::from("")),
            ..CliArgs::default()
        };
        let settings = Settings::resolve(&args, &ConfigFile::default()).unwrap();
        assert_eq!(settings.graph_style, None);
    }

    #[test]
    fn negative_cli_duration_is_rejected() {
        let args = CliArgs {
            max_duration: Some(-1.0),
            ..CliArgs::default()
        };
        assert!(Settings::resolve(&args, &ConfigFile::default()).is_err());
    }

    #[test]
    fn out_of_range_durations_are_rejected() {
        let args = CliArgs {
            max_duration: Some(1e30),
            ..CliArgs::default()
        };
        assert!(matches!(
            Settings::resolve(&args, &ConfigFile::default()),
            Err(RosdocError::ConfigError(_))
        ));

        let mut raw = RawConfigFile::default();
        raw.shutdown.sigkill_timeout = 1e30;
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(RosdocError::ConfigError(_))
        ));
    }

    #[test]
    fn package_filters_combine() {
        let mut discovery = DiscoverySettings::default();
        discovery.skip_packages.insert("skipped".to_string());
        assert!(discovery.wants_package("anything"));
        assert!(!discovery.wants_package("skipped"));

        discovery.only_packages.insert("wanted".to_string());
        assert!(discovery.wants_package("wanted"));
        assert!(!discovery.wants_package("anything"));
    }
}
