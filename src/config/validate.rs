// src/config/validate.rs

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RosdocError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RosdocError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    if let Some(max) = cfg.analysis.max_duration {
        validate_seconds("[analysis].max_duration", max)?;
    }
    validate_seconds("[shutdown].sigterm_timeout", cfg.shutdown.sigterm_timeout)?;
    validate_seconds("[shutdown].sigkill_timeout", cfg.shutdown.sigkill_timeout)?;
    validate_graph(cfg)?;
    build_exclude_set(&cfg.discovery.exclude)?;
    Ok(())
}

fn validate_graph(cfg: &RawConfigFile) -> Result<()> {
    if cfg.graph.program.trim().is_empty() {
        return Err(RosdocError::ConfigError(
            "[graph].program must not be empty".to_string(),
        ));
    }

    let stem = cfg.graph.output_stem.as_str();
    let is_plain_name = !stem.is_empty()
        && Path::new(stem).file_name().and_then(|n| n.to_str()) == Some(stem);
    if !is_plain_name {
        return Err(RosdocError::ConfigError(format!(
            "[graph].output_stem must be a plain file name (got '{stem}')"
        )));
    }

    Ok(())
}

/// Convert a duration given in seconds, rejecting values a timer cannot use.
pub fn validate_seconds(key: &str, value: f64) -> Result<Duration> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RosdocError::ConfigError(format!(
            "{key} must be a positive number of seconds (got {value})"
        )));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| RosdocError::ConfigError(format!("{key} is out of range ({value}): {e}")))
}

/// Compile the `[discovery].exclude` patterns into a single matcher.
pub fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            RosdocError::ConfigError(format!("invalid exclude pattern '{pattern}': {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| RosdocError::ConfigError(format!("building exclude patterns: {e}")))
}

/// The doc folder is removed at the start of every batch, so it must never
/// contain the source tree.
pub fn validate_output_location(src_path: &Path, doc_path: &Path) -> Result<()> {
    let src = resolve(src_path)?;
    let doc = resolve(doc_path)?;

    if src.starts_with(&doc) {
        return Err(RosdocError::ConfigError(format!(
            "doc path {doc_path:?} would delete the source tree {src_path:?}"
        )));
    }
    Ok(())
}

/// Absolute path with `.`/`..` folded away and symlinks in its longest
/// existing ancestor resolved.
fn resolve(path: &Path) -> Result<PathBuf> {
    let lexical = normalize_lexically(&std::path::absolute(path)?);

    let mut existing = lexical.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = std::fs::canonicalize(existing) {
            return Ok(missing.iter().rev().fold(canonical, |acc, name| acc.join(name)));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return Ok(lexical),
        }
    }
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
