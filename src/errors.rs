// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosdocError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("XML parsing error in {path:?}: {source}")]
    XmlError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Package name not found in {0:?}")]
    PackageNameMissing(PathBuf),

    #[error("Package not found in ament index: {0}")]
    PackageNotFound(String),

    #[error("Process '{program}' failed to start: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Analysis interrupted")]
    Interrupted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RosdocError>;
