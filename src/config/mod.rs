// src/config/mod.rs

//! Configuration loading and validation for rosdocgen.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate value ranges and patterns (`validate.rs`).
//! - Merge CLI flags over file values into [`Settings`] (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    AnalysisSection, ConfigFile, DiscoverySection, GraphSection, RawConfigFile, ShutdownSection,
};
pub use settings::{DiscoverySettings, Settings};
