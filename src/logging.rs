// src/logging.rs

//! Logging for `rosdocgen`: one `tracing` fmt subscriber on stderr.
//!
//! The filter comes from `--log-level` when given, otherwise from the
//! `ROSDOCGEN_LOG` environment variable, which accepts full `EnvFilter`
//! directives (e.g. `info,rosdocgen::launch=trace` to see node output).
//! Without either, `info` is used. Stdout stays free for `--dry-run`.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "ROSDOCGEN_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env_value.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing the log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(directive_for(level)));
    }
    match env_value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(spec) => {
            EnvFilter::try_new(spec).with_context(|| format!("invalid {LOG_ENV_VAR} value '{spec}'"))
        }
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

fn directive_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
