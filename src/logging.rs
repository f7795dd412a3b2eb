// src/logging.rs

//! Diagnostics for `pmdwatch`.
//!
//! STDOUT belongs to the report protocol (`STARTUP`, `BEGIN-ANALYSIS`, `MSG`,
//! ...) that editors parse line by line, so every log record goes to STDERR.
//!
//! The filter is chosen in this order:
//! 1. `--log-level` (applies to every target)
//! 2. `PMDWATCH_LOG`, a full `EnvFilter` directive such as
//!    `pmdwatch::watch=debug,info`
//! 3. `info`

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "PMDWATCH_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once, before the first pass.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("installing log subscriber: {err}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    match (cli_level, env.map(str::trim)) {
        (Some(level), _) => Ok(EnvFilter::new(directive(level))),
        (None, Some(spec)) if !spec.is_empty() => {
            EnvFilter::try_new(spec).with_context(|| format!("invalid {LOG_ENV} value {spec:?}"))
        }
        _ => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
