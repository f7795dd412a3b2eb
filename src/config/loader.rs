// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::config::settings::Settings;
use crate::config::validate::validate_settings;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization and path rebasing; it does
/// **not** check that the result is runnable. Use [`load_settings`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("parsing TOML config from {:?}", path))?;

    let base = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().context("resolving current directory")?,
    };

    Ok(config.relative_to(&base))
}

/// Build and validate the effective settings for a run.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads the optional TOML file named by `--config`.
/// - Applies command-line flags on top.
/// - Checks that there is something to watch, analyse and analyse with.
pub fn load_settings(args: &CliArgs) -> Result<Settings> {
    let file = match &args.config {
        Some(path) => Some(load_from_path(path)?),
        None => None,
    };

    let settings = Settings::resolve(args, file);
    validate_settings(&settings)?;
    Ok(settings)
}
