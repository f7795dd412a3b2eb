// src/config/validate.rs

use crate::config::settings::Settings;
use crate::errors::{PmdwatchError, Result};

/// Check that the settings can start a watch session.
///
/// This checks:
/// - at least one source, ruleset and language
/// - a non-zero quiescence window
/// - the watched root exists and is a directory
/// - every exclude/include glob compiles
///
/// It does **not** check that rulesets or languages are known to PMD.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    ensure_required(settings)?;
    validate_watch_root(settings)?;
    validate_patterns(settings)?;
    Ok(())
}

fn ensure_required(settings: &Settings) -> Result<()> {
    if settings.sources.is_empty() {
        return Err(PmdwatchError::ConfigError(
            "no sources specified; at least one --source must be given".into(),
        ));
    }
    if settings.rulesets.is_empty() {
        return Err(PmdwatchError::ConfigError(
            "no rulesets specified; at least one --ruleset must be given".into(),
        ));
    }
    if settings.languages.is_empty() {
        return Err(PmdwatchError::ConfigError(
            "no languages specified; at least one --language must be given".into(),
        ));
    }
    if settings.quiescence.is_zero() {
        return Err(PmdwatchError::ConfigError(
            "quiescence window must be greater than 0 ms".into(),
        ));
    }
    Ok(())
}

fn validate_watch_root(settings: &Settings) -> Result<()> {
    let Some(root) = settings.watch_root() else {
        return Ok(());
    };
    if !root.is_dir() {
        return Err(PmdwatchError::ConfigError(format!(
            "watched source {:?} does not exist or is not a directory",
            root
        )));
    }
    Ok(())
}

fn validate_patterns(settings: &Settings) -> Result<()> {
    for pat in settings.exclude.iter().chain(settings.include.iter()) {
        globset::Glob::new(pat)?;
    }
    Ok(())
}
