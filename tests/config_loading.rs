// tests/config_loading.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pmdwatch::cli::CliArgs;
use pmdwatch::config::{load_from_path, load_settings};

type TestResult = Result<(), Box<dyn Error>>;

const CONFIG: &str = r#"
[analysis]
languages = ["plsql"]
rulesets = ["category/plsql/bestpractices.xml"]
cache = "cache/pmd.bin"

[watch]
sources = ["db", "/opt/shared/sql"]
include = ["*.sql", "*.pkb"]
quiescence_ms = 350
"#;

#[test]
fn config_file_paths_are_relative_to_the_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pmdwatch.toml");
    fs::write(&path, CONFIG)?;

    let cfg = load_from_path(&path)?;
    assert_eq!(
        cfg.watch.sources,
        vec![dir.path().join("db"), PathBuf::from("/opt/shared/sql")]
    );
    assert_eq!(cfg.analysis.cache, Some(dir.path().join("cache/pmd.bin")));
    assert_eq!(cfg.analysis.rulesets, vec!["category/plsql/bestpractices.xml"]);
    Ok(())
}

#[test]
fn settings_combine_file_and_flags() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("db"))?;
    let path = dir.path().join("pmdwatch.toml");
    fs::write(&path, CONFIG)?;

    let args = CliArgs {
        config: Some(path),
        excludes: vec!["*_old.sql".into()],
        trigger_on_delete: true,
        ..CliArgs::default()
    };
    let settings = load_settings(&args)?;

    assert_eq!(settings.watch_root(), Some(dir.path().join("db").as_path()));
    assert_eq!(settings.exclude, vec!["*_old.sql"]);
    assert_eq!(settings.include, vec!["*.sql", "*.pkb"]);
    assert_eq!(settings.quiescence, Duration::from_millis(350));
    assert!(settings.trigger_on_delete);

    let filter = settings.path_filter()?;
    assert!(filter.is_relevant("orders.pkb"));
    assert!(!filter.is_relevant("orders_old.sql"));
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pmdwatch.toml");
    fs::write(&path, "[watch]\nrecursive = true\n")?;

    let err = load_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("recursive"), "{err:#}");
    Ok(())
}

#[test]
fn missing_language_stops_startup() -> TestResult {
    let dir = tempfile::tempdir()?;
    let args = CliArgs {
        sources: vec![dir.path().to_path_buf()],
        rulesets: vec!["rules.xml".into()],
        ..CliArgs::default()
    };

    let err = load_settings(&args).unwrap_err();
    assert!(err.to_string().contains("no languages"), "{err}");
    Ok(())
}
