// src/config/settings.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::engine::DEFAULT_QUIESCENCE;
use crate::watch::{DEFAULT_EXCLUDES, DEFAULT_INCLUDES, PathFilter, effective_patterns};

/// Default engine cache location.
pub const DEFAULT_CACHE: &str = ".pmdcache";
/// Default engine executable.
pub const DEFAULT_PMD: &str = "pmd";

/// Effective configuration after merging the config file and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub languages: Vec<String>,
    pub rulesets: Vec<String>,
    pub sources: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub include: Vec<String>,
    pub cache: PathBuf,
    pub pmd: PathBuf,
    pub quiescence: Duration,
    pub trigger_on_delete: bool,
    pub once: bool,
    pub dry_run: bool,
}

impl Settings {
    /// Merge: non-empty CLI lists replace file lists, CLI scalars win, and
    /// empty filter lists fall back to the defaults.
    pub fn resolve(args: &CliArgs, file: Option<ConfigFile>) -> Self {
        let file = file.unwrap_or_default();

        let exclude = prefer_cli(&args.excludes, file.watch.exclude);
        let include = prefer_cli(&args.includes, file.watch.include);

        Self {
            languages: prefer_cli(&args.languages, file.analysis.languages),
            rulesets: prefer_cli(&args.rulesets, file.analysis.rulesets),
            sources: prefer_cli(&args.sources, file.watch.sources),
            exclude: effective_patterns(&exclude, DEFAULT_EXCLUDES),
            include: effective_patterns(&include, DEFAULT_INCLUDES),
            cache: args
                .cache
                .clone()
                .or(file.analysis.cache)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE)),
            pmd: args
                .pmd
                .clone()
                .or(file.analysis.pmd)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PMD)),
            quiescence: args
                .quiescence_ms
                .or(file.watch.quiescence_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_QUIESCENCE),
            trigger_on_delete: args.trigger_on_delete
                || file.watch.trigger_on_delete.unwrap_or(false),
            once: args.once,
            dry_run: args.dry_run,
        }
    }

    /// The single watched directory (the first source).
    pub fn watch_root(&self) -> Option<&Path> {
        self.sources.first().map(PathBuf::as_path)
    }

    /// Sources after the first: analysed, never watched.
    pub fn extra_sources(&self) -> &[PathBuf] {
        self.sources.get(1..).unwrap_or(&[])
    }

    pub fn path_filter(&self) -> Result<PathFilter> {
        PathFilter::new(&self.exclude, &self.include)
    }
}

fn prefer_cli<T: Clone>(cli: &[T], file: Vec<T>) -> Vec<T> {
    if cli.is_empty() { file } else { cli.to_vec() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::{AnalysisSection, WatchSection};

    fn file() -> ConfigFile {
        ConfigFile {
            analysis: AnalysisSection {
                languages: vec!["plsql".into()],
                rulesets: vec!["file-rules.xml".into()],
                cache: Some(PathBuf::from("/tmp/cache")),
                pmd: None,
            },
            watch: WatchSection {
                sources: vec![PathBuf::from("/db"), PathBuf::from("/shared")],
                exclude: vec![],
                include: vec!["*.pkb".into()],
                quiescence_ms: Some(500),
                trigger_on_delete: Some(true),
            },
        }
    }

    #[test]
    fn cli_lists_replace_file_lists() {
        let args = CliArgs {
            rulesets: vec!["cli-rules.xml".into()],
            quiescence_ms: Some(50),
            ..CliArgs::default()
        };
        let s = Settings::resolve(&args, Some(file()));

        assert_eq!(s.rulesets, vec!["cli-rules.xml"]);
        assert_eq!(s.languages, vec!["plsql"]);
        assert_eq!(s.quiescence, Duration::from_millis(50));
        assert_eq!(s.cache, PathBuf::from("/tmp/cache"));
        assert_eq!(s.pmd, PathBuf::from(DEFAULT_PMD));
        assert!(s.trigger_on_delete);
    }

    #[test]
    fn filters_default_per_list() {
        let s = Settings::resolve(&CliArgs::default(), Some(file()));
        assert_eq!(s.exclude, vec![".*", "*.log"]);
        assert_eq!(s.include, vec!["*.pkb"]);
    }

    #[test]
    fn only_first_source_is_watched() {
        let s = Settings::resolve(&CliArgs::default(), Some(file()));
        assert_eq!(s.watch_root(), Some(Path::new("/db")));
        assert_eq!(s.extra_sources(), [PathBuf::from("/shared")]);
    }

    #[test]
    fn no_sources_means_no_root() {
        let s = Settings::resolve(&CliArgs::default(), None);
        assert_eq!(s.watch_root(), None);
        assert!(s.extra_sources().is_empty());
        assert_eq!(s.quiescence, DEFAULT_QUIESCENCE);
    }
}
