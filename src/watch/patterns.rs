// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Exclude patterns used when none are configured.
pub const DEFAULT_EXCLUDES: &[&str] = &[".*", "*.log"];

/// Include patterns used when none are configured: the PL/SQL file family.
pub const DEFAULT_INCLUDES: &[&str] = &[
    "*.sql", "*.pkb", "*.pks", "*.pck", "*.vw", "*.typ", "*.fnc", "*.prc",
];

/// Decides whether a file is analysis-relevant.
///
/// Patterns are matched against the file's base name only, never the full
/// path. An exclude match always wins; files that match no include pattern
/// are ignored.
#[derive(Clone)]
pub struct PathFilter {
    exclude: Vec<String>,
    include: Vec<String>,
    exclude_set: GlobSet,
    include_set: GlobSet,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFilter")
            .field("exclude", &self.exclude)
            .field("include", &self.include)
            .finish_non_exhaustive()
    }
}

impl PathFilter {
    /// Build a filter from exactly these patterns.
    pub fn new(exclude: &[String], include: &[String]) -> Result<Self> {
        let exclude_set = build_globset(exclude).context("building exclude globset")?;
        let include_set = build_globset(include).context("building include globset")?;

        Ok(Self {
            exclude: exclude.to_vec(),
            include: include.to_vec(),
            exclude_set,
            include_set,
        })
    }

    /// Filter using [`DEFAULT_EXCLUDES`] and [`DEFAULT_INCLUDES`].
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            &effective_patterns(&[], DEFAULT_EXCLUDES),
            &effective_patterns(&[], DEFAULT_INCLUDES),
        )
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude
    }

    pub fn include_patterns(&self) -> &[String] {
        &self.include
    }

    /// Returns true if a file with this base name should be analysed.
    pub fn is_relevant(&self, file_name: &str) -> bool {
        if self.exclude_set.is_match(file_name) {
            return false;
        }
        self.include_set.is_match(file_name)
    }

    /// Same as [`PathFilter::is_relevant`], using the last component of `path`.
    pub fn is_relevant_path(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.is_relevant(&name.to_string_lossy()),
            None => false,
        }
    }
}

/// The single watched root plus the filter applied to everything under it.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    root: PathBuf,
    filter: PathFilter,
}

impl WatchTarget {
    pub fn new(root: impl Into<PathBuf>, filter: PathFilter) -> Self {
        Self {
            root: root.into(),
            filter,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }
}

/// Configured patterns if any were given, otherwise the defaults.
pub fn effective_patterns(configured: &[String], defaults: &[&str]) -> Vec<String> {
    if configured.is_empty() {
        defaults.iter().map(|s| s.to_string()).collect()
    } else {
        configured.to_vec()
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_filter_accepts_sql_and_rejects_logs_and_plain_names() {
        let filter = PathFilter::with_defaults().unwrap();

        assert!(filter.is_relevant("proc.sql"));
        assert!(filter.is_relevant("pkg_orders.pkb"));
        assert!(!filter.is_relevant("report.log"));
        assert!(!filter.is_relevant("README"));
        assert!(!filter.is_relevant(".hidden.sql"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = PathFilter::new(&patterns(&["tmp_*"]), &patterns(&["*.sql"])).unwrap();

        assert!(filter.is_relevant("orders.sql"));
        assert!(!filter.is_relevant("tmp_orders.sql"));
    }

    #[test]
    fn only_the_base_name_is_matched() {
        let filter = PathFilter::new(&patterns(&["build*"]), &patterns(&["*.sql"])).unwrap();

        assert!(filter.is_relevant_path(Path::new("build/out/orders.sql")));
        assert!(!filter.is_relevant_path(Path::new("src/build_all.sql")));
    }

    #[test]
    fn empty_configuration_falls_back_to_defaults() {
        assert_eq!(effective_patterns(&[], DEFAULT_EXCLUDES), patterns(&[".*", "*.log"]));
        assert_eq!(
            effective_patterns(&patterns(&["*.txt"]), DEFAULT_INCLUDES),
            patterns(&["*.txt"])
        );
    }

    #[test]
    fn invalid_glob_is_reported() {
        assert!(PathFilter::new(&patterns(&["[unclosed"]), &[]).is_err());
    }
}
