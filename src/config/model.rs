// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [analysis]
/// languages = ["plsql"]
/// rulesets = ["rulesets/plsql.xml"]
/// cache = ".pmdcache"
/// pmd = "/opt/pmd/bin/pmd"
///
/// [watch]
/// sources = ["db"]
/// exclude = [".*", "*.log"]
/// include = ["*.sql", "*.pkb"]
/// quiescence_ms = 200
/// trigger_on_delete = false
/// ```
///
/// All sections are optional; command-line flags fill in or override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub analysis: AnalysisSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[analysis]` section: what the engine is asked to do.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSection {
    #[serde(default)]
    pub languages: Vec<String>,

    /// Ruleset references, passed to PMD verbatim.
    #[serde(default)]
    pub rulesets: Vec<String>,

    /// Engine cache location.
    #[serde(default)]
    pub cache: Option<PathBuf>,

    /// PMD executable.
    #[serde(default)]
    pub pmd: Option<PathBuf>,
}

/// `[watch]` section: what is watched and when passes run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// The first source is watched; the rest are static engine inputs.
    #[serde(default)]
    pub sources: Vec<PathBuf>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub quiescence_ms: Option<u64>,

    #[serde(default)]
    pub trigger_on_delete: Option<bool>,
}

impl ConfigFile {
    /// Resolve relative `sources` and `cache` against `base` (normally the
    /// directory holding the config file). Rulesets are left alone since
    /// PMD also accepts built-in references like `category/plsql/design.xml`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let rebase = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };

        self.watch.sources = self.watch.sources.into_iter().map(rebase).collect();
        self.analysis.cache = self.analysis.cache.map(rebase);
        self
    }
}
