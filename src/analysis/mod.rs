// src/analysis/mod.rs

//! The boundary to the static-analysis engine.
//!
//! - [`AnalysisEngine`] is the collaborator trait; [`pmd::PmdCommandEngine`]
//!   is the production implementation that shells out to the PMD CLI.
//! - [`invoker::AnalysisInvoker`] decides which files go into a pass and
//!   groups the engine's findings per file.

pub mod invoker;
pub mod pmd;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::types::EnginePriority;

pub use invoker::AnalysisInvoker;
pub use pmd::PmdCommandEngine;

/// 1-based line/column position in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One finding reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub file: PathBuf,
    pub begin: Position,
    pub end: Position,
    pub rule: String,
    pub priority: EnginePriority,
    pub description: String,
}

/// Everything the engine needs for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub languages: Vec<String>,
    pub rulesets: Vec<String>,
    pub input_paths: Vec<PathBuf>,
    /// Engine-owned incremental cache; opaque to pmdwatch.
    pub cache_location: PathBuf,
}

/// The external static-analysis engine.
///
/// Calls are synchronous and may block for a long time; the watch session
/// runs them on the blocking pool and never overlaps two calls.
pub trait AnalysisEngine: Send + Sync {
    fn run(&self, request: &AnalysisRequest) -> Result<Vec<Violation>>;
}

impl<F> AnalysisEngine for F
where
    F: Fn(&AnalysisRequest) -> Result<Vec<Violation>> + Send + Sync,
{
    fn run(&self, request: &AnalysisRequest) -> Result<Vec<Violation>> {
        self(request)
    }
}

/// Violations of one file, in engine order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileViolations {
    pub file: PathBuf,
    pub violations: Vec<Violation>,
}

/// Violations grouped by file. Files keep the order of their first
/// violation in the engine output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileViolationSet {
    groups: Vec<FileViolations>,
    index: HashMap<PathBuf, usize>,
}

impl FileViolationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        match self.index.get(&violation.file) {
            Some(&i) => self.groups[i].violations.push(violation),
            None => {
                self.index.insert(violation.file.clone(), self.groups.len());
                self.groups.push(FileViolations {
                    file: violation.file.clone(),
                    violations: vec![violation],
                });
            }
        }
    }

    pub fn groups(&self) -> &[FileViolations] {
        &self.groups
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.groups.iter().map(|g| g.file.as_path())
    }

    pub fn contains_file(&self, file: &Path) -> bool {
        self.index.contains_key(file)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of violations across all files.
    pub fn violation_count(&self) -> usize {
        self.groups.iter().map(|g| g.violations.len()).sum()
    }
}

impl FromIterator<Violation> for FileViolationSet {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        let mut set = FileViolationSet::new();
        for v in iter {
            set.push(v);
        }
        set
    }
}
