// src/analysis/invoker.rs

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analysis::{AnalysisEngine, AnalysisRequest, FileViolationSet};
use crate::watch::WatchTarget;

/// Runs one analysis pass over the watched root.
///
/// Candidate files are the direct children of the root that pass the
/// [`PathFilter`](crate::watch::PathFilter). Extra (unwatched) sources are
/// appended as-is on every pass.
pub struct AnalysisInvoker {
    target: WatchTarget,
    extra_sources: Vec<PathBuf>,
    languages: Vec<String>,
    rulesets: Vec<String>,
    cache_location: PathBuf,
    engine: Arc<dyn AnalysisEngine>,
}

impl std::fmt::Debug for AnalysisInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisInvoker")
            .field("target", &self.target)
            .field("extra_sources", &self.extra_sources)
            .field("languages", &self.languages)
            .field("rulesets", &self.rulesets)
            .field("cache_location", &self.cache_location)
            .finish_non_exhaustive()
    }
}

impl AnalysisInvoker {
    pub fn new(
        target: WatchTarget,
        languages: Vec<String>,
        rulesets: Vec<String>,
        cache_location: impl Into<PathBuf>,
        engine: Arc<dyn AnalysisEngine>,
    ) -> Self {
        Self {
            target,
            extra_sources: Vec::new(),
            languages,
            rulesets,
            cache_location: cache_location.into(),
            engine,
        }
    }

    /// Additional input paths handed to the engine but never watched.
    pub fn with_extra_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.extra_sources = sources;
        self
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Relevant direct children of the watched root, sorted by path.
    pub fn candidate_files(&self) -> Result<Vec<PathBuf>> {
        let root = self.target.root();
        let mut files = Vec::new();

        for entry in fs::read_dir(root).with_context(|| format!("reading dir {:?}", root))? {
            let entry = entry.with_context(|| format!("reading entry of {:?}", root))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if self.target.filter().is_relevant_path(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Build the engine request for the current directory contents.
    pub fn request(&self) -> Result<AnalysisRequest> {
        let mut input_paths = self.candidate_files()?;
        input_paths.extend(self.extra_sources.iter().cloned());

        Ok(AnalysisRequest {
            languages: self.languages.clone(),
            rulesets: self.rulesets.clone(),
            input_paths,
            cache_location: self.cache_location.clone(),
        })
    }

    /// Run one blocking pass through the engine.
    pub fn analyze(&self) -> Result<FileViolationSet> {
        let request = self.request()?;

        if request.input_paths.is_empty() {
            debug!(root = ?self.target.root(), "no relevant files; skipping engine call");
            return Ok(FileViolationSet::new());
        }

        debug!(inputs = request.input_paths.len(), "invoking analysis engine");
        let violations = self.engine.run(&request).context("analysis engine failed")?;
        let set: FileViolationSet = violations.into_iter().collect();

        info!(
            files = set.groups().len(),
            violations = set.violation_count(),
            "analysis pass finished"
        );
        Ok(set)
    }
}
