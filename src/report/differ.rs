// src/report/differ.rs

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::analysis::FileViolationSet;
use crate::report::ReportLine;

/// Build the report for one pass against the files flagged last pass.
///
/// Files with violations are reported in first-occurrence order. Every file
/// in `previous` that is clean now gets an empty BEGIN/END pair so a
/// consumer can retract what it showed. Returns the lines and the file set
/// to compare the next pass against.
pub fn diff_report(
    new_set: &FileViolationSet,
    previous: &BTreeSet<PathBuf>,
) -> (Vec<ReportLine>, BTreeSet<PathBuf>) {
    let mut lines = Vec::with_capacity(new_set.violation_count() + 2 * new_set.groups().len());

    for group in new_set.groups() {
        lines.push(ReportLine::BeginAnalysis {
            file: group.file.clone(),
        });
        for violation in &group.violations {
            lines.push(ReportLine::Message {
                violation: violation.clone(),
            });
        }
        lines.push(ReportLine::EndAnalysis {
            file: group.file.clone(),
        });
    }

    for file in previous {
        if !new_set.contains_file(file) {
            debug!(file = ?file, "file is clean now");
            lines.push(ReportLine::BeginAnalysis { file: file.clone() });
            lines.push(ReportLine::EndAnalysis { file: file.clone() });
        }
    }

    let next_previous = new_set.files().map(|f| f.to_path_buf()).collect();
    (lines, next_previous)
}

/// Holds the set of files flagged by the last completed pass.
#[derive(Debug, Default)]
pub struct ViolationSetDiffer {
    previous: BTreeSet<PathBuf>,
}

impl ViolationSetDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> &BTreeSet<PathBuf> {
        &self.previous
    }

    /// Report a completed pass and remember its flagged files.
    pub fn report(&mut self, new_set: &FileViolationSet) -> Vec<ReportLine> {
        let (lines, next) = diff_report(new_set, &self.previous);
        self.previous = next;
        lines
    }
}
