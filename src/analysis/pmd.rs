// src/analysis/pmd.rs

//! Analysis engine backed by the PMD 7 command line.
//!
//! Each pass runs `pmd check` with the JSON renderer and parses its report
//! from stdout. The input files are handed over through `--file-list` so
//! long directory listings never hit command-line length limits. PMD owns
//! the incremental cache given via `--cache`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisEngine, AnalysisRequest, Position, Violation};
use crate::errors::PmdwatchError;
use crate::types::EnginePriority;

/// PMD exit status: no violations.
const EXIT_CLEAN: i32 = 0;
/// PMD exit status: violations found.
const EXIT_VIOLATIONS: i32 = 4;
/// PMD exit status: some files could not be processed.
const EXIT_RECOVERABLE_ERRORS: i32 = 5;

/// Runs the `pmd` executable for every pass.
#[derive(Debug, Clone)]
pub struct PmdCommandEngine {
    program: PathBuf,
}

impl Default for PmdCommandEngine {
    fn default() -> Self {
        Self::new("pmd")
    }
}

impl PmdCommandEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for `pmd`, given the path of the written file list.
    pub fn arguments(&self, request: &AnalysisRequest, file_list: &Path) -> Vec<String> {
        let mut args = vec![
            "check".to_string(),
            "--no-progress".to_string(),
            "--format".to_string(),
            "json".to_string(),
            "--rulesets".to_string(),
            request.rulesets.join(","),
            "--file-list".to_string(),
            file_list.display().to_string(),
            "--cache".to_string(),
            request.cache_location.display().to_string(),
        ];

        match request.languages.as_slice() {
            [only] => {
                args.push("--force-language".to_string());
                args.push(only.clone());
            }
            many => {
                debug!(languages = ?many, "several languages configured; PMD picks by file extension");
            }
        }

        args
    }
}

impl AnalysisEngine for PmdCommandEngine {
    fn run(&self, request: &AnalysisRequest) -> Result<Vec<Violation>> {
        let entries = file_list_entries(&request.input_paths);
        if entries.is_empty() {
            warn!("no input paths can be passed to PMD; skipping pass");
            return Ok(Vec::new());
        }

        let mut file_list = tempfile::NamedTempFile::new().context("creating PMD file list")?;
        for entry in &entries {
            writeln!(file_list, "{entry}").context("writing PMD file list")?;
        }
        file_list.flush().context("flushing PMD file list")?;

        let args = self.arguments(request, file_list.path());
        debug!(program = ?self.program, ?args, "running PMD");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("spawning {:?}", self.program))?;

        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr);

        match code {
            EXIT_CLEAN | EXIT_VIOLATIONS => {}
            EXIT_RECOVERABLE_ERRORS => {
                warn!(exit_code = code, "PMD reported recoverable processing errors");
            }
            _ => {
                return Err(PmdwatchError::EngineError(format!(
                    "{:?} exited with status {code}: {}",
                    self.program,
                    stderr.trim()
                ))
                .into());
            }
        }

        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "PMD stderr");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_json_report(&stdout)
    }
}

/// Lines for `--file-list`.
///
/// PMD splits each line on `,` and trims the pieces, so paths containing a
/// comma, a line break or surrounding whitespace cannot be expressed and
/// are left out.
fn file_list_entries(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|path| {
            let entry = path.display().to_string();
            if entry.contains([',', '\n', '\r']) || entry.trim() != entry {
                warn!(path = %entry, "path cannot be listed for PMD; not analysed");
                None
            } else {
                Some(entry)
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    #[serde(default)]
    files: Vec<JsonFile>,
    #[serde(default)]
    processing_errors: Vec<JsonProcessingError>,
    #[serde(default)]
    configuration_errors: Vec<JsonConfigurationError>,
}

#[derive(Debug, Deserialize)]
struct JsonFile {
    filename: PathBuf,
    #[serde(default)]
    violations: Vec<JsonViolation>,
}

#[derive(Debug, Deserialize)]
struct JsonViolation {
    beginline: u32,
    begincolumn: u32,
    endline: u32,
    endcolumn: u32,
    description: String,
    rule: String,
    priority: u8,
}

#[derive(Debug, Deserialize)]
struct JsonProcessingError {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JsonConfigurationError {
    #[serde(default)]
    rule: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Turn PMD's JSON report into violations, in report order.
pub fn parse_json_report(json: &str) -> Result<Vec<Violation>> {
    let report: JsonReport =
        serde_json::from_str(json).context("parsing PMD JSON report")?;

    for err in &report.processing_errors {
        warn!(
            file = err.filename.as_deref().unwrap_or("?"),
            message = err.message.as_deref().unwrap_or(""),
            "PMD processing error"
        );
    }
    for err in &report.configuration_errors {
        warn!(
            rule = err.rule.as_deref().unwrap_or("?"),
            message = err.message.as_deref().unwrap_or(""),
            "PMD configuration error"
        );
    }

    let violations: Vec<Violation> = report
        .files
        .into_iter()
        .flat_map(|file| {
            let path = file.filename;
            file.violations.into_iter().map(move |v| Violation {
                file: path.clone(),
                begin: Position::new(v.beginline, v.begincolumn),
                end: Position::new(v.endline, v.endcolumn),
                rule: v.rule,
                priority: EnginePriority::from_level(v.priority),
                description: v.description,
            })
        })
        .collect();

    info!(violations = violations.len(), "parsed PMD report");
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
      "formatVersion": 0,
      "pmdVersion": "7.9.0",
      "timestamp": "2024-12-01T10:00:00.000+01:00",
      "files": [
        {
          "filename": "db/orders.pkb",
          "violations": [
            {
              "beginline": 12, "begincolumn": 5, "endline": 12, "endcolumn": 40,
              "description": "Avoid using SELECT *",
              "rule": "AvoidSelectStar", "ruleset": "Best Practices",
              "priority": 3, "externalInfoUrl": "https://example.invalid"
            },
            {
              "beginline": 30, "begincolumn": 1, "endline": 31, "endcolumn": 2,
              "description": "Too complex",
              "rule": "CyclomaticComplexity", "ruleset": "Design",
              "priority": 1
            }
          ]
        },
        { "filename": "db/empty.sql", "violations": [] }
      ],
      "suppressedViolations": [],
      "processingErrors": [
        { "filename": "db/broken.sql", "message": "ParseException", "detail": "..." }
      ],
      "configurationErrors": []
    }"#;

    #[test]
    fn json_report_is_flattened_in_order() {
        let violations = parse_json_report(REPORT).unwrap();

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].file, PathBuf::from("db/orders.pkb"));
        assert_eq!(violations[0].begin, Position::new(12, 5));
        assert_eq!(violations[0].end, Position::new(12, 40));
        assert_eq!(violations[0].priority, EnginePriority::Medium);
        assert_eq!(violations[1].rule, "CyclomaticComplexity");
        assert_eq!(violations[1].priority, EnginePriority::High);
    }

    #[test]
    fn malformed_report_is_an_error() {
        assert!(parse_json_report("PMD crashed").is_err());
    }

    #[test]
    fn unlistable_paths_are_left_out() {
        let paths = vec![
            PathBuf::from("db/orders.pkb"),
            PathBuf::from("db/a,b.sql"),
            PathBuf::from("db/ padded.sql"),
            PathBuf::from("db/trailing.sql "),
        ];
        assert_eq!(file_list_entries(&paths), ["db/orders.pkb"]);
    }

    #[test]
    fn nothing_listable_skips_the_engine() {
        let engine = PmdCommandEngine::new("/definitely/not/pmd");
        let request = AnalysisRequest {
            languages: vec!["plsql".into()],
            rulesets: vec!["a.xml".into()],
            input_paths: vec![PathBuf::from("db/x,y.sql")],
            cache_location: PathBuf::from(".pmdcache"),
        };
        assert!(engine.run(&request).unwrap().is_empty());
    }

    #[test]
    fn single_language_is_forced() {
        let engine = PmdCommandEngine::new("pmd");
        let request = AnalysisRequest {
            languages: vec!["plsql".into()],
            rulesets: vec!["a.xml".into(), "b.xml".into()],
            input_paths: vec![],
            cache_location: PathBuf::from(".pmdcache"),
        };
        let args = engine.arguments(&request, Path::new("/tmp/list"));

        assert_eq!(args[0], "check");
        assert!(args.windows(2).any(|w| w == ["--rulesets", "a.xml,b.xml"]));
        assert!(args.windows(2).any(|w| w == ["--file-list", "/tmp/list"]));
        assert!(args.windows(2).any(|w| w == ["--cache", ".pmdcache"]));
        assert!(args.windows(2).any(|w| w == ["--force-language", "plsql"]));
    }
}
