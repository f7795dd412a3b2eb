// src/report/mod.rs

//! The line-oriented console protocol.
//!
//! ```text
//! STARTUP Watching directories: <list>
//! BEGIN-ANALYSIS <file-path>
//! MSG <beginLine>:<beginCol> to <endLine>:<endCol> <SEVERITY> [<rule>] <description>
//! END-ANALYSIS <file-path>
//! ANALYSIS-FAILED <reason>
//! SHUTDOWN <reason>
//! ```

pub mod differ;
pub mod sink;

use std::fmt;
use std::path::PathBuf;

use crate::analysis::Violation;
use crate::types::ReportSeverity;

pub use differ::{ViolationSetDiffer, diff_report};
pub use sink::{ReportSink, WriterSink};

/// One line of the console stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Startup { roots: Vec<PathBuf> },
    BeginAnalysis { file: PathBuf },
    Message { violation: Violation },
    EndAnalysis { file: PathBuf },
    AnalysisFailed { reason: String },
    Shutdown { reason: String },
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLine::Startup { roots } => {
                let list: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
                write!(f, "STARTUP Watching directories: {}", list.join(", "))
            }
            ReportLine::BeginAnalysis { file } => write!(f, "BEGIN-ANALYSIS {}", file.display()),
            ReportLine::Message { violation: v } => write!(
                f,
                "MSG {}:{} to {}:{} {} [{}] {}",
                v.begin.line,
                v.begin.column,
                v.end.line,
                v.end.column,
                ReportSeverity::from(v.priority),
                v.rule,
                // Keep one event per line.
                v.description.replace(['\r', '\n'], " ")
            ),
            ReportLine::EndAnalysis { file } => write!(f, "END-ANALYSIS {}", file.display()),
            ReportLine::AnalysisFailed { reason } => {
                write!(f, "ANALYSIS-FAILED {}", reason.replace(['\r', '\n'], " "))
            }
            ReportLine::Shutdown { reason } => write!(f, "SHUTDOWN {reason}"),
        }
    }
}
