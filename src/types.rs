// src/types.rs

use std::fmt;

/// Priority attached to a violation by the analysis engine.
///
/// PMD encodes these as the numbers 1 (high) to 5 (low).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnginePriority {
    High,
    MediumHigh,
    Medium,
    MediumLow,
    Low,
    /// Any level the engine reports that we do not know about.
    Unknown(u8),
}

impl EnginePriority {
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => EnginePriority::High,
            2 => EnginePriority::MediumHigh,
            3 => EnginePriority::Medium,
            4 => EnginePriority::MediumLow,
            5 => EnginePriority::Low,
            other => EnginePriority::Unknown(other),
        }
    }
}

/// Severity label printed on `MSG` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportSeverity {
    Fatal,
    Error,
    Warning,
    Info,
}

impl From<EnginePriority> for ReportSeverity {
    fn from(priority: EnginePriority) -> Self {
        match priority {
            EnginePriority::High => ReportSeverity::Fatal,
            EnginePriority::MediumHigh => ReportSeverity::Error,
            EnginePriority::Medium | EnginePriority::MediumLow => ReportSeverity::Warning,
            EnginePriority::Low => ReportSeverity::Info,
            // Unknown priorities are never downgraded.
            EnginePriority::Unknown(_) => ReportSeverity::Error,
        }
    }
}

impl fmt::Display for ReportSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportSeverity::Fatal => "FATAL",
            ReportSeverity::Error => "ERROR",
            ReportSeverity::Warning => "WARNING",
            ReportSeverity::Info => "INFO",
        };
        f.write_str(label)
    }
}
