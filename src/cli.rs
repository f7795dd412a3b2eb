// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every list flag is repeatable (`--source a --source b`) and is collected
//! into its own vector; there is no positional fallthrough between flags.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

/// Command-line arguments for `pmdwatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "pmdwatch",
    version,
    about = "Watch a directory and stream incremental PMD violation reports.",
    long_about = None
)]
pub struct CliArgs {
    /// Language passed to the analysis engine (repeatable).
    #[arg(long = "language", value_name = "LANG", action = ArgAction::Append)]
    pub languages: Vec<String>,

    /// Ruleset passed to the analysis engine (repeatable).
    #[arg(long = "ruleset", value_name = "RULESET", action = ArgAction::Append)]
    pub rulesets: Vec<String>,

    /// Source directory. The first one is watched; any further sources are
    /// analysed on every pass but not monitored.
    #[arg(long = "source", value_name = "PATH", action = ArgAction::Append)]
    pub sources: Vec<PathBuf>,

    /// File-name glob that is never analysed (repeatable, wins over includes).
    #[arg(long = "exclude", value_name = "GLOB", action = ArgAction::Append)]
    pub excludes: Vec<String>,

    /// File-name glob that is analysed (repeatable).
    #[arg(long = "include", value_name = "GLOB", action = ArgAction::Append)]
    pub includes: Vec<String>,

    /// Optional TOML config file. Flags given on the command line win.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Location of the engine's incremental analysis cache.
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// PMD executable used as the analysis engine.
    #[arg(long, value_name = "PROGRAM")]
    pub pmd: Option<PathBuf>,

    /// Quiet period (milliseconds) required before a pass starts.
    #[arg(long, value_name = "MILLIS")]
    pub quiescence_ms: Option<u64>,

    /// Also start a pass when a relevant file is deleted.
    #[arg(long)]
    pub trigger_on_delete: bool,

    /// Run a single analysis pass and exit, no watching.
    #[arg(long)]
    pub once: bool,

    /// Print the effective configuration and exit without analysing.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PMDWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
