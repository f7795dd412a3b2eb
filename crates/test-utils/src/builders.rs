#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use pmdwatch::analysis::{AnalysisInvoker, Position, Violation};
use pmdwatch::engine::{SessionOptions, ShutdownHandle, WatchSession};
use pmdwatch::types::EnginePriority;
use pmdwatch::watch::{ChangeTracker, PathFilter, WatchTarget};

use crate::fake_engine::{RecordingSink, ScriptedEngine};

/// Builder for `Violation` to simplify test setup.
pub struct ViolationBuilder {
    violation: Violation,
}

impl ViolationBuilder {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            violation: Violation {
                file: file.into(),
                begin: Position::new(1, 1),
                end: Position::new(1, 1),
                rule: "TestRule".to_string(),
                priority: EnginePriority::Medium,
                description: "test violation".to_string(),
            },
        }
    }

    pub fn at(mut self, begin: (u32, u32), end: (u32, u32)) -> Self {
        self.violation.begin = Position::new(begin.0, begin.1);
        self.violation.end = Position::new(end.0, end.1);
        self
    }

    pub fn rule(mut self, rule: &str) -> Self {
        self.violation.rule = rule.to_string();
        self
    }

    pub fn priority(mut self, level: u8) -> Self {
        self.violation.priority = EnginePriority::from_level(level);
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.violation.description = text.to_string();
        self
    }

    pub fn build(self) -> Violation {
        self.violation
    }
}

/// Shorthand for a violation in `file` at `line`.
pub fn violation(file: &str, line: u32) -> Violation {
    ViolationBuilder::new(file).at((line, 1), (line, 10)).build()
}

/// Everything a session test needs to poke at from the outside.
pub struct Harness {
    pub tracker: ChangeTracker,
    pub shutdown: ShutdownHandle,
    pub engine: Arc<ScriptedEngine>,
    pub sink: RecordingSink,
    pub dir: TempDir,
}

impl Harness {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Build a session over a temp dir holding one relevant file, so every pass
/// reaches the engine.
pub fn session_with(
    engine: Arc<ScriptedEngine>,
    quiescence: Duration,
) -> (WatchSession<RecordingSink>, Harness) {
    session_with_tracker(engine, quiescence, ChangeTracker::new())
}

/// Like [`session_with`], for tests whose engine needs the tracker up front
/// (e.g. to simulate a change while a pass is running).
pub fn session_with_tracker(
    engine: Arc<ScriptedEngine>,
    quiescence: Duration,
    tracker: ChangeTracker,
) -> (WatchSession<RecordingSink>, Harness) {
    session_with_handles(engine, quiescence, tracker, ShutdownHandle::new())
}

/// Full control over the shared handles, e.g. for an engine that requests
/// shutdown from inside a pass.
pub fn session_with_handles(
    engine: Arc<ScriptedEngine>,
    quiescence: Duration,
    tracker: ChangeTracker,
    shutdown: ShutdownHandle,
) -> (WatchSession<RecordingSink>, Harness) {
    let dir = tempfile::tempdir().expect("creating temp dir");
    std::fs::write(dir.path().join("orders.sql"), "select 1 from dual;\n")
        .expect("writing fixture file");

    let filter = PathFilter::with_defaults().expect("default filter");
    let target = WatchTarget::new(dir.path(), filter);
    let invoker = AnalysisInvoker::new(
        target,
        vec!["plsql".to_string()],
        vec!["rules.xml".to_string()],
        dir.path().join(".pmdcache"),
        engine.clone(),
    );

    let sink = RecordingSink::new();

    let session = WatchSession::new(
        Arc::new(invoker),
        sink.clone(),
        tracker.subscribe(),
        shutdown.subscribe(),
        SessionOptions { quiescence },
    );

    let harness = Harness {
        tracker,
        shutdown,
        engine,
        sink,
        dir,
    };
    (session, harness)
}
