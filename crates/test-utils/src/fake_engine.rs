use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use tokio::time::Instant;

use pmdwatch::analysis::{AnalysisEngine, AnalysisRequest, Violation};
use pmdwatch::report::{ReportLine, ReportSink};

type RunHook = Box<dyn Fn(usize) + Send + Sync>;

/// One recorded engine invocation.
#[derive(Debug, Clone)]
pub struct EngineCall {
    /// Virtual-clock time the call started.
    pub at: Instant,
    pub request: AnalysisRequest,
}

/// A fake engine that:
/// - replays a script of results, repeating the last one when it runs out
/// - records every call with its (virtual) start time
/// - optionally runs a hook inside the call, e.g. to simulate a file
///   change while a pass is in flight.
#[derive(Default)]
pub struct ScriptedEngine {
    script: Mutex<VecDeque<Result<Vec<Violation>, String>>>,
    last: Mutex<Option<Result<Vec<Violation>, String>>>,
    calls: Mutex<Vec<EngineCall>>,
    hook: Option<RunHook>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, violations: Vec<Violation>) -> Self {
        self.script.lock().unwrap().push_back(Ok(violations));
        self
    }

    pub fn then_err(self, message: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
        self
    }

    /// Hook called with the 0-based call index at the start of each run.
    pub fn on_run(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl AnalysisEngine for ScriptedEngine {
    fn run(&self, request: &AnalysisRequest) -> Result<Vec<Violation>> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(EngineCall {
                at: Instant::now(),
                request: request.clone(),
            });
            calls.len() - 1
        };

        if let Some(hook) = &self.hook {
            hook(index);
        }

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        let result = match next {
            Some(result) => {
                *last = Some(result.clone());
                result
            }
            None => last.clone().unwrap_or_else(|| Ok(Vec::new())),
        };

        result.map_err(|msg| anyhow!(msg))
    }
}

/// Report sink that keeps rendered lines in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Forget everything recorded so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap())
    }
}

impl ReportSink for RecordingSink {
    fn emit(&mut self, line: &ReportLine) -> Result<()> {
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}
