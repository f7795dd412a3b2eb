// src/engine/runtime.rs

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::time::{Instant, timeout};
use tracing::{debug, error, info, warn};

use crate::analysis::AnalysisInvoker;
use crate::engine::core::{Coalescer, CoalescerAction, CoalescerInput};
use crate::engine::shutdown::{ShutdownListener, ShutdownReason};
use crate::report::{ReportLine, ReportSink, ViolationSetDiffer};
use crate::watch::ChangeSignal;

/// Stability period required before a pass starts.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub quiescence: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            quiescence: DEFAULT_QUIESCENCE,
        }
    }
}

/// How a single pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Reported { files: usize, violations: usize },
    /// The engine failed; an `ANALYSIS-FAILED` line was emitted and the
    /// previous file set was left untouched.
    Failed(String),
}

impl PassOutcome {
    /// Exit status of a single-pass (`--once`) run.
    pub fn into_result(self) -> Result<()> {
        match self {
            PassOutcome::Reported { .. } => Ok(()),
            PassOutcome::Failed(reason) => Err(anyhow!("analysis failed: {reason}")),
        }
    }
}

enum Wake {
    Shutdown(ShutdownReason),
    Signal,
    Quiet,
}

/// The async shell around [`Coalescer`].
///
/// Owns everything the coalescer task touches: the change signal (read and
/// clear side), the invoker, the differ with its previous-file set and the
/// report sink. The monitor only ever sees the [`ChangeTracker`] side.
///
/// [`ChangeTracker`]: crate::watch::ChangeTracker
pub struct WatchSession<S> {
    core: Coalescer,
    invoker: Arc<AnalysisInvoker>,
    differ: ViolationSetDiffer,
    sink: S,
    signal: ChangeSignal,
    shutdown: ShutdownListener,
    options: SessionOptions,
    passes_completed: u64,
}

impl<S: ReportSink> WatchSession<S> {
    pub fn new(
        invoker: Arc<AnalysisInvoker>,
        sink: S,
        signal: ChangeSignal,
        shutdown: ShutdownListener,
        options: SessionOptions,
    ) -> Self {
        Self {
            core: Coalescer::new(),
            invoker,
            differ: ViolationSetDiffer::new(),
            sink,
            signal,
            shutdown,
            options,
            passes_completed: 0,
        }
    }

    /// Files flagged by the last completed pass.
    pub fn previous_files(&self) -> &BTreeSet<PathBuf> {
        self.differ.previous()
    }

    pub fn passes_completed(&self) -> u64 {
        self.passes_completed
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Emit the `STARTUP` line for the watched root.
    pub fn announce_startup(&mut self) -> Result<()> {
        let root = self.invoker.target().root().to_path_buf();
        info!(root = ?root, "watching");
        self.sink.emit(&ReportLine::Startup { roots: vec![root] })
    }

    /// Run one analysis pass and stream its report.
    ///
    /// Engine failures are reported and swallowed; only a broken report
    /// sink is returned as an error.
    pub async fn run_pass(&mut self) -> Result<PassOutcome> {
        let invoker = Arc::clone(&self.invoker);
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || invoker.analyze())
            .await
            .map_err(|join_err| anyhow!("analysis task aborted: {join_err}"))
            .and_then(|res| res);

        self.passes_completed += 1;

        match result {
            Ok(set) => {
                let lines = self.differ.report(&set);
                self.sink.emit_all(&lines)?;
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    lines = lines.len(),
                    "pass reported"
                );
                Ok(PassOutcome::Reported {
                    files: set.groups().len(),
                    violations: set.violation_count(),
                })
            }
            Err(err) => {
                let reason = format!("{err:#}");
                error!(error = %reason, "analysis pass failed; waiting for further changes");
                self.sink.emit(&ReportLine::AnalysisFailed {
                    reason: reason.clone(),
                })?;
                Ok(PassOutcome::Failed(reason))
            }
        }
    }

    /// Coalesce changes into passes until shutdown.
    ///
    /// Shutdown is honoured while idle or pending, never in the middle of a
    /// pass. A monitor failure ends the session with an error.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            quiescence_ms = self.options.quiescence.as_millis() as u64,
            "watch session started"
        );

        let mut action = self.core.next_action();
        let reason = loop {
            let input = match action {
                CoalescerAction::WaitForChange => {
                    let wake = tokio::select! {
                        biased;
                        reason = self.shutdown.wait() => Wake::Shutdown(reason),
                        res = self.signal.wait() => {
                            res?;
                            Wake::Signal
                        }
                    };
                    match wake {
                        Wake::Shutdown(reason) => break reason,
                        _ => CoalescerInput::SignalCleared {
                            counter: self.signal.clear(),
                        },
                    }
                }
                CoalescerAction::AwaitQuiescence => {
                    let window = self.options.quiescence;
                    let wake = tokio::select! {
                        biased;
                        reason = self.shutdown.wait() => Wake::Shutdown(reason),
                        res = timeout(window, self.signal.wait()) => match res {
                            Ok(res) => {
                                res?;
                                Wake::Signal
                            }
                            Err(_elapsed) => Wake::Quiet,
                        }
                    };
                    match wake {
                        Wake::Shutdown(reason) => break reason,
                        Wake::Signal => CoalescerInput::SignalCleared {
                            counter: self.signal.clear(),
                        },
                        Wake::Quiet => CoalescerInput::QuiescenceElapsed,
                    }
                }
                CoalescerAction::Analyze { snapshot } => {
                    if self.shutdown.is_requested() {
                        break self.shutdown.wait().await;
                    }
                    info!(snapshot, pass = self.core.passes_started(), "changes settled; analysing");
                    self.run_pass().await?;
                    CoalescerInput::PassCompleted {
                        counter: self.signal.clear(),
                    }
                }
            };
            action = self.core.step(input);
        };

        let root = self.invoker.target().root().display().to_string();
        match reason {
            ShutdownReason::Requested => {
                info!("shutdown requested, stopping watch session");
                self.sink.emit(&ReportLine::Shutdown {
                    reason: format!("Stopped watching {root}"),
                })?;
                Ok(())
            }
            ShutdownReason::MonitorFailed(msg) => {
                warn!(error = %msg, "file monitor failed, stopping watch session");
                self.sink.emit(&ReportLine::Shutdown {
                    reason: format!("Monitor failed for {root}: {msg}"),
                })?;
                Err(anyhow!("file monitor failed: {msg}"))
            }
        }
    }
}
