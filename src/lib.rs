// src/lib.rs

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod report;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::analysis::{AnalysisEngine, AnalysisInvoker, PmdCommandEngine};
use crate::cli::CliArgs;
use crate::config::{Settings, load_settings};
use crate::engine::{SessionOptions, ShutdownHandle, ShutdownReason, WatchSession};
use crate::report::WriterSink;
use crate::watch::{ChangeTracker, MonitorOptions, WatchTarget, spawn_monitor};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings (config file + flags)
/// - the analysis invoker and its PMD engine
/// - the mandatory first synchronous pass
/// - the file monitor and the coalescing watch session
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = load_settings(&args)?;

    if settings.dry_run {
        print_dry_run(&settings);
        return Ok(());
    }

    let root = settings
        .watch_root()
        .ok_or_else(|| anyhow!("no source to watch"))?
        .to_path_buf();
    let target = WatchTarget::new(root, settings.path_filter()?);

    let engine: Arc<dyn AnalysisEngine> = Arc::new(PmdCommandEngine::new(&settings.pmd));
    let invoker = AnalysisInvoker::new(
        target.clone(),
        settings.languages.clone(),
        settings.rulesets.clone(),
        settings.cache.clone(),
        engine,
    )
    .with_extra_sources(settings.extra_sources().to_vec());

    let tracker = ChangeTracker::new();
    let shutdown = ShutdownHandle::new();

    let mut session = WatchSession::new(
        Arc::new(invoker),
        WriterSink::stdout(),
        tracker.subscribe(),
        shutdown.subscribe(),
        SessionOptions {
            quiescence: settings.quiescence,
        },
    );

    // Baseline pass before anything is watched.
    let outcome = session.run_pass().await?;
    info!(?outcome, "initial pass complete");

    if settings.once {
        return outcome.into_result();
    }

    let _monitor = spawn_monitor(
        &target,
        tracker.clone(),
        shutdown.clone(),
        MonitorOptions {
            trigger_on_delete: settings.trigger_on_delete,
        },
    )
    .context("starting file monitor")?;

    session.announce_startup()?;

    // Ctrl-C → graceful shutdown.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            shutdown.request(ShutdownReason::Requested);
        });
    }

    session.run().await
}

/// Simple dry-run output: print the effective settings.
fn print_dry_run(settings: &Settings) {
    println!("pmdwatch dry-run");
    println!("  languages: {:?}", settings.languages);
    println!("  rulesets: {:?}", settings.rulesets);
    if let Some(root) = settings.watch_root() {
        println!("  watched root: {}", root.display());
    }
    if !settings.extra_sources().is_empty() {
        println!("  extra sources: {:?}", settings.extra_sources());
    }
    println!("  exclude: {:?}", settings.exclude);
    println!("  include: {:?}", settings.include);
    println!("  cache: {}", settings.cache.display());
    println!("  pmd: {}", settings.pmd.display());
    println!("  quiescence: {} ms", settings.quiescence.as_millis());
    if settings.trigger_on_delete {
        println!("  trigger_on_delete: true");
    }

    debug!("dry-run complete (no analysis)");
}
