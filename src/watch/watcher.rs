// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use notify::event::{EventKind, RemoveKind};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::engine::shutdown::{ShutdownHandle, ShutdownReason};
use crate::watch::patterns::{PathFilter, WatchTarget};
use crate::watch::signal::ChangeTracker;

/// Knobs for the filesystem monitor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorOptions {
    /// Count deletions of relevant files as changes.
    ///
    /// Off by default: a deletion is only logged, so a deleted file's
    /// clear-notification waits for the next unrelated change.
    pub trigger_on_delete: bool,
}

/// What the monitor does with a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// Increment the change counter.
    Count,
    /// A deletion that is logged but not counted.
    LogDeletion,
    /// The OS dropped notifications; accuracy gap, ignored.
    Overflow,
    Ignore,
}

/// Handle for the filesystem monitor.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops the
/// OS subscription and ends the forwarding task.
pub struct MonitorHandle {
    _inner: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("finished", &self.task.is_finished())
            .finish_non_exhaustive()
    }
}

impl MonitorHandle {
    /// True once the forwarding task has stopped (shutdown or failure).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Start watching the target root (direct children only).
///
/// An invalid root or a failed subscription is returned as an error. Once
/// running, an error delivered by the OS watcher requests a session shutdown
/// with [`ShutdownReason::MonitorFailed`], as does the event channel closing.
/// A shutdown request from elsewhere stops the forwarding loop.
pub fn spawn_monitor(
    target: &WatchTarget,
    tracker: ChangeTracker,
    shutdown: ShutdownHandle,
    options: MonitorOptions,
) -> Result<MonitorHandle> {
    let root = target.root();
    if !root.is_dir() {
        bail!("watched root {:?} does not exist or is not a directory", root);
    }
    let root: PathBuf = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = event_tx.send(res) {
                // Receiver gone means the monitor is shutting down.
                eprintln!("pmdwatch: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )
    .context("creating filesystem watcher")?;

    watcher
        .watch(&root, RecursiveMode::NonRecursive)
        .with_context(|| format!("watching {:?}", root))?;

    info!(root = ?root, "file monitor started (non-recursive)");

    let filter = target.filter().clone();
    let task = tokio::spawn(forward_events(event_rx, filter, tracker, shutdown, options));

    Ok(MonitorHandle {
        _inner: watcher,
        task,
    })
}

/// Drain notify results into the change tracker until shutdown.
///
/// The channel closing while nobody asked to stop means the OS watcher is
/// gone; that ends the session just like a reported watch error.
async fn forward_events(
    mut event_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    filter: PathFilter,
    tracker: ChangeTracker,
    shutdown: ShutdownHandle,
    options: MonitorOptions,
) {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            biased;
            reason = stop.wait() => {
                debug!(?reason, "file monitor stopping");
                break;
            }
            msg = event_rx.recv() => match msg {
                Some(Ok(event)) => handle_event(&event, &filter, &tracker, options),
                Some(Err(err)) => {
                    error!(error = %err, "file watch failed; ending watch session");
                    shutdown.request(ShutdownReason::MonitorFailed(err.to_string()));
                    break;
                }
                None => {
                    error!("notify event channel closed; ending watch session");
                    shutdown.request(ShutdownReason::MonitorFailed(
                        "notify event channel closed".to_string(),
                    ));
                    break;
                }
            }
        }
    }
    debug!("file monitor loop ended");
}

fn handle_event(event: &Event, filter: &PathFilter, tracker: &ChangeTracker, options: MonitorOptions) {
    trace!(?event, "received notify event");

    match classify_event(event, filter, options) {
        EventDisposition::Count => {
            let count = tracker.record_change();
            debug!(paths = ?event.paths, kind = ?event.kind, count, "relevant change");
        }
        EventDisposition::LogDeletion => {
            info!(paths = ?event.paths, "file deleted");
        }
        EventDisposition::Overflow => {
            warn!("filesystem notifications were dropped by the OS; ignoring");
        }
        EventDisposition::Ignore => {}
    }
}

/// Decide what a notification means for the change counter.
pub fn classify_event(event: &Event, filter: &PathFilter, options: MonitorOptions) -> EventDisposition {
    if event.need_rescan() {
        return EventDisposition::Overflow;
    }

    let relevant = event.paths.iter().any(|p| filter.is_relevant_path(p));

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) if relevant => EventDisposition::Count,
        EventKind::Remove(RemoveKind::Folder) => EventDisposition::LogDeletion,
        EventKind::Remove(_) if options.trigger_on_delete && relevant => EventDisposition::Count,
        EventKind::Remove(_) => EventDisposition::LogDeletion,
        _ => EventDisposition::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use notify::event::{CreateKind, DataChange, Flag, ModifyKind};

    use super::*;

    fn event(kind: EventKind, name: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from("/work/db").join(name))
    }

    fn filter() -> PathFilter {
        PathFilter::with_defaults().unwrap()
    }

    #[test]
    fn relevant_create_and_modify_are_counted() {
        let opts = MonitorOptions::default();
        assert_eq!(
            classify_event(&event(EventKind::Create(CreateKind::File), "a.sql"), &filter(), opts),
            EventDisposition::Count
        );
        assert_eq!(
            classify_event(
                &event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), "a.pkb"),
                &filter(),
                opts
            ),
            EventDisposition::Count
        );
    }

    #[test]
    fn irrelevant_names_are_ignored() {
        let opts = MonitorOptions::default();
        assert_eq!(
            classify_event(&event(EventKind::Create(CreateKind::File), "build.log"), &filter(), opts),
            EventDisposition::Ignore
        );
        assert_eq!(
            classify_event(&event(EventKind::Create(CreateKind::File), ".a.sql.swp"), &filter(), opts),
            EventDisposition::Ignore
        );
    }

    #[test]
    fn deletes_are_only_logged_unless_enabled() {
        let del = event(EventKind::Remove(RemoveKind::File), "a.sql");
        assert_eq!(
            classify_event(&del, &filter(), MonitorOptions::default()),
            EventDisposition::LogDeletion
        );
        assert_eq!(
            classify_event(&del, &filter(), MonitorOptions { trigger_on_delete: true }),
            EventDisposition::Count
        );
    }

    #[tokio::test]
    async fn closed_event_channel_fails_the_session() {
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = ChangeTracker::new();
        let shutdown = ShutdownHandle::new();

        tx.send(Ok(event(EventKind::Create(CreateKind::File), "a.sql")))
            .unwrap();
        drop(tx);
        forward_events(rx, filter(), tracker.clone(), shutdown.clone(), MonitorOptions::default())
            .await;

        assert_eq!(tracker.current(), 1);
        assert_eq!(
            shutdown.reason(),
            Some(ShutdownReason::MonitorFailed("notify event channel closed".into()))
        );
    }

    #[tokio::test]
    async fn requested_stop_wins_over_a_closing_channel() {
        let (tx, rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let shutdown = ShutdownHandle::new();
        shutdown.request(ShutdownReason::Requested);
        drop(tx);

        forward_events(rx, filter(), ChangeTracker::new(), shutdown.clone(), MonitorOptions::default())
            .await;

        assert_eq!(shutdown.reason(), Some(ShutdownReason::Requested));
    }

    #[test]
    fn rescan_flag_is_overflow() {
        let ev = Event::new(EventKind::Other).set_flag(Flag::Rescan);
        assert_eq!(
            classify_event(&ev, &filter(), MonitorOptions::default()),
            EventDisposition::Overflow
        );
    }
}
