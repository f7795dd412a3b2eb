// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling `exclude` / `include` file-name globs into a [`PathFilter`].
//! - The change counter and edge-triggered signal ([`ChangeTracker`]).
//! - Wiring up a non-recursive filesystem watcher (`notify`) that turns
//!   relevant notifications into counter increments.
//!
//! It does **not** decide when to analyse; that is the coalescer's job.

pub mod patterns;
pub mod signal;
pub mod watcher;

pub use patterns::{
    DEFAULT_EXCLUDES, DEFAULT_INCLUDES, PathFilter, WatchTarget, effective_patterns,
};
pub use signal::{ChangeSignal, ChangeTracker};
pub use watcher::{MonitorHandle, MonitorOptions, classify_event, spawn_monitor};
