// src/engine/mod.rs

//! Orchestration engine for pmdwatch.
//!
//! - [`core`]: the pure IDLE / PENDING / ANALYZING coalescer.
//! - [`runtime`]: the async shell that feeds it signals, timeouts and pass
//!   completions, and runs the passes.
//! - [`shutdown`]: the close handle shared with the monitor and Ctrl-C.

pub mod core;
pub mod runtime;
pub mod shutdown;

pub use core::{Coalescer, CoalescerAction, CoalescerInput, CoalescerState};
pub use runtime::{DEFAULT_QUIESCENCE, PassOutcome, SessionOptions, WatchSession};
pub use shutdown::{ShutdownHandle, ShutdownListener, ShutdownReason};
