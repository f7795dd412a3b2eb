// src/engine/core.rs

//! Pure change-coalescing state machine.
//!
//! The coalescer consumes [`CoalescerInput`]s and answers with the next
//! [`CoalescerAction`] the async shell (`engine::runtime::WatchSession`)
//! must perform. It has **no** channels, timers or IO, so the debounce and
//! re-trigger rules can be exercised step by step in tests.
//!
//! ```text
//!   IDLE --signal--> PENDING --signal--> PENDING (window restarts)
//!                       |
//!                   quiescence
//!                       v
//!                   ANALYZING --done, counter == snapshot--> IDLE
//!                       |
//!                       +-----done, counter moved---------> PENDING
//! ```

use tracing::{debug, trace};

/// Where the coalescer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescerState {
    /// Nothing pending; blocked on the change signal.
    Idle,
    /// A change was seen; waiting out the quiescence window.
    Pending { snapshot: u64 },
    /// A pass is running for the counter value `snapshot`.
    Analyzing { snapshot: u64 },
}

/// Observations fed in by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescerInput {
    /// The change signal was set and has just been cleared; `counter` is the
    /// change counter as of the clear.
    SignalCleared { counter: u64 },
    /// A full quiescence window passed without the signal being set.
    QuiescenceElapsed,
    /// The in-flight pass finished; `counter` is the change counter now.
    PassCompleted { counter: u64 },
}

/// What the shell has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalescerAction {
    /// Block until the change signal is set.
    WaitForChange,
    /// Wait up to one quiescence window for the change signal.
    AwaitQuiescence,
    /// Run exactly one analysis pass.
    Analyze { snapshot: u64 },
}

#[derive(Debug)]
pub struct Coalescer {
    state: CoalescerState,
    passes_started: u64,
}

impl Default for Coalescer {
    fn default() -> Self {
        Self::new()
    }
}

impl Coalescer {
    pub fn new() -> Self {
        Self {
            state: CoalescerState::Idle,
            passes_started: 0,
        }
    }

    pub fn state(&self) -> CoalescerState {
        self.state
    }

    /// Number of passes this coalescer has asked for.
    pub fn passes_started(&self) -> u64 {
        self.passes_started
    }

    pub fn next_action(&self) -> CoalescerAction {
        match self.state {
            CoalescerState::Idle => CoalescerAction::WaitForChange,
            CoalescerState::Pending { .. } => CoalescerAction::AwaitQuiescence,
            CoalescerState::Analyzing { snapshot } => CoalescerAction::Analyze { snapshot },
        }
    }

    /// Apply one input and return the action for the resulting state.
    pub fn step(&mut self, input: CoalescerInput) -> CoalescerAction {
        let next = match (self.state, input) {
            (CoalescerState::Idle, CoalescerInput::SignalCleared { counter })
            | (CoalescerState::Pending { .. }, CoalescerInput::SignalCleared { counter }) => {
                CoalescerState::Pending { snapshot: counter }
            }
            (CoalescerState::Pending { snapshot }, CoalescerInput::QuiescenceElapsed) => {
                self.passes_started += 1;
                CoalescerState::Analyzing { snapshot }
            }
            (CoalescerState::Analyzing { snapshot }, CoalescerInput::PassCompleted { counter }) => {
                if counter == snapshot {
                    CoalescerState::Idle
                } else {
                    debug!(snapshot, counter, "changes arrived during pass; re-arming");
                    CoalescerState::Pending { snapshot: counter }
                }
            }
            (state, input) => {
                // Out-of-order input (e.g. a signal while analysing). The
                // counter comparison at pass completion still catches it.
                trace!(?state, ?input, "input ignored in current state");
                state
            }
        };

        if next != self.state {
            trace!(from = ?self.state, to = ?next, "coalescer transition");
        }
        self.state = next;
        self.next_action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_of_signals_yields_a_single_pass() {
        let mut core = Coalescer::new();
        assert_eq!(core.next_action(), CoalescerAction::WaitForChange);

        assert_eq!(
            core.step(CoalescerInput::SignalCleared { counter: 1 }),
            CoalescerAction::AwaitQuiescence
        );
        core.step(CoalescerInput::SignalCleared { counter: 2 });
        core.step(CoalescerInput::SignalCleared { counter: 3 });
        assert_eq!(
            core.step(CoalescerInput::QuiescenceElapsed),
            CoalescerAction::Analyze { snapshot: 3 }
        );
        assert_eq!(
            core.step(CoalescerInput::PassCompleted { counter: 3 }),
            CoalescerAction::WaitForChange
        );
        assert_eq!(core.passes_started(), 1);
    }

    #[test]
    fn change_during_pass_goes_straight_back_to_pending() {
        let mut core = Coalescer::new();
        core.step(CoalescerInput::SignalCleared { counter: 1 });
        core.step(CoalescerInput::QuiescenceElapsed);

        assert_eq!(
            core.step(CoalescerInput::PassCompleted { counter: 2 }),
            CoalescerAction::AwaitQuiescence
        );
        assert_eq!(core.state(), CoalescerState::Pending { snapshot: 2 });

        assert_eq!(
            core.step(CoalescerInput::QuiescenceElapsed),
            CoalescerAction::Analyze { snapshot: 2 }
        );
        core.step(CoalescerInput::PassCompleted { counter: 2 });
        assert_eq!(core.state(), CoalescerState::Idle);
        assert_eq!(core.passes_started(), 2);
    }

    #[test]
    fn quiescence_while_idle_does_nothing() {
        let mut core = Coalescer::new();
        assert_eq!(
            core.step(CoalescerInput::QuiescenceElapsed),
            CoalescerAction::WaitForChange
        );
        assert_eq!(core.passes_started(), 0);
    }

    #[test]
    fn signal_while_analyzing_keeps_the_running_snapshot() {
        let mut core = Coalescer::new();
        core.step(CoalescerInput::SignalCleared { counter: 4 });
        core.step(CoalescerInput::QuiescenceElapsed);
        assert_eq!(
            core.step(CoalescerInput::SignalCleared { counter: 5 }),
            CoalescerAction::Analyze { snapshot: 4 }
        );
    }
}
