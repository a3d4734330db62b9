//! Lifecycle state machine.
//!
//! `Unstarted → Starting → Serving → Terminating → Stopped`; transitions
//! only move forward.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Unstarted,
    Starting,
    Serving,
    Terminating,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Unstarted => "unstarted",
            LifecycleState::Starting => "starting",
            LifecycleState::Serving => "serving",
            LifecycleState::Terminating => "terminating",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal lifecycle transition {from} -> {to}")]
pub struct StateError {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

/// Shared, observable lifecycle state.
#[derive(Debug, Clone)]
pub struct StateCell {
    tx: Arc<watch::Sender<LifecycleState>>,
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Unstarted);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    /// Move to `to`, which must be later than the current state.
    pub fn advance(&self, to: LifecycleState) -> Result<(), StateError> {
        let mut result = Ok(());
        self.tx.send_if_modified(|current| {
            if to > *current {
                tracing::debug!(from = %current, to = %to, "Lifecycle transition");
                *current = to;
                true
            } else {
                result = Err(StateError { from: *current, to });
                false
            }
        });
        result
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
