//! Status lifecycle shared by missions, tasks and inspections.
//!
//! Status changes never touch timestamps implicitly. [`transition`] computes
//! the next status together with the timestamps that have to be written, and
//! callers apply the result with [`Timestamps::apply`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A status enum that drives start/end timestamps
pub trait Lifecycle: Copy + Eq + fmt::Debug {
    /// Entering this status records the start time
    fn is_started(self) -> bool;

    /// Entering this status records the end time
    fn is_terminal(self) -> bool;

    /// Terminal statuses of this kind may never be left again
    fn is_final_once_terminal() -> bool {
        false
    }

    /// Whether `from -> to` is a legal edge. Self-loops are always accepted.
    fn can_transition(from: Self, to: Self) -> bool {
        let _ = (from, to);
        true
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("status {from} is terminal and cannot change to {to}")]
    AlreadyTerminal { from: String, to: String },

    #[error("transition from {from} to {to} is not allowed")]
    NotAllowed { from: String, to: String },
}

/// Start and end timestamps of a lifecycle-driven entity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Timestamps {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl Timestamps {
    /// Write the timestamps a transition asks for. Already-set values are kept.
    pub fn apply<S>(&mut self, transition: &Transition<S>) {
        if self.start_time.is_none() {
            self.start_time = transition.set_start_time;
        }
        if self.end_time.is_none() {
            self.end_time = transition.set_end_time;
        }
    }
}

/// Outcome of [`transition`]: the new status and the timestamps to set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub status: S,
    pub set_start_time: Option<DateTime<Utc>>,
    pub set_end_time: Option<DateTime<Utc>>,
}

impl<S> Transition<S> {
    pub fn changes_timestamps(&self) -> bool {
        self.set_start_time.is_some() || self.set_end_time.is_some()
    }
}

/// Compute the move from `current` to `target`.
///
/// The start time is produced only when the target is a started status and no
/// start time exists yet; the end time likewise for terminal targets.
pub fn transition<S: Lifecycle>(
    current: S,
    target: S,
    timestamps: &Timestamps,
    now: DateTime<Utc>,
) -> Result<Transition<S>, TransitionError> {
    if current != target {
        if S::is_final_once_terminal() && current.is_terminal() {
            return Err(TransitionError::AlreadyTerminal {
                from: format!("{:?}", current),
                to: format!("{:?}", target),
            });
        }
        if !S::can_transition(current, target) {
            return Err(TransitionError::NotAllowed {
                from: format!("{:?}", current),
                to: format!("{:?}", target),
            });
        }
    }

    let set_start_time = (target.is_started() && timestamps.start_time.is_none()).then_some(now);
    let set_end_time = (target.is_terminal() && timestamps.end_time.is_none()).then_some(now);

    Ok(Transition {
        status: target,
        set_start_time,
        set_end_time,
    })
}
