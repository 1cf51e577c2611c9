//! Loop state threaded through each polling cycle.

use rust_decimal::Decimal;
use strum::Display;

use crate::error::{AllocationError, ValuationError};
use crate::trading::ExecutionReport;

/// Where the loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Fetching a snapshot, or about to.
    #[default]
    Polling,
    /// Valuing the book.
    Evaluating,
    /// Book crossed the trigger; allocating or submitting.
    Triggered,
    /// Book not worth acting on this cycle.
    Idle,
    /// Shot taken. Terminal.
    Done,
    /// Market unusable or a fatal error. Terminal.
    Aborted,
}

impl Phase {
    /// Check if no further cycles may run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Aborted)
    }
}

/// Why a cycle skipped evaluation and is waiting for the next poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WaitReason {
    /// Market paused.
    #[strum(to_string = "market is suspended")]
    Suspended,
}

/// Why the loop stopped without taking a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AbortReason {
    /// Market closed.
    #[strum(to_string = "market has closed")]
    Closed,
    /// Market suspended while configured to abort on suspension.
    #[strum(to_string = "market is suspended")]
    Suspended,
    /// Event went in play while in-play betting is disabled.
    #[strum(to_string = "market in-play")]
    InPlay,
}

/// Result of one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Market not open for evaluation; poll again later.
    Waiting(WaitReason),
    /// Some runner could not be valued.
    IncompleteBook(ValuationError),
    /// Overround did not cross the trigger.
    Idle {
        /// Observed book percentage.
        overround: Decimal,
        /// Trigger level.
        threshold: Decimal,
    },
    /// Triggered, but the plan was refused.
    Rejected {
        /// Observed book percentage.
        overround: Decimal,
        /// Why the plan was refused.
        reason: AllocationError,
    },
    /// The batch went to the gateway.
    Submitted(ExecutionReport),
    /// The market can no longer be sniped.
    Aborted(AbortReason),
}

impl CycleOutcome {
    /// Check if the loop must stop after this cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleOutcome::Submitted(_) | CycleOutcome::Aborted(_))
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// A batch was submitted.
    Done(ExecutionReport),
    /// The market became unusable.
    Aborted(AbortReason),
    /// Stopped from outside between cycles.
    Cancelled,
}

/// State carried from one cycle to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Current phase.
    pub phase: Phase,
    /// Polls started so far.
    pub polls: u64,
    /// Most recent overround, if a book was complete.
    pub last_overround: Option<Decimal>,
    /// Cycles that crossed the trigger.
    pub opportunities: u64,
    /// Triggered cycles whose plan was refused.
    pub rejections: u64,
    /// Set once a batch has gone to the gateway.
    pub shot_fired: bool,
}

impl LoopState {
    /// Fresh state before the first poll.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new cycle and return its poll number.
    pub(crate) fn begin_poll(&mut self) -> u64 {
        self.polls += 1;
        self.phase = Phase::Polling;
        self.polls
    }
}

/// Final state of a run and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// How the run ended.
    pub termination: Termination,
    /// State after the last cycle.
    pub state: LoopState,
}
