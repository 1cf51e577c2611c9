//! Unified error types for the sniper.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::arbitrage::liquidity::LiquidityShortfall;
use crate::market::SelectionKey;
use crate::sniper::Phase;

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum BotError {
    /// Market data could not be fetched.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Bet submission failed.
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// A cycle was requested after the loop reached a terminal phase.
    #[error("loop already finished in phase {phase}")]
    LoopFinished {
        /// Terminal phase the loop is in.
        phase: Phase,
    },
}

/// Errors raised while building a market snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Snapshot carried no runners at all.
    #[error("market {market_id} has no runners")]
    NoRunners {
        /// Market identifier.
        market_id: String,
    },

    /// The same selection/line appeared twice.
    #[error("market {market_id} lists runner {selection} more than once")]
    DuplicateRunner {
        /// Market identifier.
        market_id: String,
        /// Repeated selection.
        selection: SelectionKey,
    },

    /// Negative size or matched amount in a quote.
    #[error("runner {selection} has a negative size")]
    NegativeSize {
        /// Offending selection.
        selection: SelectionKey,
    },
}

/// Market data provider errors. Fatal to the polling loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The provider could not produce a snapshot.
    #[error("failed to fetch market {market_id}: {reason}")]
    FetchFailed {
        /// Market identifier.
        market_id: String,
        /// Reason for failure.
        reason: String,
    },

    /// A recorded feed has no more snapshots.
    #[error("feed for market {market_id} exhausted after {served} snapshots")]
    Exhausted {
        /// Market identifier.
        market_id: String,
        /// How many snapshots were served.
        served: usize,
    },

    /// Snapshot data could not be decoded.
    #[error("failed to decode snapshot data: {0}")]
    Decode(String),
}

/// Per-runner data problems. Non-fatal: the cycle is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValuationError {
    /// A runner has nothing offered on the side being evaluated.
    #[error("incomplete book: runner {selection} has no price available")]
    Unpriced {
        /// Unpriced selection.
        selection: SelectionKey,
    },

    /// Price of 1.0 or below cannot be turned into a win chance.
    #[error("runner {selection} quoted at invalid price {price}")]
    InvalidPrice {
        /// Offending selection.
        selection: SelectionKey,
        /// Quoted price.
        price: Decimal,
    },
}

/// Reasons a triggered opportunity is not taken. Non-fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Every runner was excluded by the price ceiling.
    #[error("no runners left after excluding prices over {ceiling}")]
    NoEligibleRunners {
        /// Configured price ceiling.
        ceiling: Decimal,
    },

    /// Proportional stakes add up to more than allowed.
    #[error("could snipe with stake of {required}, but limited to {limit}")]
    StakeLimitExceeded {
        /// Total stake the plan needs.
        required: Decimal,
        /// Configured aggregate limit.
        limit: Decimal,
    },

    /// Worst-case outcome does not clear the profit floor.
    #[error("lowest profit of {min_profit} below minimum specified {minimum}")]
    ProfitBelowMinimum {
        /// Worst-case profit of the plan.
        min_profit: Decimal,
        /// Configured floor.
        minimum: Decimal,
    },

    /// At least one leg cannot be matched at the quoted price.
    #[error("market lacks volume on {} runner(s)", .shortfalls.len())]
    InsufficientLiquidity {
        /// Legs whose stake exceeds what is available.
        shortfalls: Vec<LiquidityShortfall>,
    },
}

impl AllocationError {
    /// Short label used for metrics and structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AllocationError::NoEligibleRunners { .. } => "no_eligible_runners",
            AllocationError::StakeLimitExceeded { .. } => "stake_limit",
            AllocationError::ProfitBelowMinimum { .. } => "min_profit",
            AllocationError::InsufficientLiquidity { .. } => "liquidity",
        }
    }
}

/// Bet submission errors. Fatal to the polling loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// Gateway did not accept the batch.
    #[error("bet submission failed: {0}")]
    SubmissionFailed(String),

    /// A bet instruction failed local validation.
    #[error("invalid bet instruction: {0}")]
    InvalidInstruction(String),

    /// A batch was already sent for this market.
    #[error("bets already submitted for market {market_id}")]
    AlreadySubmitted {
        /// Market identifier.
        market_id: String,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
