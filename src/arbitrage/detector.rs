//! Opportunity detection: one pass from snapshot to decision.

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::calculator::{AllocationPlan, Allocator};
use super::liquidity::check_liquidity;
use super::overround::{calculate_overround, is_triggered, trigger_threshold};
use super::valuation::ValuedBook;
use crate::config::RiskParameters;
use crate::error::{AllocationError, ValuationError};
use crate::market::{MarketSnapshot, SelectionKey};
use crate::trading::Side;

/// What to do with a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Book not far enough from 100 to act.
    Idle,
    /// Triggered, but the plan failed a risk or liquidity check.
    Rejected {
        /// Why the plan was refused.
        reason: AllocationError,
    },
    /// Triggered and every check passed.
    Fire {
        /// Plan ready for submission.
        plan: AllocationPlan,
    },
}

impl Decision {
    /// Check if the book crossed the trigger.
    pub fn is_triggered(&self) -> bool {
        !matches!(self, Decision::Idle)
    }
}

/// Result of evaluating one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Side the book was evaluated on.
    pub side: Side,
    /// Book percentage over every runner.
    pub overround: Decimal,
    /// Overround at which the side triggers.
    pub threshold: Decimal,
    /// Runners left out by the price ceiling.
    pub excluded: Vec<SelectionKey>,
    /// Total matched across the market.
    pub total_matched: Decimal,
    /// Whether the event was in play.
    pub in_play: bool,
    /// Outcome of the evaluation.
    pub decision: Decision,
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Overround of {:.1}%, trigger at {:.2}%{}, {:.2} matched",
            self.overround,
            self.threshold,
            if self.in_play { " (in-play)" } else { "" },
            self.total_matched,
        )
    }
}

/// Run valuation, overround, trigger, allocation and liquidity on a snapshot.
///
/// An incomplete or invalid book is an error; every other outcome,
/// including a rejected plan, is a [`Decision`].
#[instrument(skip(snapshot, risk), fields(market = %snapshot.market_id(), side = %risk.side))]
pub fn evaluate_snapshot(
    snapshot: &MarketSnapshot,
    risk: &RiskParameters,
) -> Result<Evaluation, ValuationError> {
    let side = risk.side;
    let overround = calculate_overround(snapshot.runners(), side)?;
    let book = ValuedBook::from_quotes(snapshot.runners(), side, risk.exclude_over)?;
    let threshold = trigger_threshold(side, risk.trigger_margin);

    let decision = if is_triggered(side, overround, risk.trigger_margin) {
        info!(
            overround = %overround,
            threshold = %threshold,
            eligible = book.eligible.len(),
            excluded = book.excluded.len(),
            "Sniping opportunity found"
        );
        match plan_for(&book, risk) {
            Ok(plan) => Decision::Fire { plan },
            Err(reason) => Decision::Rejected { reason },
        }
    } else {
        debug!(overround = %overround, threshold = %threshold, "No opportunity");
        Decision::Idle
    };

    Ok(Evaluation {
        side,
        overround,
        threshold,
        excluded: book.excluded_keys(),
        total_matched: snapshot.total_matched(),
        in_play: snapshot.is_in_play(),
        decision,
    })
}

/// Allocate and then check liquidity on an already-triggered book.
pub fn plan_for(
    book: &ValuedBook,
    risk: &RiskParameters,
) -> Result<AllocationPlan, AllocationError> {
    let plan = Allocator::new(risk).allocate(&book.eligible)?;
    check_liquidity(&plan)?;
    Ok(plan)
}
