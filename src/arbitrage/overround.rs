//! Book percentage (overround) and the trigger test.

use rust_decimal::Decimal;

use super::valuation::win_chance;
use crate::error::ValuationError;
use crate::market::RunnerQuote;
use crate::trading::Side;

/// Sum of implied win chances across every runner on one side.
///
/// Fails on the first runner with nothing offered, so a half-formed book
/// never looks like an arbitrage. The price ceiling plays no part here.
pub fn calculate_overround(runners: &[RunnerQuote], side: Side) -> Result<Decimal, ValuationError> {
    runners.iter().try_fold(Decimal::ZERO, |total, runner| {
        let offer = runner
            .best_offer(side)
            .ok_or(ValuationError::Unpriced { selection: runner.key })?;
        Ok(total + win_chance(runner.key, offer.price)?)
    })
}

/// Overround at which a book becomes worth sniping.
///
/// Backing needs the book under 100 by at least the margin; laying needs it
/// over 100 by at least the margin.
pub fn trigger_threshold(side: Side, margin: Decimal) -> Decimal {
    match side {
        Side::Back => Decimal::ONE_HUNDRED - margin,
        Side::Lay => Decimal::ONE_HUNDRED + margin,
    }
}

/// Whether an overround crosses the trigger for the given side.
pub fn is_triggered(side: Side, overround: Decimal, margin: Decimal) -> bool {
    let threshold = trigger_threshold(side, margin);
    match side {
        Side::Back => overround <= threshold,
        Side::Lay => overround >= threshold,
    }
}
