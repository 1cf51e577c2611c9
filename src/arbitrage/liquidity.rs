//! Liquidity guard: every leg must be matchable at the quoted price.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculator::AllocationPlan;
use crate::error::AllocationError;
use crate::market::SelectionKey;

/// A leg whose stake is larger than what is on offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiquidityShortfall {
    /// Runner that cannot take the stake.
    pub selection: SelectionKey,
    /// Stake the plan needs on it.
    pub required: Decimal,
    /// Amount available at the quoted price.
    pub available: Decimal,
}

impl LiquidityShortfall {
    /// How much more would need to be offered.
    pub fn missing(&self) -> Decimal {
        self.required - self.available
    }
}

/// List every leg that the market cannot absorb.
pub fn find_shortfalls(plan: &AllocationPlan) -> Vec<LiquidityShortfall> {
    plan.legs
        .iter()
        .filter(|leg| leg.stake > leg.runner.available)
        .map(|leg| LiquidityShortfall {
            selection: leg.runner.key,
            required: leg.stake,
            available: leg.runner.available,
        })
        .collect()
}

/// All or nothing: a plan with any short leg is rejected whole.
pub fn check_liquidity(plan: &AllocationPlan) -> Result<(), AllocationError> {
    let shortfalls = find_shortfalls(plan);
    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(AllocationError::InsufficientLiquidity { shortfalls })
    }
}
