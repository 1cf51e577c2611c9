//! Stake allocation and profit calculations for dutching plans.

use rust_decimal::Decimal;
use serde::Serialize;
use smallvec::SmallVec;
use time::OffsetDateTime;

use super::valuation::ValuedRunner;
use crate::config::RiskParameters;
use crate::error::AllocationError;
use crate::trading::{BetInstruction, Side};

/// One leg of an allocation plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakeLeg {
    /// Runner the stake goes on.
    pub runner: ValuedRunner,
    /// Stake for this leg.
    pub stake: Decimal,
    /// Net result of the whole plan if this runner wins.
    pub profit: Decimal,
    /// Amount lost on this leg if it goes against us.
    pub liability: Decimal,
}

/// Proportional stakes across every eligible runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationPlan {
    /// Side every leg is placed on.
    pub side: Side,
    /// Legs in the order the runners were valued.
    pub legs: SmallVec<[StakeLeg; 8]>,
    /// Smallest win chance among the legs.
    pub outsider: Decimal,
    /// `outsider / minimum_stake`; every stake is `win_chance / divisor`.
    pub divisor: Decimal,
    /// Sum of stakes.
    pub total_stake: Decimal,
    /// Worst-case result across winners.
    pub min_profit: Decimal,
    /// Mean result across winners. Informational only.
    pub average_profit: Decimal,
    /// When the plan was computed.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AllocationPlan {
    /// Bet instructions for the gateway, one per leg.
    pub fn instructions(&self, market_id: &str) -> Vec<BetInstruction> {
        self.legs
            .iter()
            .map(|leg| BetInstruction {
                market_id: market_id.to_string(),
                selection: leg.runner.key,
                side: self.side,
                price: leg.runner.price,
                stake: leg.stake,
            })
            .collect()
    }

    /// Total amount at risk across legs.
    pub fn total_liability(&self) -> Decimal {
        self.legs.iter().map(|l| l.liability).sum()
    }

    /// Return on the staked amount in percent, at the worst case.
    pub fn worst_case_roi(&self) -> Decimal {
        if self.total_stake.is_zero() {
            Decimal::ZERO
        } else {
            (self.min_profit / self.total_stake) * Decimal::ONE_HUNDRED
        }
    }
}

/// Net result of a dutching plan if the runner holding `stake` at `price` wins.
pub fn profit_if_wins(side: Side, stake: Decimal, price: Decimal, total_stake: Decimal) -> Decimal {
    let winnings = stake * (price - Decimal::ONE);
    let others = total_stake - stake;
    match side {
        Side::Back => winnings - others,
        Side::Lay => others - winnings,
    }
}

/// Liability of a single leg: the stake when backing, the payout owed when laying.
pub fn leg_liability(side: Side, stake: Decimal, price: Decimal) -> Decimal {
    match side {
        Side::Back => stake,
        Side::Lay => stake * (price - Decimal::ONE),
    }
}

/// Stake allocator for one side of the book.
///
/// Back and lay plans come out of the same code; only the profit sign
/// and liability differ.
#[derive(Debug, Clone, Copy)]
pub struct Allocator {
    side: Side,
    minimum_stake: Decimal,
    max_total_stake: Decimal,
    minimum_profit: Decimal,
    ceiling: Decimal,
}

impl Allocator {
    /// Create an allocator from the operator's risk settings.
    pub fn new(risk: &RiskParameters) -> Self {
        Self {
            side: risk.side,
            minimum_stake: risk.minimum_stake,
            max_total_stake: risk.max_total_stake,
            minimum_profit: risk.minimum_profit,
            ceiling: risk.exclude_over,
        }
    }

    /// Allocate stakes across the eligible runners.
    ///
    /// The outsider receives exactly the minimum stake and everyone else
    /// scales with their win chance. Rejects the plan when the total goes
    /// over the limit or the worst outcome misses the profit floor.
    pub fn allocate(&self, eligible: &[ValuedRunner]) -> Result<AllocationPlan, AllocationError> {
        let outsider = eligible
            .iter()
            .map(|r| r.win_chance)
            .min()
            .ok_or(AllocationError::NoEligibleRunners {
                ceiling: self.ceiling,
            })?;

        let divisor = outsider / self.minimum_stake;
        let stakes: SmallVec<[Decimal; 8]> = eligible
            .iter()
            .map(|r| self.minimum_stake * (r.win_chance / outsider))
            .collect();
        let total_stake: Decimal = stakes.iter().copied().sum();

        if total_stake > self.max_total_stake {
            return Err(AllocationError::StakeLimitExceeded {
                required: total_stake,
                limit: self.max_total_stake,
            });
        }

        let legs: SmallVec<[StakeLeg; 8]> = eligible
            .iter()
            .zip(stakes.iter())
            .map(|(runner, &stake)| StakeLeg {
                runner: runner.clone(),
                stake,
                profit: profit_if_wins(self.side, stake, runner.price, total_stake),
                liability: leg_liability(self.side, stake, runner.price),
            })
            .collect();

        let min_profit = legs
            .iter()
            .map(|l| l.profit)
            .min()
            .unwrap_or(Decimal::ZERO);

        if min_profit < self.minimum_profit {
            return Err(AllocationError::ProfitBelowMinimum {
                min_profit,
                minimum: self.minimum_profit,
            });
        }

        let average_profit =
            legs.iter().map(|l| l.profit).sum::<Decimal>() / Decimal::from(legs.len());

        Ok(AllocationPlan {
            side: self.side,
            legs,
            outsider,
            divisor,
            total_stake,
            min_profit,
            average_profit,
            created_at: OffsetDateTime::now_utc(),
        })
    }
}
