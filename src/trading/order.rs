//! Bet instructions and placement results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::market::SelectionKey;

/// Betting side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Back: the runner will win.
    #[default]
    #[strum(to_string = "back", serialize = "BACK", serialize = "B", serialize = "b")]
    #[serde(alias = "BACK", alias = "B", alias = "b")]
    Back,
    /// Lay: the runner will not win.
    #[strum(to_string = "lay", serialize = "LAY", serialize = "L", serialize = "l")]
    #[serde(alias = "LAY", alias = "L", alias = "l")]
    Lay,
}

/// One leg of a dutching batch, ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetInstruction {
    /// Market the bet is placed on.
    pub market_id: String,
    /// Runner being backed or laid.
    pub selection: SelectionKey,
    /// Back or lay.
    pub side: Side,
    /// Requested price.
    pub price: Decimal,
    /// Stake.
    pub stake: Decimal,
}

impl BetInstruction {
    /// Validate instruction parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.market_id.is_empty() {
            return Err("market_id is required".to_string());
        }
        if self.price <= Decimal::ONE {
            return Err(format!("price {} must be above 1.0", self.price));
        }
        if self.stake <= Decimal::ZERO {
            return Err(format!("stake {} must be positive", self.stake));
        }
        Ok(())
    }

    /// Amount lost if the bet loses: the stake for a back, the liability for a lay.
    pub fn exposure(&self) -> Decimal {
        match self.side {
            Side::Back => self.stake,
            Side::Lay => self.stake * (self.price - Decimal::ONE),
        }
    }
}

/// Placement result code reported per bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceResultCode {
    /// Bet accepted.
    Ok,
    /// Not sent to an exchange (dry run).
    Simulated,
    /// Stake rejected by the exchange.
    InvalidSize,
    /// Price rejected by the exchange.
    InvalidPrice,
    /// Market suspended before the bet arrived.
    EventSuspended,
    /// Market closed before the bet arrived.
    EventClosed,
    /// Not enough funds to cover the bet.
    InsufficientFunds,
    /// Exchange refused the bet.
    CannotAcceptBet,
    /// Anything else.
    UnknownError,
}

/// What happened to one submitted bet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOutcome {
    /// Runner the bet was placed on.
    pub selection: SelectionKey,
    /// Whether the exchange accepted the bet.
    pub success: bool,
    /// Exchange bet identifier, if one was assigned.
    pub bet_id: Option<u64>,
    /// Amount matched on placement.
    pub size_matched: Decimal,
    /// Average price of the matched part.
    pub average_price_matched: Decimal,
    /// Placement result code.
    pub result_code: PlaceResultCode,
}

impl OrderOutcome {
    /// Outcome for a bet that was never sent to an exchange.
    pub fn simulated(instruction: &BetInstruction) -> Self {
        Self {
            selection: instruction.selection,
            success: true,
            bet_id: None,
            size_matched: Decimal::ZERO,
            average_price_matched: Decimal::ZERO,
            result_code: PlaceResultCode::Simulated,
        }
    }
}

/// Everything the gateway reported for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Gateway that handled the batch.
    pub gateway: String,
    /// Whether the gateway places real bets.
    pub live: bool,
    /// Instructions as submitted.
    pub instructions: Vec<BetInstruction>,
    /// Per-bet results, in submission order.
    pub outcomes: Vec<OrderOutcome>,
    /// When the batch was submitted.
    pub submitted_at: OffsetDateTime,
}

impl ExecutionReport {
    /// Check if every bet was accepted.
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.len() == self.instructions.len() && self.outcomes.iter().all(|o| o.success)
    }

    /// Outcomes for bets the exchange did not accept.
    pub fn failures(&self) -> impl Iterator<Item = &OrderOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Total amount matched across the batch.
    pub fn total_matched(&self) -> Decimal {
        self.outcomes.iter().map(|o| o.size_matched).sum()
    }

    /// Total stake requested across the batch.
    pub fn total_stake(&self) -> Decimal {
        self.instructions.iter().map(|i| i.stake).sum()
    }
}
