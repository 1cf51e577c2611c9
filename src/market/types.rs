//! Market snapshot types.

use std::collections::HashSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::error::MarketError;
use crate::trading::Side;

/// Market lifecycle status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum MarketStatus {
    /// Open for betting.
    #[default]
    Active,
    /// Temporarily paused (e.g. a runner was removed).
    Suspended,
    /// Finished; nothing more can be placed.
    Closed,
    /// Not yet opened.
    Inactive,
}

/// Identifies one outcome. The line id separates the same selection
/// across linked handicap markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionKey {
    /// Selection identifier, stable across markets.
    pub selection_id: u64,
    /// Handicap line identifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<u64>,
}

impl SelectionKey {
    /// Key for a selection without a handicap line.
    pub fn new(selection_id: u64) -> Self {
        Self {
            selection_id,
            line_id: None,
        }
    }

    /// Key for a selection on a specific handicap line.
    pub fn with_line(selection_id: u64, line_id: u64) -> Self {
        Self {
            selection_id,
            line_id: Some(line_id),
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_id {
            Some(line) => write!(f, "{}/{}", self.selection_id, line),
            None => write!(f, "{}", self.selection_id),
        }
    }
}

/// Best price on one side of a runner and the amount offered there.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLevel {
    /// Decimal odds.
    pub price: Decimal,
    /// Amount available to match at this price.
    pub size: Decimal,
}

impl PriceLevel {
    /// Create a new price level.
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}

/// Quote for one runner in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerQuote {
    /// Runner identity.
    #[serde(flatten)]
    pub key: SelectionKey,
    /// Display name, when the provider knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Best price available to back.
    #[serde(default)]
    pub best_to_back: Option<PriceLevel>,
    /// Best price available to lay.
    #[serde(default)]
    pub best_to_lay: Option<PriceLevel>,
    /// Total matched on this runner at any price.
    #[serde(default)]
    pub total_matched: Decimal,
}

impl RunnerQuote {
    /// Quote with only a back price.
    pub fn back(key: SelectionKey, price: Decimal, size: Decimal) -> Self {
        Self {
            key,
            name: None,
            best_to_back: Some(PriceLevel::new(price, size)),
            best_to_lay: None,
            total_matched: Decimal::ZERO,
        }
    }

    /// Best offer on the given side.
    pub fn best_offer(&self, side: Side) -> Option<PriceLevel> {
        match side {
            Side::Back => self.best_to_back,
            Side::Lay => self.best_to_lay,
        }
    }

    // Prices are left to valuation, which skips the cycle on a bad one.
    fn has_negative_size(&self) -> bool {
        [self.best_to_back, self.best_to_lay]
            .iter()
            .flatten()
            .any(|l| l.size.is_sign_negative())
            || self.total_matched.is_sign_negative()
    }
}

/// Point-in-time view of a market, produced once per poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct MarketSnapshot {
    market_id: String,
    status: MarketStatus,
    delay: u32,
    runners: Vec<RunnerQuote>,
    #[serde(with = "time::serde::rfc3339")]
    taken_at: OffsetDateTime,
}

/// Wire shape of a snapshot before validation.
#[derive(Debug, Clone, Deserialize)]
struct SnapshotRecord {
    market_id: String,
    #[serde(default)]
    status: MarketStatus,
    #[serde(default)]
    delay: u32,
    runners: Vec<RunnerQuote>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    taken_at: Option<OffsetDateTime>,
}

impl TryFrom<SnapshotRecord> for MarketSnapshot {
    type Error = MarketError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let mut snapshot =
            MarketSnapshot::new(record.market_id, record.status, record.delay, record.runners)?;
        if let Some(taken_at) = record.taken_at {
            snapshot.taken_at = taken_at;
        }
        Ok(snapshot)
    }
}

impl MarketSnapshot {
    /// Build a snapshot, rejecting empty or inconsistent runner lists.
    pub fn new(
        market_id: impl Into<String>,
        status: MarketStatus,
        delay: u32,
        runners: Vec<RunnerQuote>,
    ) -> Result<Self, MarketError> {
        let market_id = market_id.into();

        if runners.is_empty() {
            return Err(MarketError::NoRunners { market_id });
        }

        let mut seen = HashSet::with_capacity(runners.len());
        for runner in &runners {
            if !seen.insert(runner.key) {
                return Err(MarketError::DuplicateRunner {
                    market_id,
                    selection: runner.key,
                });
            }
            if runner.has_negative_size() {
                return Err(MarketError::NegativeSize {
                    selection: runner.key,
                });
            }
        }

        Ok(Self {
            market_id,
            status,
            delay,
            runners,
            taken_at: OffsetDateTime::now_utc(),
        })
    }

    /// Market identifier.
    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    /// Lifecycle status.
    pub fn status(&self) -> MarketStatus {
        self.status
    }

    /// Bet delay in seconds; non-zero only while in play.
    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// Runners in provider order.
    pub fn runners(&self) -> &[RunnerQuote] {
        &self.runners
    }

    /// Check if the event is in play.
    pub fn is_in_play(&self) -> bool {
        self.delay > 0
    }

    /// Total matched across every runner.
    pub fn total_matched(&self) -> Decimal {
        self.runners.iter().map(|r| r.total_matched).sum()
    }

    /// Look up a runner by key.
    pub fn runner(&self, key: &SelectionKey) -> Option<&RunnerQuote> {
        self.runners.iter().find(|r| r.key == *key)
    }
}
