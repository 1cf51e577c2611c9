//! Runner valuation: price to win chance, with ceiling exclusion.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValuationError;
use crate::market::{RunnerQuote, SelectionKey};
use crate::trading::Side;

/// A runner annotated with its implied win chance. Lives for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuedRunner {
    /// Runner identity.
    pub key: SelectionKey,
    /// Display name, when known.
    pub name: Option<String>,
    /// Best price on the evaluated side.
    pub price: Decimal,
    /// Implied probability in percent (`100 / price`).
    pub win_chance: Decimal,
    /// Amount available at that price.
    pub available: Decimal,
}

impl ValuedRunner {
    /// Label for logs.
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.key.to_string())
    }

    /// Whether anything at all can be matched at the quoted price.
    pub fn has_liquidity(&self) -> bool {
        self.available > Decimal::ZERO
    }
}

/// Where a runner ends up after valuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Valuation {
    /// Counted in the overround and staked.
    Eligible(ValuedRunner),
    /// Priced above the ceiling: counted in the overround only.
    Excluded(ValuedRunner),
}

/// Implied win chance in percent for decimal odds.
pub fn win_chance(selection: SelectionKey, price: Decimal) -> Result<Decimal, ValuationError> {
    if price <= Decimal::ONE {
        return Err(ValuationError::InvalidPrice { selection, price });
    }
    Ok(Decimal::ONE_HUNDRED / price)
}

/// Value one runner on the given side.
pub fn value_runner(
    quote: &RunnerQuote,
    side: Side,
    ceiling: Decimal,
) -> Result<Valuation, ValuationError> {
    let offer = quote
        .best_offer(side)
        .ok_or(ValuationError::Unpriced { selection: quote.key })?;

    let valued = ValuedRunner {
        key: quote.key,
        name: quote.name.clone(),
        price: offer.price,
        win_chance: win_chance(quote.key, offer.price)?,
        available: offer.size,
    };

    if offer.price > ceiling {
        Ok(Valuation::Excluded(valued))
    } else {
        Ok(Valuation::Eligible(valued))
    }
}

/// Every runner in a snapshot, valued and split by the ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuedBook {
    /// Side the book was valued on.
    pub side: Side,
    /// Runners at or under the ceiling, in snapshot order.
    pub eligible: Vec<ValuedRunner>,
    /// Runners over the ceiling, in snapshot order.
    pub excluded: Vec<ValuedRunner>,
}

impl ValuedBook {
    /// Value a whole runner list. Any unpriced or invalid runner fails the book.
    pub fn from_quotes(
        quotes: &[RunnerQuote],
        side: Side,
        ceiling: Decimal,
    ) -> Result<Self, ValuationError> {
        let mut book = ValuedBook {
            side,
            eligible: Vec::with_capacity(quotes.len()),
            excluded: Vec::new(),
        };

        for quote in quotes {
            match value_runner(quote, side, ceiling)? {
                Valuation::Eligible(runner) => book.eligible.push(runner),
                Valuation::Excluded(runner) => book.excluded.push(runner),
            }
        }

        Ok(book)
    }

    /// Sum of win chances across every runner, excluded ones included.
    pub fn overround(&self) -> Decimal {
        self.eligible
            .iter()
            .chain(self.excluded.iter())
            .map(|r| r.win_chance)
            .sum()
    }

    /// Selections left out by the ceiling.
    pub fn excluded_keys(&self) -> Vec<SelectionKey> {
        self.excluded.iter().map(|r| r.key).collect()
    }
}
