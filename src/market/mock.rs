//! Mock exchange for unit testing.
//!
//! This module provides a scripted market data provider and a recording
//! execution gateway that can be used in tests without a real exchange.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::feed::MarketDataProvider;
use super::types::{MarketSnapshot, MarketStatus, PriceLevel, RunnerQuote, SelectionKey};
use crate::error::{ExecutionError, FeedError, MarketError};
use crate::trading::{BetInstruction, ExecutionGateway, OrderOutcome, PlaceResultCode};

/// One scripted response to a snapshot fetch.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Return this snapshot.
    Snapshot(MarketSnapshot),
    /// Fail the fetch with this reason.
    FetchFailure(String),
}

/// Configuration for mock exchange behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether bet submission fails outright.
    pub fail_submit: bool,
    /// Result code for every bet; accepted and fully matched when unset.
    pub reject_with: Option<PlaceResultCode>,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock exchange for testing.
#[derive(Debug, Clone)]
pub struct MockExchange {
    /// Mock configuration.
    config: MockConfig,
    /// Scripted fetch responses, consumed front to back.
    script: Arc<Mutex<VecDeque<MockStep>>>,
    /// Number of fetches served.
    fetches: Arc<Mutex<usize>>,
    /// Every batch passed to `submit`.
    submissions: Arc<Mutex<Vec<Vec<BetInstruction>>>>,
}

impl MockExchange {
    /// Create a new mock exchange with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock exchange with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            script: Arc::new(Mutex::new(VecDeque::new())),
            fetches: Arc::new(Mutex::new(0)),
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a snapshot for the next fetch.
    pub fn push_snapshot(&self, snapshot: MarketSnapshot) {
        self.push_step(MockStep::Snapshot(snapshot));
    }

    /// Queue a fetch failure.
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.push_step(MockStep::FetchFailure(reason.into()));
    }

    /// Queue any scripted step.
    pub fn push_step(&self, step: MockStep) {
        self.script.lock().unwrap().push_back(step);
    }

    /// Number of snapshot fetches made so far.
    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }

    /// Batches submitted so far.
    pub fn submissions(&self) -> Vec<Vec<BetInstruction>> {
        self.submissions.lock().unwrap().clone()
    }

    /// Scripted steps not yet consumed.
    pub fn remaining_steps(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for MockExchange {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for MockExchange {
    async fn fetch_snapshot(&self, market_id: &str) -> Result<MarketSnapshot, FeedError> {
        self.simulate_latency().await;

        let served = {
            let mut fetches = self.fetches.lock().unwrap();
            *fetches += 1;
            *fetches - 1
        };

        match self.script.lock().unwrap().pop_front() {
            Some(MockStep::Snapshot(snapshot)) => Ok(snapshot),
            Some(MockStep::FetchFailure(reason)) => Err(FeedError::FetchFailed {
                market_id: market_id.to_string(),
                reason,
            }),
            None => Err(FeedError::Exhausted {
                market_id: market_id.to_string(),
                served,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[async_trait]
impl ExecutionGateway for MockExchange {
    async fn submit(&self, bets: &[BetInstruction]) -> Result<Vec<OrderOutcome>, ExecutionError> {
        self.simulate_latency().await;
        self.submissions.lock().unwrap().push(bets.to_vec());

        if self.config.fail_submit {
            return Err(ExecutionError::SubmissionFailed(
                "Mock submission failure".to_string(),
            ));
        }

        let outcomes = bets
            .iter()
            .enumerate()
            .map(|(i, bet)| match self.config.reject_with {
                Some(code) => OrderOutcome {
                    selection: bet.selection,
                    success: false,
                    bet_id: None,
                    size_matched: Decimal::ZERO,
                    average_price_matched: Decimal::ZERO,
                    result_code: code,
                },
                None => OrderOutcome {
                    selection: bet.selection,
                    success: true,
                    bet_id: Some(1000 + i as u64),
                    size_matched: bet.stake,
                    average_price_matched: bet.price,
                    result_code: PlaceResultCode::Ok,
                },
            })
            .collect();

        Ok(outcomes)
    }

    fn is_live(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Builder for creating mock snapshots with common patterns.
pub struct MockSnapshotBuilder {
    market_id: String,
    status: MarketStatus,
    delay: u32,
    runners: Vec<RunnerQuote>,
}

impl MockSnapshotBuilder {
    /// Create a new builder for the given market.
    pub fn new(market_id: impl Into<String>) -> Self {
        Self {
            market_id: market_id.into(),
            status: MarketStatus::Active,
            delay: 0,
            runners: Vec::new(),
        }
    }

    /// Set the market status.
    pub fn status(mut self, status: MarketStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the in-play bet delay.
    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    /// Add a runner with a back price.
    pub fn back(mut self, selection_id: u64, price: Decimal, available: Decimal) -> Self {
        self.runners.push(RunnerQuote::back(
            SelectionKey::new(selection_id),
            price,
            available,
        ));
        self
    }

    /// Add a runner with both back and lay prices.
    pub fn runner(
        mut self,
        selection_id: u64,
        back: (Decimal, Decimal),
        lay: (Decimal, Decimal),
    ) -> Self {
        self.runners.push(RunnerQuote {
            key: SelectionKey::new(selection_id),
            name: None,
            best_to_back: Some(PriceLevel::new(back.0, back.1)),
            best_to_lay: Some(PriceLevel::new(lay.0, lay.1)),
            total_matched: Decimal::ZERO,
        });
        self
    }

    /// Add a runner with nothing offered on either side.
    pub fn unpriced(mut self, selection_id: u64) -> Self {
        self.runners.push(RunnerQuote {
            key: SelectionKey::new(selection_id),
            name: None,
            best_to_back: None,
            best_to_lay: None,
            total_matched: Decimal::ZERO,
        });
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Result<MarketSnapshot, MarketError> {
        MarketSnapshot::new(self.market_id, self.status, self.delay, self.runners)
    }
}
