//! Execution gateway boundary and the dry-run implementation.

use std::time::Instant;

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::order::{BetInstruction, ExecutionReport, OrderOutcome};
use crate::error::ExecutionError;
use crate::metrics;

/// Anything that can place a batch of bets on an exchange.
///
/// Called at most once per market. Implementors own transport, session
/// and retry policy; the sniper treats the call as opaque.
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Place every bet in the batch and report per-bet outcomes.
    async fn submit(&self, bets: &[BetInstruction]) -> Result<Vec<OrderOutcome>, ExecutionError>;

    /// Whether this gateway risks real money.
    fn is_live(&self) -> bool;

    /// Gateway name for logging.
    fn name(&self) -> &str;
}

/// Validate a batch and hand it to the gateway, timing the call.
#[instrument(skip(gateway, bets), fields(gateway = gateway.name(), legs = bets.len()))]
pub async fn submit_batch<G>(
    gateway: &G,
    bets: Vec<BetInstruction>,
) -> Result<ExecutionReport, ExecutionError>
where
    G: ExecutionGateway + ?Sized,
{
    for bet in &bets {
        bet.validate().map_err(ExecutionError::InvalidInstruction)?;
    }

    let submitted_at = OffsetDateTime::now_utc();
    let start = Instant::now();
    let result = gateway.submit(&bets).await;
    metrics::record_order_submit_latency(start);

    let outcomes = result.inspect_err(|_| metrics::inc_orders_failed())?;
    metrics::inc_plans_submitted();
    for outcome in outcomes.iter().filter(|o| !o.success) {
        metrics::inc_orders_failed();
        tracing::debug!(
            selection = %outcome.selection,
            code = %outcome.result_code,
            "Bet not accepted"
        );
    }

    Ok(ExecutionReport {
        gateway: gateway.name().to_string(),
        live: gateway.is_live(),
        instructions: bets,
        outcomes,
        submitted_at,
    })
}

/// Dry-run gateway: logs the batch and places nothing.
#[derive(Debug, Clone, Default)]
pub struct PaperGateway;

impl PaperGateway {
    /// Create a new paper gateway.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExecutionGateway for PaperGateway {
    async fn submit(&self, bets: &[BetInstruction]) -> Result<Vec<OrderOutcome>, ExecutionError> {
        info!("Training exercise, firing blanks");
        for bet in bets {
            info!(
                selection = %bet.selection,
                side = %bet.side,
                price = %bet.price,
                stake = %bet.stake.round_dp(2),
                "Would place bet"
            );
        }
        Ok(bets.iter().map(OrderOutcome::simulated).collect())
    }

    fn is_live(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "paper"
    }
}
