//! Market data provider boundary.

use async_trait::async_trait;

use super::types::MarketSnapshot;
use crate::error::FeedError;

/// Source of market snapshots.
///
/// Must return a fully resolved snapshot or an error, never a partial
/// one. Session handling and retries belong to the implementor.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the current state of a market.
    async fn fetch_snapshot(&self, market_id: &str) -> Result<MarketSnapshot, FeedError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
