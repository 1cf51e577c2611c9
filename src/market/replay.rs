//! Provider that replays recorded snapshots from a JSON file.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};

use super::feed::MarketDataProvider;
use super::types::MarketSnapshot;
use crate::error::FeedError;

/// Serves snapshots in file order, one per fetch.
///
/// The file holds a JSON array of snapshots. Once the recording runs out
/// the feed either keeps serving the last snapshot or reports
/// [`FeedError::Exhausted`].
#[derive(Debug)]
pub struct ReplayFeed {
    snapshots: Vec<MarketSnapshot>,
    cursor: AtomicUsize,
    hold_last: bool,
}

impl ReplayFeed {
    /// Create a feed over in-memory snapshots.
    pub fn new(snapshots: Vec<MarketSnapshot>) -> Self {
        Self {
            snapshots,
            cursor: AtomicUsize::new(0),
            hold_last: false,
        }
    }

    /// Keep returning the final snapshot instead of failing at the end.
    pub fn hold_last(mut self, hold: bool) -> Self {
        self.hold_last = hold;
        self
    }

    /// Decode a recording from JSON text.
    pub fn from_json(json: &str) -> Result<Self, FeedError> {
        let snapshots: Vec<MarketSnapshot> =
            serde_json::from_str(json).map_err(|e| FeedError::Decode(e.to_string()))?;
        Ok(Self::new(snapshots))
    }

    /// Load a recording from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FeedError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FeedError::Decode(format!("{}: {}", path.display(), e)))?;
        let feed = Self::from_json(&json)?;
        info!(path = %path.display(), snapshots = feed.len(), "Loaded replay recording");
        Ok(feed)
    }

    /// Number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if the recording is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshots served so far.
    pub fn served(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for ReplayFeed {
    async fn fetch_snapshot(&self, market_id: &str) -> Result<MarketSnapshot, FeedError> {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);

        let snapshot = match self.snapshots.get(index) {
            Some(snapshot) => snapshot,
            None if self.hold_last && !self.snapshots.is_empty() => {
                self.cursor.store(self.snapshots.len(), Ordering::SeqCst);
                &self.snapshots[self.snapshots.len() - 1]
            }
            None => {
                self.cursor.store(self.snapshots.len(), Ordering::SeqCst);
                return Err(FeedError::Exhausted {
                    market_id: market_id.to_string(),
                    served: self.snapshots.len(),
                });
            }
        };

        if snapshot.market_id() != market_id {
            return Err(FeedError::FetchFailed {
                market_id: market_id.to_string(),
                reason: format!("recording holds market {}", snapshot.market_id()),
            });
        }

        debug!(index, status = %snapshot.status(), "Replaying snapshot");
        Ok(snapshot.clone())
    }

    fn name(&self) -> &str {
        "replay"
    }
}
