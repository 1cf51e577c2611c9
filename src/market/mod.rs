//! Market module for single-market snapshots.
//!
//! This module handles:
//! - Snapshot, runner quote and status types
//! - The market data provider boundary
//! - Replay of recorded snapshots
//! - Mock exchange for testing

pub mod feed;
pub mod mock;
pub mod replay;
pub mod types;

pub use feed::MarketDataProvider;
pub use mock::{MockConfig, MockExchange, MockSnapshotBuilder, MockStep};
pub use replay::ReplayFeed;
pub use types::{MarketSnapshot, MarketStatus, PriceLevel, RunnerQuote, SelectionKey};
