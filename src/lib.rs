//! Single-market dutching sniper.
//!
//! Watches one betting market and fires a single batch of covering bets
//! when the quoted book drifts far enough from 100% that backing (or
//! laying) every outcome locks in a profit whichever runner wins.
//!
//! # Strategy
//!
//! Each runner's price implies a win chance of `100 / price`. Summed over
//! the book this gives the overround. When it falls below 100% by at least
//! the trigger margin, stakes proportional to win chance pay out roughly
//! the same amount whoever wins:
//!
//! ```text
//! Runner A @ 2.0 -> 50.00%   stake 7.000
//! Runner B @ 3.2 -> 31.25%   stake 4.375
//! Runner C @ 7.0 -> 14.29%   stake 2.000 (minimum stake on the outsider)
//! ──────────────────────────────────────
//! Overround: 95.54%          total 13.375, profit 0.625 on any result
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment and risk parameters
//! - [`error`]: Unified error types
//! - [`market`]: Snapshot types, data provider trait, replay and mock feeds
//! - [`arbitrage`]: Valuation, overround, stake allocation, liquidity guard
//! - [`trading`]: Bet instructions, order outcomes, execution gateways
//! - [`sniper`]: The polling/decision loop
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Shutdown handling

pub mod arbitrage;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod sniper;
pub mod trading;
pub mod utils;

pub use config::{Config, RiskParameters};
pub use error::{BotError, Result};
pub use sniper::Sniper;
