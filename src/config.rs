//! Application configuration loaded from environment variables.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::trading::Side;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Target ===
    /// Market to monitor.
    pub market_id: String,

    // === Sniping Rules ===
    /// Minimum stake per bet (exchange minimum is 2).
    #[serde(default = "default_minimum_stake")]
    pub minimum_stake: Decimal,

    /// Do not place bets totalling more than this.
    #[serde(default = "default_max_total_stake")]
    pub max_total_stake: Decimal,

    /// Percentage points away from a 100% book needed to fire.
    #[serde(default = "default_trigger_margin")]
    pub trigger_margin: Decimal,

    /// Runners priced above this are left out of the plan.
    #[serde(default = "default_exclude_over")]
    pub exclude_over: Decimal,

    /// Worst-case profit a plan must guarantee.
    #[serde(default = "default_minimum_profit")]
    pub minimum_profit: Decimal,

    /// Back or lay every runner.
    #[serde(default)]
    pub bet_side: Side,

    // === Loop Behaviour ===
    /// Seconds between price refreshes.
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,

    /// Quit when the market suspends (e.g. removed runner).
    #[serde(default)]
    pub abort_on_suspend: bool,

    /// Keep sniping once the event is in play.
    #[serde(default)]
    pub bet_in_play: bool,

    // === Data Source ===
    /// JSON file of recorded snapshots to replay.
    #[serde(default)]
    pub replay_file: Option<String>,

    // === Observability ===
    /// Prometheus exporter port; no exporter when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Log output format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_minimum_stake() -> Decimal {
    Decimal::new(2, 0)
}

fn default_max_total_stake() -> Decimal {
    Decimal::new(50, 0)
}

fn default_trigger_margin() -> Decimal {
    Decimal::ONE // 1%
}

fn default_exclude_over() -> Decimal {
    Decimal::new(1001, 0)
}

fn default_minimum_profit() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_refresh_seconds() -> u64 {
    7
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.market_id.trim().is_empty() {
            return Err("MARKET_ID is required".to_string());
        }

        if self.minimum_stake <= Decimal::ZERO {
            return Err("MINIMUM_STAKE must be positive".to_string());
        }

        if self.max_total_stake < self.minimum_stake {
            return Err("MAX_TOTAL_STAKE must be at least MINIMUM_STAKE".to_string());
        }

        if self.trigger_margin < Decimal::ZERO {
            return Err("TRIGGER_MARGIN cannot be negative".to_string());
        }

        if self.exclude_over <= Decimal::ONE {
            return Err("EXCLUDE_OVER must be greater than 1.0".to_string());
        }

        if self.refresh_seconds == 0 {
            return Err("REFRESH_SECONDS must be at least 1".to_string());
        }

        Ok(())
    }

    /// Time to wait between polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds)
    }

    /// Check if logs should be emitted as JSON.
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Freeze the risk settings for the lifetime of the process.
    pub fn risk_parameters(&self) -> RiskParameters {
        RiskParameters {
            side: self.bet_side,
            minimum_stake: self.minimum_stake,
            max_total_stake: self.max_total_stake,
            trigger_margin: self.trigger_margin,
            exclude_over: self.exclude_over,
            minimum_profit: self.minimum_profit,
            bet_in_play: self.bet_in_play,
            abort_on_suspend: self.abort_on_suspend,
        }
    }
}

/// Operator risk bounds. Never mutated once the loop starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskParameters {
    /// Side every leg is placed on.
    pub side: Side,
    /// Stake placed on the longest-priced runner.
    pub minimum_stake: Decimal,
    /// Ceiling on the sum of all stakes.
    pub max_total_stake: Decimal,
    /// Required distance of the overround from 100, in percentage points.
    pub trigger_margin: Decimal,
    /// Price ceiling for inclusion in the plan.
    pub exclude_over: Decimal,
    /// Floor on the worst-case profit.
    pub minimum_profit: Decimal,
    /// Whether in-play markets are evaluated.
    pub bet_in_play: bool,
    /// Whether a suspension ends the run.
    pub abort_on_suspend: bool,
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self {
            side: Side::Back,
            minimum_stake: default_minimum_stake(),
            max_total_stake: default_max_total_stake(),
            trigger_margin: default_trigger_margin(),
            exclude_over: default_exclude_over(),
            minimum_profit: default_minimum_profit(),
            bet_in_play: false,
            abort_on_suspend: false,
        }
    }
}
