//! Arbitrage module for detecting and sizing dutching opportunities.
//!
//! This module handles:
//! - Runner valuation and price ceiling exclusion
//! - Overround and trigger calculations
//! - Proportional stake allocation
//! - Liquidity checks on the final plan

pub mod calculator;
pub mod detector;
pub mod liquidity;
pub mod overround;
pub mod valuation;

pub use calculator::{profit_if_wins, AllocationPlan, Allocator, StakeLeg};
pub use detector::{evaluate_snapshot, plan_for, Decision, Evaluation};
pub use liquidity::{check_liquidity, find_shortfalls, LiquidityShortfall};
pub use overround::{calculate_overround, is_triggered, trigger_threshold};
pub use valuation::{value_runner, win_chance, Valuation, ValuedBook, ValuedRunner};
