//! Trading module for bet instructions and execution.
//!
//! This module handles:
//! - Bet sides, instructions and placement results
//! - The execution gateway boundary and dry-run gateway

pub mod gateway;
pub mod order;

pub use gateway::{submit_batch, ExecutionGateway, PaperGateway};
pub use order::{BetInstruction, ExecutionReport, OrderOutcome, PlaceResultCode, Side};
