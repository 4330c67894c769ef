//! Trade execution types

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::utils::to_decimal;
use super::Opportunity;

/// Produced once per completed round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub amount_in: U256,
    pub amount_out: U256,
    pub profit: U256,
    pub discrepancy_bps: u32,
    pub cost: U256,
}

/// States of one executor attempt. Any failure aborts the whole attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionState {
    Quoting,
    CapitalRequested,
    Bought,
    Sold,
    Settled,
}

/// Persisted view of an execution, one JSON line per trade.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub strategy_id: Option<u64>,
    pub base_asset: String,
    pub quote_asset: String,
    pub cheap_venue: String,
    pub expensive_venue: String,
    pub amount_in: String,
    pub amount_out: String,
    pub profit: String,
    pub profit_units: Decimal,
    pub discrepancy_bps: u32,
    pub cost: String,
    pub execution_time_ms: u64,
}

impl ExecutionRecord {
    pub fn new(
        strategy_id: Option<u64>,
        opportunity: &Opportunity,
        result: &ExecutionResult,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            strategy_id,
            base_asset: opportunity.pair_asset_a.to_string(),
            quote_asset: opportunity.pair_asset_b.to_string(),
            cheap_venue: opportunity.cheap_venue.name().to_string(),
            expensive_venue: opportunity.expensive_venue.name().to_string(),
            amount_in: result.amount_in.to_string(),
            amount_out: result.amount_out.to_string(),
            profit: result.profit.to_string(),
            profit_units: to_decimal(result.profit),
            discrepancy_bps: result.discrepancy_bps,
            cost: result.cost.to_string(),
            execution_time_ms,
        }
    }
}
