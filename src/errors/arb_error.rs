//! Error taxonomy for the arbitrage engine

use alloy::primitives::{Address, U256};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArbError {
    #[error("Insufficient profit: {actual} < required {required}")]
    InsufficientProfit { actual: U256, required: U256 },

    #[error("Arbitrage not profitable: {amount_in} in, {amount_out} out")]
    ArbitrageNotProfitable { amount_in: U256, amount_out: U256 },

    #[error("Capital provider did not deliver {requested} of {asset} (executor holds {received})")]
    InsufficientCapitalReceived {
        asset: Address,
        requested: U256,
        received: U256,
    },

    #[error("Insufficient capital for {asset}: required {required}, available {available}")]
    InsufficientCapital {
        asset: Address,
        required: U256,
        available: U256,
    },

    #[error("Unauthorized caller: {caller}")]
    UnauthorizedCaller { caller: Address },

    #[error("Price discrepancy too low: {actual_bps} bps < {required_bps} bps")]
    PriceDiscrepancyTooLow { actual_bps: u32, required_bps: u32 },

    #[error("Execution failed: {reason}")]
    ExecutionFailed { reason: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(u64),

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Reference price rejected: {price} - {reason}")]
    PriceValidation { price: U256, reason: String },

    #[error("Circuit breaker active: {reason}")]
    CircuitBreakerOpen {
        reason: String,
        cooldown_remaining: Duration,
    },
}

impl ArbError {
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        ArbError::ExecutionFailed {
            reason: reason.into(),
        }
    }

    /// Errors that mean "the market moved", as opposed to a broken venue or caller.
    pub fn is_market_condition(&self) -> bool {
        matches!(
            self,
            ArbError::InsufficientProfit { .. }
                | ArbError::ArbitrageNotProfitable { .. }
                | ArbError::PriceDiscrepancyTooLow { .. }
        )
    }
}

pub type ArbResult<T> = Result<T, ArbError>;
