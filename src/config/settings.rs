//! Engine configuration and environment variable handling

use alloy::primitives::{Address, U256};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use crate::types::{DEFAULT_OPERATOR, PAIRS, pair_by_label};
use crate::utils::{BPS_DENOMINATOR, from_decimal, units};

// Threshold bounds
pub const DEFAULT_MIN_PROFIT_BPS: u32 = 10;
pub const DEFAULT_MIN_DISCREPANCY_BPS: u32 = 50;
pub const MAX_SLIPPAGE_BPS: u32 = 500; // 5%
pub const MAX_VENUE_FEE_BPS: u32 = 1_000;
pub const MAX_REFERENCE_STEP_BPS: u32 = 1_000;

// Loop timing
pub const MIN_SCAN_INTERVAL_SECS: u64 = 1;
pub const MAX_SCAN_INTERVAL_SECS: u64 = 60;

/// Where the reference price comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    Simulated,
    Binance,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub operator: Address,
    pub trading_pairs: Vec<String>,
    // Risk thresholds
    pub min_profit_bps: u32,
    pub min_discrepancy_bps: u32,
    pub slippage_tolerance_bps: u32,
    pub max_capital_per_arbitrage: U256,
    pub initial_capital: U256,
    pub execution_cost: U256,
    // Loop
    pub scan_interval_secs: u64,
    pub enable_execution: bool,
    pub max_consecutive_errors: u32,
    pub circuit_breaker_cooldown_secs: u64,
    // Reference price
    pub reference_source: ReferenceSource,
    pub binance_symbol: String,
    pub reference_start_price: Decimal,
    pub reference_step_bps: u32,
    // Venues
    pub maker_lag_cycles: u64,
    pub venue_fee_bps: u32,
    pub venue_depth: U256,
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|s| s.trim().parse::<bool>().ok())
                .unwrap_or(default)
        };

        let reference_source = match lookup("REFERENCE_SOURCE").as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("binance") => ReferenceSource::Binance,
            _ => ReferenceSource::Simulated,
        };

        let trading_pairs: Vec<String> = lookup("TRADING_PAIRS")
            .map(|s| {
                s.split(',')
                    .filter_map(|label| pair_by_label(label.trim()))
                    .map(|(name, _, _)| name.to_string())
                    .collect()
            })
            .filter(|pairs: &Vec<String>| !pairs.is_empty())
            .unwrap_or_else(|| vec![PAIRS[0].0.to_string()]);

        Self {
            operator: lookup("OPERATOR_ADDRESS")
                .and_then(|s| Address::from_str(s.trim()).ok())
                .unwrap_or(DEFAULT_OPERATOR),
            trading_pairs,
            min_profit_bps: parsed("MIN_PROFIT_BPS")
                .map(|v| v.min(BPS_DENOMINATOR) as u32)
                .unwrap_or(DEFAULT_MIN_PROFIT_BPS),
            min_discrepancy_bps: parsed("MIN_DISCREPANCY_BPS")
                .map(|v| v.min(BPS_DENOMINATOR) as u32)
                .unwrap_or(DEFAULT_MIN_DISCREPANCY_BPS),
            slippage_tolerance_bps: parsed("SLIPPAGE_TOLERANCE_BPS")
                .unwrap_or(50) // 0.5% default
                .min(u64::from(MAX_SLIPPAGE_BPS)) as u32,
            max_capital_per_arbitrage: units(parsed("MAX_CAPITAL_PER_ARBITRAGE").unwrap_or(1_000).max(1)),
            initial_capital: units(parsed("INITIAL_CAPITAL").unwrap_or(10_000)),
            execution_cost: lookup("EXECUTION_COST")
                .and_then(|s| U256::from_str(s.trim()).ok())
                .unwrap_or(U256::ZERO),
            scan_interval_secs: parsed("SCAN_INTERVAL_SECS")
                .unwrap_or(2)
                .clamp(MIN_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS),
            enable_execution: flag("ENABLE_EXECUTION", false),
            max_consecutive_errors: parsed("MAX_CONSECUTIVE_ERRORS")
                .map(|v| v.clamp(1, u64::from(u32::MAX)) as u32)
                .unwrap_or(5),
            circuit_breaker_cooldown_secs: parsed("CIRCUIT_BREAKER_COOLDOWN_SECS").unwrap_or(300), // 5 minutes
            reference_source,
            binance_symbol: lookup("BINANCE_SYMBOL")
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "ETHUSDC".to_string()),
            reference_start_price: lookup("REFERENCE_START_PRICE")
                .and_then(|s| Decimal::from_str(s.trim()).ok())
                .filter(|p| *p > Decimal::ZERO)
                .unwrap_or(dec!(3000)),
            reference_step_bps: parsed("REFERENCE_STEP_BPS")
                .unwrap_or(30)
                .min(u64::from(MAX_REFERENCE_STEP_BPS)) as u32,
            maker_lag_cycles: parsed("MAKER_LAG_CYCLES").unwrap_or(5).max(1),
            venue_fee_bps: parsed("VENUE_FEE_BPS")
                .unwrap_or(30)
                .min(u64::from(MAX_VENUE_FEE_BPS)) as u32,
            venue_depth: units(parsed("VENUE_DEPTH").unwrap_or(500_000).max(1)),
        }
    }

    /// Starting reference price as an 18-decimal amount.
    pub fn reference_start_price_raw(&self) -> U256 {
        from_decimal(self.reference_start_price).unwrap_or_else(|| units(3_000))
    }
}
