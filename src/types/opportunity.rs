//! Arbitrage opportunity types

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::errors::{ArbError, ArbResult};
use crate::utils::to_decimal;
use crate::venues::VenueConfig;

/// One directional hypothesis: buy the quote asset on `cheap_venue`, sell it on `expensive_venue`.
///
/// The base asset (`pair_asset_a`) is the asset capital is borrowed and repaid in.
#[derive(Clone)]
pub struct Opportunity {
    pub pair_asset_a: Address,
    pub pair_asset_b: Address,
    pub cheap_venue: VenueConfig,
    pub expensive_venue: VenueConfig,
    pub min_profit_threshold_bps: u32,
}

impl Opportunity {
    pub fn new(
        pair_asset_a: Address,
        pair_asset_b: Address,
        cheap_venue: VenueConfig,
        expensive_venue: VenueConfig,
        min_profit_threshold_bps: u32,
    ) -> ArbResult<Self> {
        if pair_asset_a == pair_asset_b {
            return Err(ArbError::InvalidParameter(format!(
                "pair assets must differ ({pair_asset_a})"
            )));
        }
        if cheap_venue.same_instance(&expensive_venue) {
            return Err(ArbError::InvalidParameter(format!(
                "cheap and expensive venue are the same instance ({})",
                cheap_venue.name()
            )));
        }
        Ok(Self {
            pair_asset_a,
            pair_asset_b,
            cheap_venue,
            expensive_venue,
            min_profit_threshold_bps,
        })
    }

    pub fn base_asset(&self) -> Address {
        self.pair_asset_a
    }

    pub fn route(&self) -> String {
        format!("{} -> {}", self.cheap_venue.name(), self.expensive_venue.name())
    }
}

impl std::fmt::Debug for Opportunity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opportunity")
            .field("pair_asset_a", &self.pair_asset_a)
            .field("pair_asset_b", &self.pair_asset_b)
            .field("cheap_venue", &self.cheap_venue.name())
            .field("expensive_venue", &self.expensive_venue.name())
            .field("min_profit_threshold_bps", &self.min_profit_threshold_bps)
            .finish()
    }
}

/// Outcome of `check_opportunity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpportunityCheck {
    pub exists: bool,
    pub estimated_profit: U256,
    pub discrepancy_bps: u32,
}

/// Best candidate found by a scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub opportunity: Opportunity,
    pub estimated_profit: U256,
}

/// Persisted view of a detected opportunity.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub strategy_id: Option<u64>,
    pub base_asset: String,
    pub quote_asset: String,
    pub cheap_venue: String,
    pub expensive_venue: String,
    pub cheap_descriptor: serde_json::Value,
    pub expensive_descriptor: serde_json::Value,
    pub sample_amount: String,
    pub estimated_profit: String,
    pub estimated_profit_units: Decimal,
    pub discrepancy_bps: u32,
}

impl OpportunityRecord {
    pub fn new(
        strategy_id: Option<u64>,
        opportunity: &Opportunity,
        sample_amount: U256,
        estimated_profit: U256,
        discrepancy_bps: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            strategy_id,
            base_asset: opportunity.pair_asset_a.to_string(),
            quote_asset: opportunity.pair_asset_b.to_string(),
            cheap_venue: opportunity.cheap_venue.name().to_string(),
            expensive_venue: opportunity.expensive_venue.name().to_string(),
            cheap_descriptor: opportunity.cheap_venue.descriptor.clone(),
            expensive_descriptor: opportunity.expensive_venue.descriptor.clone(),
            sample_amount: sample_amount.to_string(),
            estimated_profit: estimated_profit.to_string(),
            estimated_profit_units: to_decimal(estimated_profit),
            discrepancy_bps,
        }
    }
}
