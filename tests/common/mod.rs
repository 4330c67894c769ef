#![allow(dead_code)]

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use cross_venue_arb::errors::{ArbError, ArbResult, CircuitBreaker};
use cross_venue_arb::execution::ArbitrageExecutor;
use cross_venue_arb::manager::{RiskSettings, StrategyManager};
use cross_venue_arb::types::{Opportunity, USDC_BASE, WETH_BASE};
use cross_venue_arb::utils::{from_decimal, units};
use cross_venue_arb::venues::{ManualPriceVenue, Venue, VenueCheckpoint, VenueConfig};
use rust_decimal::Decimal;
use std::sync::Arc;

pub const OWNER: Address = Address::repeat_byte(0x0a);
pub const STRANGER: Address = Address::repeat_byte(0x0b);

/// Deep enough that price impact on test-sized trades is negligible.
pub const DEEP: u64 = 1_000_000_000;

pub fn price(value: Decimal) -> U256 {
    from_decimal(value).unwrap()
}

pub fn venue(name: &str, unit_price: Decimal, depth: u64) -> Arc<ManualPriceVenue> {
    Arc::new(ManualPriceVenue::new(name, USDC_BASE, WETH_BASE, units(depth), price(unit_price), 0).unwrap())
}

pub fn config(venue: &Arc<ManualPriceVenue>) -> VenueConfig {
    VenueConfig::new(venue.clone())
}

pub fn opportunity(cheap: &Arc<ManualPriceVenue>, expensive: &Arc<ManualPriceVenue>) -> Opportunity {
    Opportunity::new(USDC_BASE, WETH_BASE, config(cheap), config(expensive), 10).unwrap()
}

pub fn manager(min_profit_bps: u32, min_discrepancy_bps: u32) -> StrategyManager {
    manager_with_breaker(min_profit_bps, min_discrepancy_bps, CircuitBreaker::new(5, 300))
}

pub fn manager_with_breaker(min_profit_bps: u32, min_discrepancy_bps: u32, breaker: CircuitBreaker) -> StrategyManager {
    StrategyManager::new(
        OWNER,
        ArbitrageExecutor::new(50, U256::ZERO),
        RiskSettings {
            min_profit_bps,
            min_discrepancy_bps,
        },
        breaker,
    )
}

/// Quotes like its inner venue but refuses to fill.
pub struct HaltedVenue {
    pub inner: Arc<ManualPriceVenue>,
}

#[async_trait]
impl Venue for HaltedVenue {
    fn name(&self) -> &str {
        "halted"
    }

    async fn quote(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> ArbResult<U256> {
        self.inner.quote(asset_in, asset_out, amount_in).await
    }

    async fn execute(&self, _: Address, _: Address, _: U256, _: U256) -> ArbResult<U256> {
        Err(ArbError::execution_failed("venue halted"))
    }

    async fn checkpoint(&self) -> ArbResult<Option<VenueCheckpoint>> {
        self.inner.checkpoint().await
    }

    async fn restore(&self, checkpoint: VenueCheckpoint) -> ArbResult<()> {
        self.inner.restore(checkpoint).await
    }
}

/// A venue that is down: every quote and fill fails.
pub struct UnreachableVenue;

#[async_trait]
impl Venue for UnreachableVenue {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn quote(&self, _: Address, _: Address, _: U256) -> ArbResult<U256> {
        Err(ArbError::execution_failed("venue unreachable"))
    }

    async fn execute(&self, _: Address, _: Address, _: U256, _: U256) -> ArbResult<U256> {
        Err(ArbError::execution_failed("venue unreachable"))
    }
}
