//! Venue adapters: the uniform quote/execute surface over a liquidity venue

pub mod manual;
pub mod oracle_tracking;

pub use manual::*;
pub use oracle_tracking::*;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::sync::Arc;
use crate::errors::{ArbError, ArbResult};
use crate::utils::{BPS_DENOMINATOR, mul_div};

/// Opaque venue state captured before an execution so it can be put back on abort.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueCheckpoint(pub serde_json::Value);

/// Read/execute interface over one liquidity venue.
///
/// `quote` must be free of observable side effects. `execute` fails when the
/// realized output is below `min_amount_out`.
#[async_trait]
pub trait Venue: Send + Sync {
    fn name(&self) -> &str;

    async fn quote(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> ArbResult<U256>;

    async fn execute(
        &self,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> ArbResult<U256>;

    /// `None` when the venue cannot be rolled back locally (its own substrate is all-or-nothing).
    async fn checkpoint(&self) -> ArbResult<Option<VenueCheckpoint>> {
        Ok(None)
    }

    async fn restore(&self, _checkpoint: VenueCheckpoint) -> ArbResult<()> {
        Ok(())
    }
}

/// A venue instance plus the venue-specific descriptor it was registered with.
#[derive(Clone)]
pub struct VenueConfig {
    pub adapter: Arc<dyn Venue>,
    pub descriptor: serde_json::Value,
}

impl VenueConfig {
    pub fn new(adapter: Arc<dyn Venue>) -> Self {
        Self {
            adapter,
            descriptor: serde_json::Value::Null,
        }
    }

    pub fn with_descriptor(adapter: Arc<dyn Venue>, descriptor: serde_json::Value) -> Self {
        Self { adapter, descriptor }
    }

    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// Identity is the adapter instance, not its name or descriptor.
    pub fn same_instance(&self, other: &VenueConfig) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.adapter) as *const (),
            Arc::as_ptr(&other.adapter) as *const (),
        )
    }

    pub async fn quote(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> ArbResult<U256> {
        self.adapter.quote(asset_in, asset_out, amount_in).await
    }

    pub async fn execute(
        &self,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> ArbResult<U256> {
        self.adapter.execute(asset_in, asset_out, amount_in, min_amount_out).await
    }
}

impl std::fmt::Debug for VenueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VenueConfig")
            .field("venue", &self.name())
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Constant-product output with the fee taken from the input side.
pub(crate) fn constant_product_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u32,
) -> ArbResult<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Ok(U256::ZERO);
    }
    let fee_bps = u64::from(fee_bps).min(BPS_DENOMINATOR);
    let amount_in_with_fee = mul_div(
        amount_in,
        U256::from(BPS_DENOMINATOR - fee_bps),
        U256::from(BPS_DENOMINATOR),
    )?;
    let denominator = reserve_in
        .checked_add(amount_in_with_fee)
        .ok_or_else(|| ArbError::execution_failed("reserve overflow"))?;
    mul_div(reserve_out, amount_in_with_fee, denominator)
}

pub(crate) fn parse_amount(state: &serde_json::Value, field: &str) -> ArbResult<U256> {
    state
        .get(field)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<U256>().ok())
        .ok_or_else(|| ArbError::execution_failed(format!("checkpoint field {field} missing or malformed")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{USDC_BASE, WETH_BASE};
    use crate::utils::{PRECISION, units};

    #[test]
    fn constant_product_has_diminishing_output() {
        let reserve = units(1_000);
        let small = constant_product_out(units(1), reserve, reserve, 0).unwrap();
        let large = constant_product_out(units(100), reserve, reserve, 0).unwrap();

        assert!(small < units(1));
        assert!(large < units(100));
        assert!(large * U256::from(1u64) < small * U256::from(100u64));
        assert_eq!(constant_product_out(U256::ZERO, reserve, reserve, 30).unwrap(), U256::ZERO);
    }

    #[test]
    fn venue_identity_is_by_instance() {
        let a: Arc<dyn Venue> = Arc::new(ManualPriceVenue::new("maker", USDC_BASE, WETH_BASE, units(1_000), PRECISION, 30).unwrap());
        let b: Arc<dyn Venue> = Arc::new(ManualPriceVenue::new("maker", USDC_BASE, WETH_BASE, units(1_000), PRECISION, 30).unwrap());

        let a1 = VenueConfig::new(a.clone());
        let a2 = VenueConfig::with_descriptor(a, serde_json::json!({"position": 1}));
        let other = VenueConfig::new(b);

        assert!(a1.same_instance(&a2));
        assert!(!a1.same_instance(&other));
    }
}
