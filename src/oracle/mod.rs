//! Reference price sources for the oracle-tracking venue

pub mod binance;
pub mod simulated;

pub use binance::*;
pub use simulated::*;

use alloy::primitives::U256;
use async_trait::async_trait;
use crate::errors::{ArbError, ArbResult};
use crate::utils::{BPS_DENOMINATOR, PRECISION, bps_to_u32, mul_div, units};

/// Lowest and highest reference price accepted (base per quote, 18 decimals).
pub const MIN_REFERENCE_PRICE: U256 = U256::from_limbs([1_000_000_000_000, 0, 0, 0]);
pub const MAX_REFERENCE_PRICE_UNITS: u64 = 10_000_000;
/// Largest accepted move between two consecutive readings.
pub const MAX_REFERENCE_MOVE_BPS: u32 = 1_000;

#[async_trait]
pub trait PriceOracle: Send + Sync {
    fn source(&self) -> &str;

    /// Latest reference price, base per quote, `PRECISION`-scaled.
    async fn latest_price(&self) -> ArbResult<U256>;
}

pub fn validate_reference_price(price: U256, source: &str) -> ArbResult<()> {
    if price.is_zero() {
        return Err(ArbError::PriceValidation {
            price,
            reason: format!("{source} price is zero"),
        });
    }
    if price < MIN_REFERENCE_PRICE || price > units(MAX_REFERENCE_PRICE_UNITS) {
        return Err(ArbError::PriceValidation {
            price,
            reason: format!("{source} price out of reasonable range"),
        });
    }
    Ok(())
}

/// Rejects a reading that jumped more than `MAX_REFERENCE_MOVE_BPS` from `previous`.
pub fn validate_reference_move(previous: U256, next: U256, source: &str) -> ArbResult<()> {
    validate_reference_price(next, source)?;
    if previous.is_zero() {
        return Ok(());
    }
    let diff = if next > previous { next - previous } else { previous - next };
    let moved_bps = bps_to_u32(mul_div(diff, U256::from(BPS_DENOMINATOR), previous)?);
    if moved_bps > MAX_REFERENCE_MOVE_BPS {
        return Err(ArbError::PriceValidation {
            price: next,
            reason: format!("{source} moved {moved_bps} bps in one update"),
        });
    }
    Ok(())
}
