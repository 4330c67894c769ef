//! Random-walk reference price for running without an exchange feed

use alloy::primitives::U256;
use async_trait::async_trait;
use rand::Rng;
use tokio::sync::Mutex;
use crate::errors::ArbResult;
use crate::utils::{BPS_DENOMINATOR, mul_div};
use super::{PriceOracle, validate_reference_price};

pub struct SimulatedPriceOracle {
    price: Mutex<U256>,
    step_bps: u32,
}

impl SimulatedPriceOracle {
    pub fn new(start_price: U256, step_bps: u32) -> ArbResult<Self> {
        validate_reference_price(start_price, "simulated")?;
        Ok(Self {
            price: Mutex::new(start_price),
            step_bps,
        })
    }

    pub async fn current(&self) -> U256 {
        *self.price.lock().await
    }
}

#[async_trait]
impl PriceOracle for SimulatedPriceOracle {
    fn source(&self) -> &str {
        "simulated"
    }

    /// Each call moves the price by a uniform step in `[-step_bps, +step_bps]`.
    async fn latest_price(&self) -> ArbResult<U256> {
        let step = i64::from(self.step_bps);
        let delta_bps = if step == 0 { 0 } else { rand::rng().random_range(-step..=step) };

        let mut price = self.price.lock().await;
        let factor = (BPS_DENOMINATOR as i64 + delta_bps) as u64;
        let next = mul_div(*price, U256::from(factor), U256::from(BPS_DENOMINATOR))?;
        if validate_reference_price(next, "simulated").is_ok() {
            *price = next;
        }
        Ok(*price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::units;

    #[tokio::test]
    async fn walk_stays_within_step() {
        let start = units(3_000);
        let oracle = SimulatedPriceOracle::new(start, 30).unwrap();

        let mut previous = start;
        for _ in 0..50 {
            let next = oracle.latest_price().await.unwrap();
            let low = mul_div(previous, U256::from(9_970u64), U256::from(10_000u64)).unwrap();
            let high = mul_div(previous, U256::from(10_030u64), U256::from(10_000u64)).unwrap();
            assert!(next >= low && next <= high);
            previous = next;
        }
        assert_eq!(oracle.current().await, previous);
    }

    #[tokio::test]
    async fn zero_step_is_constant() {
        let oracle = SimulatedPriceOracle::new(units(3_000), 0).unwrap();
        assert_eq!(oracle.latest_price().await.unwrap(), units(3_000));
        assert!(SimulatedPriceOracle::new(U256::ZERO, 10).is_err());
    }
}
