//! Maker-priced venue: a constant-product pool whose price only moves when
//! traded against or when the maker repositions it.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};
use crate::errors::{ArbError, ArbResult};
use crate::utils::{PRECISION, mul_div, to_decimal};
use super::{Venue, VenueCheckpoint, constant_product_out, parse_amount};

#[derive(Debug, Clone, Copy)]
struct Reserves {
    base: U256,
    quote: U256,
}

pub struct ManualPriceVenue {
    name: String,
    base_asset: Address,
    quote_asset: Address,
    fee_bps: u32,
    reserves: RwLock<Reserves>,
}

impl ManualPriceVenue {
    /// `price` is base paid per unit of quote, scaled by `PRECISION`.
    pub fn new(
        name: &str,
        base_asset: Address,
        quote_asset: Address,
        base_depth: U256,
        price: U256,
        fee_bps: u32,
    ) -> ArbResult<Self> {
        let reserves = centred_reserves(base_depth, price)?;
        Ok(Self {
            name: name.to_string(),
            base_asset,
            quote_asset,
            fee_bps,
            reserves: RwLock::new(reserves),
        })
    }

    /// Manual maker action: re-centre the pool on `price` at unchanged base depth.
    pub async fn reprice(&self, price: U256) -> ArbResult<()> {
        let mut reserves = self.reserves.write().await;
        *reserves = centred_reserves(reserves.base, price)?;
        info!("🔧 {} repriced by maker to {:.4}", self.name, to_decimal(price));
        Ok(())
    }

    /// Spot price (base per quote, `PRECISION`-scaled).
    pub async fn spot_price(&self) -> ArbResult<U256> {
        let reserves = *self.reserves.read().await;
        mul_div(reserves.base, PRECISION, reserves.quote)
    }

    pub async fn reserves(&self) -> (U256, U256) {
        let reserves = *self.reserves.read().await;
        (reserves.base, reserves.quote)
    }

    fn direction(&self, asset_in: Address, asset_out: Address) -> ArbResult<bool> {
        if asset_in == self.base_asset && asset_out == self.quote_asset {
            Ok(true)
        } else if asset_in == self.quote_asset && asset_out == self.base_asset {
            Ok(false)
        } else {
            Err(ArbError::execution_failed(format!(
                "{} does not trade {asset_in} -> {asset_out}",
                self.name
            )))
        }
    }

    fn amount_out(&self, reserves: Reserves, base_in: bool, amount_in: U256) -> ArbResult<U256> {
        if base_in {
            constant_product_out(amount_in, reserves.base, reserves.quote, self.fee_bps)
        } else {
            constant_product_out(amount_in, reserves.quote, reserves.base, self.fee_bps)
        }
    }
}

fn centred_reserves(base_depth: U256, price: U256) -> ArbResult<Reserves> {
    if base_depth.is_zero() || price.is_zero() {
        return Err(ArbError::InvalidParameter(
            "venue depth and price must be non-zero".to_string(),
        ));
    }
    Ok(Reserves {
        base: base_depth,
        quote: mul_div(base_depth, PRECISION, price)?,
    })
}

#[async_trait]
impl Venue for ManualPriceVenue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn quote(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> ArbResult<U256> {
        let base_in = self.direction(asset_in, asset_out)?;
        let reserves = *self.reserves.read().await;
        self.amount_out(reserves, base_in, amount_in)
    }

    async fn execute(
        &self,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> ArbResult<U256> {
        let base_in = self.direction(asset_in, asset_out)?;
        let mut reserves = self.reserves.write().await;
        let amount_out = self.amount_out(*reserves, base_in, amount_in)?;
        if amount_out < min_amount_out || amount_out.is_zero() {
            return Err(ArbError::execution_failed(format!(
                "{}: output {amount_out} below minimum {min_amount_out}",
                self.name
            )));
        }
        if base_in {
            reserves.base += amount_in;
            reserves.quote -= amount_out;
        } else {
            reserves.quote += amount_in;
            reserves.base -= amount_out;
        }
        debug!(venue = %self.name, %amount_in, %amount_out, "swap filled");
        Ok(amount_out)
    }

    async fn checkpoint(&self) -> ArbResult<Option<VenueCheckpoint>> {
        let reserves = *self.reserves.read().await;
        Ok(Some(VenueCheckpoint(json!({
            "reserve_base": reserves.base.to_string(),
            "reserve_quote": reserves.quote.to_string(),
        }))))
    }

    async fn restore(&self, checkpoint: VenueCheckpoint) -> ArbResult<()> {
        let restored = Reserves {
            base: parse_amount(&checkpoint.0, "reserve_base")?,
            quote: parse_amount(&checkpoint.0, "reserve_quote")?,
        };
        *self.reserves.write().await = restored;
        Ok(())
    }
}
