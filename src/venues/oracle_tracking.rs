//! Oracle-tracking venue: quotes a curve re-centred on the latest reference
//! price, so its price follows the market without maker action.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use crate::errors::{ArbError, ArbResult};
use crate::utils::{PRECISION, mul_div};
use super::{Venue, VenueCheckpoint, constant_product_out, parse_amount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inventory {
    pub base: U256,
    pub quote: U256,
}

pub struct OracleTrackingVenue {
    name: String,
    base_asset: Address,
    quote_asset: Address,
    fee_bps: u32,
    /// Virtual base depth of the pricing curve; controls price impact.
    virtual_depth: U256,
    reference_price: RwLock<U256>,
    inventory: RwLock<Inventory>,
}

impl OracleTrackingVenue {
    pub fn new(
        name: &str,
        base_asset: Address,
        quote_asset: Address,
        virtual_depth: U256,
        reference_price: U256,
        inventory: Inventory,
        fee_bps: u32,
    ) -> ArbResult<Self> {
        if virtual_depth.is_zero() || reference_price.is_zero() {
            return Err(ArbError::InvalidParameter(
                "virtual depth and reference price must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            base_asset,
            quote_asset,
            fee_bps,
            virtual_depth,
            reference_price: RwLock::new(reference_price),
            inventory: RwLock::new(inventory),
        })
    }

    /// Feeds a new reference price (base per quote, `PRECISION`-scaled).
    pub async fn sync_reference(&self, price: U256) -> ArbResult<()> {
        if price.is_zero() {
            return Err(ArbError::PriceValidation {
                price,
                reason: "reference price is zero".to_string(),
            });
        }
        *self.reference_price.write().await = price;
        debug!(venue = %self.name, %price, "reference price synced");
        Ok(())
    }

    pub async fn reference_price(&self) -> U256 {
        *self.reference_price.read().await
    }

    pub async fn inventory(&self) -> Inventory {
        *self.inventory.read().await
    }

    async fn amount_out(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> ArbResult<(bool, U256)> {
        let base_in = if asset_in == self.base_asset && asset_out == self.quote_asset {
            true
        } else if asset_in == self.quote_asset && asset_out == self.base_asset {
            false
        } else {
            return Err(ArbError::execution_failed(format!(
                "{} does not trade {asset_in} -> {asset_out}",
                self.name
            )));
        };

        let price = *self.reference_price.read().await;
        let virtual_base = self.virtual_depth;
        let virtual_quote = mul_div(virtual_base, PRECISION, price)?;
        let out = if base_in {
            constant_product_out(amount_in, virtual_base, virtual_quote, self.fee_bps)?
        } else {
            constant_product_out(amount_in, virtual_quote, virtual_base, self.fee_bps)?
        };
        Ok((base_in, out))
    }
}

#[async_trait]
impl Venue for OracleTrackingVenue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn quote(&self, asset_in: Address, asset_out: Address, amount_in: U256) -> ArbResult<U256> {
        let (_, out) = self.amount_out(asset_in, asset_out, amount_in).await?;
        Ok(out)
    }

    async fn execute(
        &self,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
        min_amount_out: U256,
    ) -> ArbResult<U256> {
        let (base_in, amount_out) = self.amount_out(asset_in, asset_out, amount_in).await?;
        if amount_out < min_amount_out || amount_out.is_zero() {
            return Err(ArbError::execution_failed(format!(
                "{}: output {amount_out} below minimum {min_amount_out}",
                self.name
            )));
        }

        let mut inventory = self.inventory.write().await;
        let held = if base_in { inventory.quote } else { inventory.base };
        if held < amount_out {
            return Err(ArbError::execution_failed(format!(
                "{}: inventory {held} cannot cover output {amount_out}",
                self.name
            )));
        }
        if base_in {
            inventory.base += amount_in;
            inventory.quote -= amount_out;
        } else {
            inventory.quote += amount_in;
            inventory.base -= amount_out;
        }
        debug!(venue = %self.name, %amount_in, %amount_out, "swap filled");
        Ok(amount_out)
    }

    async fn checkpoint(&self) -> ArbResult<Option<VenueCheckpoint>> {
        let inventory = *self.inventory.read().await;
        Ok(Some(VenueCheckpoint(json!({
            "inventory_base": inventory.base.to_string(),
            "inventory_quote": inventory.quote.to_string(),
        }))))
    }

    async fn restore(&self, checkpoint: VenueCheckpoint) -> ArbResult<()> {
        let restored = Inventory {
            base: parse_amount(&checkpoint.0, "inventory_base")?,
            quote: parse_amount(&checkpoint.0, "inventory_quote")?,
        };
        *self.inventory.write().await = restored;
        Ok(())
    }
}
