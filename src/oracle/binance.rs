//! Binance spot ticker as the reference price

use alloy::primitives::U256;
use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::prelude::*;
use std::time::Duration;
use tracing::{debug, warn};
use crate::errors::{ArbError, ArbResult};
use crate::network::{RetryConfig, retry_with_backoff};
use crate::utils::from_decimal;
use super::{PriceOracle, validate_reference_price};

pub const BINANCE_API_URL: &str = "https://api.binance.com";

pub struct BinancePriceOracle {
    client: reqwest::Client,
    base_url: String,
    symbol: String,
    retry: RetryConfig,
}

impl BinancePriceOracle {
    pub fn new(symbol: &str) -> ArbResult<Self> {
        Self::with_base_url(BINANCE_API_URL, symbol)
    }

    pub fn with_base_url(base_url: &str, symbol: &str) -> ArbResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .map_err(|e| {
                warn!("⚠️ Failed to initialize HTTP client: {}", e);
                ArbError::Network {
                    message: "Failed to build HTTP client".to_string(),
                    source: Some(e.into()),
                    retry_count: 0,
                }
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            symbol: symbol.to_string(),
            retry: RetryConfig {
                max_attempts: 5,
                initial_delay_ms: 200,
                ..Default::default()
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_ticker(&self) -> anyhow::Result<Decimal> {
        let response = self
            .client
            .get(format!("{}/api/v3/ticker/price", self.base_url))
            .query(&[("symbol", self.symbol.as_str())])
            .send()
            .await
            .context("HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("⚠️ Binance API returned error status {}: {}", status, body);
            return Err(anyhow::anyhow!("Binance API error: {} - {}", status, body));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse JSON response")?;

        let price_str = json["price"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'price' field in response"))?;

        Decimal::from_str(price_str).context("Failed to parse price string")
    }
}

#[async_trait]
impl PriceOracle for BinancePriceOracle {
    fn source(&self) -> &str {
        "binance"
    }

    async fn latest_price(&self) -> ArbResult<U256> {
        let price = retry_with_backoff(move || self.fetch_ticker(), &self.retry, "Binance price fetch").await?;
        debug!(symbol = %self.symbol, %price, "binance ticker");

        let raw = from_decimal(price).ok_or_else(|| ArbError::PriceValidation {
            price: U256::ZERO,
            reason: format!("Binance returned unusable price {price}"),
        })?;
        validate_reference_price(raw, "Binance")?;
        Ok(raw)
    }
}
