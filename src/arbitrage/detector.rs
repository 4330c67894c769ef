//! Opportunity detection: price discrepancy and side-effect-free profit estimates

use alloy::primitives::U256;
use tracing::debug;
use crate::errors::{ArbError, ArbResult};
use crate::types::{Opportunity, OpportunityCheck};
use crate::utils::{BPS_DENOMINATOR, PRECISION, apply_bps, bps_to_u32, mul_div};
use crate::venues::VenueConfig;

/// Base paid per unit of quote when buying `sample` base worth on `venue`.
/// `None` when the venue gives nothing for the sample.
async fn unit_price(venue: &VenueConfig, opportunity: &Opportunity, sample: U256) -> ArbResult<Option<U256>> {
    let bought = venue
        .quote(opportunity.pair_asset_a, opportunity.pair_asset_b, sample)
        .await?;
    if bought.is_zero() {
        return Ok(None);
    }
    mul_div(sample, PRECISION, bought).map(Some)
}

/// Gap between the two venues' unit prices in bps; zero unless the
/// expensive venue really prices the quote asset higher.
pub async fn detect_discrepancy(opportunity: &Opportunity, sample_amount: U256) -> ArbResult<u32> {
    if sample_amount.is_zero() {
        return Err(ArbError::InvalidParameter("sample amount must be non-zero".to_string()));
    }

    let cheap = unit_price(&opportunity.cheap_venue, opportunity, sample_amount).await?;
    let expensive = unit_price(&opportunity.expensive_venue, opportunity, sample_amount).await?;

    let (Some(cheap_price), Some(expensive_price)) = (cheap, expensive) else {
        return Ok(0);
    };
    if expensive_price <= cheap_price {
        return Ok(0);
    }

    let gap = mul_div(
        expensive_price - cheap_price,
        U256::from(BPS_DENOMINATOR),
        cheap_price,
    )?;
    Ok(bps_to_u32(gap))
}

/// Quotes the round trip (buy on cheap, sell on expensive) without executing.
/// Never negative: a losing round trip estimates to zero.
pub async fn estimate_profit(opportunity: &Opportunity, amount_in: U256) -> ArbResult<U256> {
    if amount_in.is_zero() {
        return Ok(U256::ZERO);
    }
    let intermediate = opportunity
        .cheap_venue
        .quote(opportunity.pair_asset_a, opportunity.pair_asset_b, amount_in)
        .await?;
    if intermediate.is_zero() {
        return Ok(U256::ZERO);
    }
    let final_amount = opportunity
        .expensive_venue
        .quote(opportunity.pair_asset_b, opportunity.pair_asset_a, intermediate)
        .await?;
    Ok(final_amount.saturating_sub(amount_in))
}

/// Profit must reach `sample * min_profit_bps / 10000` and the discrepancy must be positive.
pub async fn check_opportunity(
    opportunity: &Opportunity,
    min_profit_bps: u32,
    sample_amount: U256,
) -> ArbResult<OpportunityCheck> {
    let estimated_profit = estimate_profit(opportunity, sample_amount).await?;
    let discrepancy_bps = detect_discrepancy(opportunity, sample_amount).await?;
    let required = apply_bps(sample_amount, min_profit_bps)?;

    let exists = estimated_profit >= required && discrepancy_bps > 0;
    debug!(
        route = %opportunity.route(),
        %estimated_profit,
        %required,
        discrepancy_bps,
        exists,
        "opportunity checked"
    );

    Ok(OpportunityCheck {
        exists,
        estimated_profit,
        discrepancy_bps,
    })
}
