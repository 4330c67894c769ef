//! Optimal trade sizing

use alloy::primitives::U256;
use tracing::debug;
use crate::errors::{ArbError, ArbResult};
use crate::types::Opportunity;
use super::estimate_profit;

pub const SEARCH_ITERATIONS: usize = 20;

/// Bounded local search over `[max/100, max]` for the most profitable size.
///
/// Each step probes profit at the midpoint and 10% above it; rising profit
/// moves the lower bound up, otherwise the upper bound comes down. The best
/// `(amount, profit)` seen is returned, so with no profitable size the
/// lower bound comes back. Assumes the round trip is concave in size; a
/// curve with several local maxima can be missed.
pub async fn optimal_amount(opportunity: &Opportunity, max_amount_in: U256) -> ArbResult<U256> {
    if max_amount_in.is_zero() {
        return Err(ArbError::InvalidParameter("capital ceiling must be non-zero".to_string()));
    }

    let mut low = (max_amount_in / U256::from(100u64)).max(U256::from(1u64));
    let mut high = max_amount_in;

    let mut best_amount = low;
    let mut best_profit = estimate_profit(opportunity, low).await?;

    for _ in 0..SEARCH_ITERATIONS {
        if low >= high {
            break;
        }
        let mid = low + (high - low) / U256::from(2u64);
        let probe = (mid.saturating_mul(U256::from(11u64)) / U256::from(10u64)).min(max_amount_in);

        let mid_profit = estimate_profit(opportunity, mid).await?;
        let probe_profit = estimate_profit(opportunity, probe).await?;

        if mid_profit > best_profit {
            best_amount = mid;
            best_profit = mid_profit;
        }
        if probe_profit > best_profit {
            best_amount = probe;
            best_profit = probe_profit;
        }

        if probe_profit > mid_profit {
            low = mid;
        } else {
            high = mid;
        }
    }

    debug!(route = %opportunity.route(), %best_amount, %best_profit, "optimal size found");
    Ok(best_amount)
}
