//! Arbitrage executor: borrow, buy, sell, repay as one all-or-nothing attempt

use alloy::primitives::{Address, U256};
use tracing::{debug, error, info, warn};
use crate::{
    arbitrage::{detect_discrepancy, estimate_profit},
    config::Config,
    errors::{ArbError, ArbResult},
    types::{ExecutionResult, ExecutionState, Opportunity},
    utils::{less_bps, to_decimal},
    venues::{VenueCheckpoint, VenueConfig},
};
use super::{CapitalProvider, Wallet};

pub struct ArbitrageExecutor {
    pub slippage_tolerance_bps: u32,
    /// Reported per execution in base units; not deducted from profit.
    pub execution_cost: U256,
}

impl ArbitrageExecutor {
    pub fn new(slippage_tolerance_bps: u32, execution_cost: U256) -> Self {
        Self {
            slippage_tolerance_bps,
            execution_cost,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.slippage_tolerance_bps, config.execution_cost)
    }

    /// Runs the round trip for `amount_in` of the base asset.
    ///
    /// On any failure after quoting, every venue touched is restored to its
    /// checkpoint and the wallet is dropped; the capital provider is expected
    /// to roll back its own reservation when this returns `Err`.
    pub async fn execute_arbitrage(
        &self,
        opportunity: &Opportunity,
        amount_in: U256,
        min_profit: U256,
        provider: &mut dyn CapitalProvider,
    ) -> ArbResult<ExecutionResult> {
        if amount_in.is_zero() {
            return Err(ArbError::InvalidParameter("amount in must be non-zero".to_string()));
        }

        transition(opportunity, ExecutionState::Quoting);
        let estimated = estimate_profit(opportunity, amount_in).await?;
        if estimated < min_profit {
            return Err(ArbError::InsufficientProfit {
                actual: estimated,
                required: min_profit,
            });
        }
        let discrepancy_bps = detect_discrepancy(opportunity, amount_in).await?;

        let checkpoints = take_checkpoints(opportunity).await?;
        match self
            .run_round_trip(opportunity, amount_in, min_profit, discrepancy_bps, provider)
            .await
        {
            Ok(result) => {
                info!(
                    "✅ Arbitrage settled on {}: in {:.4}, out {:.4}, profit {:.6} ({} bps gap)",
                    opportunity.route(),
                    to_decimal(result.amount_in),
                    to_decimal(result.amount_out),
                    to_decimal(result.profit),
                    result.discrepancy_bps
                );
                Ok(result)
            }
            Err(e) => {
                warn!("Arbitrage on {} aborted: {}", opportunity.route(), e);
                rollback(checkpoints).await;
                Err(e)
            }
        }
    }

    async fn run_round_trip(
        &self,
        opportunity: &Opportunity,
        amount_in: U256,
        min_profit: U256,
        discrepancy_bps: u32,
        provider: &mut dyn CapitalProvider,
    ) -> ArbResult<ExecutionResult> {
        let base = opportunity.pair_asset_a;
        let quote = opportunity.pair_asset_b;
        let mut wallet = Wallet::default();

        transition(opportunity, ExecutionState::CapitalRequested);
        let aux_data = opportunity.route().into_bytes();
        provider.provide_capital(base, amount_in, &aux_data, &mut wallet)?;
        let received = wallet.balance_of(base);
        if received < amount_in {
            return Err(ArbError::InsufficientCapitalReceived {
                asset: base,
                requested: amount_in,
                received,
            });
        }

        transition(opportunity, ExecutionState::Bought);
        let intermediate = self
            .swap(&opportunity.cheap_venue, &mut wallet, base, quote, amount_in)
            .await?;

        transition(opportunity, ExecutionState::Sold);
        let final_amount = self
            .swap(&opportunity.expensive_venue, &mut wallet, quote, base, intermediate)
            .await?;

        transition(opportunity, ExecutionState::Settled);
        if final_amount <= amount_in {
            return Err(ArbError::ArbitrageNotProfitable {
                amount_in,
                amount_out: final_amount,
            });
        }
        let profit = final_amount - amount_in;
        if profit < min_profit {
            return Err(ArbError::InsufficientProfit {
                actual: profit,
                required: min_profit,
            });
        }

        let repayment = amount_in + profit;
        wallet.debit(base, repayment)?;
        provider.receive_repayment(base, repayment)?;

        Ok(ExecutionResult {
            amount_in,
            amount_out: final_amount,
            profit,
            discrepancy_bps,
            cost: self.execution_cost,
        })
    }

    /// One leg, guarded by a fresh quote less the slippage tolerance.
    async fn swap(
        &self,
        venue: &VenueConfig,
        wallet: &mut Wallet,
        asset_in: Address,
        asset_out: Address,
        amount_in: U256,
    ) -> ArbResult<U256> {
        let expected = venue.quote(asset_in, asset_out, amount_in).await?;
        let min_amount_out = less_bps(expected, self.slippage_tolerance_bps)?;

        wallet.debit(asset_in, amount_in)?;
        let amount_out = venue
            .execute(asset_in, asset_out, amount_in, min_amount_out)
            .await
            .map_err(|e| match e {
                ArbError::ExecutionFailed { .. } => e,
                other => ArbError::execution_failed(format!("{}: {}", venue.name(), other)),
            })?;
        wallet.credit(asset_out, amount_out)?;
        Ok(amount_out)
    }
}

fn transition(opportunity: &Opportunity, state: ExecutionState) {
    debug!(route = %opportunity.route(), ?state, "executor state");
}

async fn take_checkpoints(opportunity: &Opportunity) -> ArbResult<Vec<(VenueConfig, VenueCheckpoint)>> {
    let mut checkpoints = Vec::with_capacity(2);
    for venue in [&opportunity.cheap_venue, &opportunity.expensive_venue] {
        if let Some(checkpoint) = venue.adapter.checkpoint().await? {
            checkpoints.push((venue.clone(), checkpoint));
        }
    }
    Ok(checkpoints)
}

async fn rollback(checkpoints: Vec<(VenueConfig, VenueCheckpoint)>) {
    for (venue, checkpoint) in checkpoints.into_iter().rev() {
        if let Err(e) = venue.adapter.restore(checkpoint).await {
            error!("Failed to restore {} after abort: {}", venue.name(), e);
        }
    }
}
