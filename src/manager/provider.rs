//! Capital provider backed by a manager-owned capital account

use alloy::primitives::{Address, U256};
use tracing::debug;
use crate::errors::{ArbError, ArbResult};
use crate::execution::{CapitalProvider, Wallet};
use crate::types::CapitalAccount;

/// Lends from one asset's pool for the length of one execution.
///
/// The caller holds the account lock for the provider's whole lifetime and
/// releases the reservation when the execution fails.
pub struct AccountCapitalProvider<'a> {
    asset: Address,
    account: &'a mut CapitalAccount,
    profit: U256,
}

impl<'a> AccountCapitalProvider<'a> {
    pub fn new(asset: Address, account: &'a mut CapitalAccount) -> Self {
        Self {
            asset,
            account,
            profit: U256::ZERO,
        }
    }

    /// Profit credited by the last repayment.
    pub fn credited_profit(&self) -> U256 {
        self.profit
    }

    fn check_asset(&self, asset: Address) -> ArbResult<()> {
        if asset != self.asset {
            return Err(ArbError::execution_failed(format!(
                "capital requested in {asset}, account holds {}",
                self.asset
            )));
        }
        Ok(())
    }
}

impl CapitalProvider for AccountCapitalProvider<'_> {
    fn provide_capital(
        &mut self,
        asset: Address,
        amount: U256,
        aux_data: &[u8],
        wallet: &mut Wallet,
    ) -> ArbResult<()> {
        self.check_asset(asset)?;
        self.account.reserve(asset, amount)?;
        wallet.credit(asset, amount)?;
        debug!(
            %asset,
            %amount,
            route = %String::from_utf8_lossy(aux_data),
            "capital lent to executor"
        );
        Ok(())
    }

    fn receive_repayment(&mut self, asset: Address, amount: U256) -> ArbResult<()> {
        self.check_asset(asset)?;
        self.profit = self.account.settle(amount)?;
        debug!(%asset, %amount, profit = %self.profit, "repayment settled");
        Ok(())
    }
}
