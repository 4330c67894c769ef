//! Capital provider callback and the executor's transient wallet

use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use crate::errors::{ArbError, ArbResult};

/// Balances the executor holds during one attempt. Created empty per
/// attempt and dropped on abort.
#[derive(Debug, Default)]
pub struct Wallet {
    balances: HashMap<Address, U256>,
}

impl Wallet {
    pub fn balance_of(&self, asset: Address) -> U256 {
        self.balances.get(&asset).copied().unwrap_or_default()
    }

    pub fn credit(&mut self, asset: Address, amount: U256) -> ArbResult<()> {
        let balance = self.balances.entry(asset).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| ArbError::execution_failed(format!("wallet balance overflow for {asset}")))?;
        Ok(())
    }

    pub fn debit(&mut self, asset: Address, amount: U256) -> ArbResult<()> {
        let balance = self.balances.entry(asset).or_default();
        if *balance < amount {
            return Err(ArbError::execution_failed(format!(
                "wallet holds {balance} of {asset}, needs {amount}"
            )));
        }
        *balance -= amount;
        Ok(())
    }
}

/// Supplies principal to the executor and takes principal plus profit back.
///
/// Synchronous by contract: when `provide_capital` returns `Ok`, the funds
/// must already sit in `wallet`.
pub trait CapitalProvider: Send {
    fn provide_capital(
        &mut self,
        asset: Address,
        amount: U256,
        aux_data: &[u8],
        wallet: &mut Wallet,
    ) -> ArbResult<()>;

    fn receive_repayment(&mut self, asset: Address, amount: U256) -> ArbResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_debit_requires_balance() {
        let mut wallet = Wallet::default();
        let asset = Address::repeat_byte(1);

        wallet.credit(asset, U256::from(10u64)).unwrap();
        assert!(wallet.debit(asset, U256::from(11u64)).is_err());
        wallet.debit(asset, U256::from(4u64)).unwrap();
        assert_eq!(wallet.balance_of(asset), U256::from(6u64));
        assert_eq!(wallet.balance_of(Address::ZERO), U256::ZERO);
    }
}
