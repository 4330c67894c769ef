//! Per-asset capital accounting

use alloy::primitives::{Address, U256};
use crate::errors::{ArbError, ArbResult};
use crate::utils::BPS_DENOMINATOR;

/// Capital pool for one asset. Only the manager mutates it.
///
/// `reserved` is non-zero only while an execution is in flight under the
/// account lock; it is either settled back with profit or released.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapitalAccount {
    pub available: U256,
    pub max_per_trade: U256,
    pub reserved: U256,
    pub total_deposited: U256,
    pub total_withdrawn: U256,
    pub total_profit: U256,
}

impl CapitalAccount {
    pub fn deposit(&mut self, amount: U256) -> ArbResult<()> {
        self.available = checked(self.available.checked_add(amount), "available")?;
        self.total_deposited = checked(self.total_deposited.checked_add(amount), "total deposited")?;
        Ok(())
    }

    pub fn withdraw(&mut self, asset: Address, amount: U256) -> ArbResult<()> {
        if amount > self.available {
            return Err(ArbError::InsufficientCapital {
                asset,
                required: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        self.total_withdrawn += amount;
        Ok(())
    }

    /// Moves `amount` out of `available` for an in-flight execution.
    pub fn reserve(&mut self, asset: Address, amount: U256) -> ArbResult<()> {
        if amount > self.available {
            return Err(ArbError::InsufficientCapital {
                asset,
                required: amount,
                available: self.available,
            });
        }
        self.available -= amount;
        self.reserved += amount;
        Ok(())
    }

    /// Returns an unused reservation to `available`. Undoes a failed
    /// attempt, since `settle` either applies fully or not at all.
    pub fn release(&mut self) {
        self.available += self.reserved;
        self.reserved = U256::ZERO;
    }

    /// Accepts principal plus profit back from the executor; returns the profit credited.
    pub fn settle(&mut self, returned: U256) -> ArbResult<U256> {
        if returned < self.reserved {
            return Err(ArbError::execution_failed(format!(
                "repayment {returned} is below reserved principal {}",
                self.reserved
            )));
        }
        let profit = returned - self.reserved;
        let available = checked(self.available.checked_add(returned), "available")?;
        let total_profit = checked(self.total_profit.checked_add(profit), "total profit")?;
        self.available = available;
        self.total_profit = total_profit;
        self.reserved = U256::ZERO;
        Ok(profit)
    }

    /// Sample size used for scans: the per-trade cap, or everything when uncapped.
    pub fn trade_ceiling(&self) -> U256 {
        if self.max_per_trade.is_zero() {
            self.available
        } else {
            self.max_per_trade.min(self.available)
        }
    }

    /// `available <= deposited - withdrawn + profit`
    pub fn is_conserved(&self) -> bool {
        let ceiling = (self.total_deposited + self.total_profit).saturating_sub(self.total_withdrawn);
        self.available + self.reserved <= ceiling
    }

    pub fn status(&self) -> CapitalStatus {
        let utilization_bps = if self.available.is_zero() {
            0
        } else {
            let committed = self.trade_ceiling() * U256::from(BPS_DENOMINATOR) / self.available;
            u32::try_from(committed).unwrap_or(u32::MAX)
        };
        CapitalStatus {
            available: self.available,
            max_per_trade: self.max_per_trade,
            utilization_bps,
        }
    }
}

fn checked(value: Option<U256>, what: &str) -> ArbResult<U256> {
    value.ok_or_else(|| ArbError::execution_failed(format!("{what} overflow")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapitalStatus {
    pub available: U256,
    pub max_per_trade: U256,
    pub utilization_bps: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn withdraw_rejects_more_than_available() {
        let mut account = CapitalAccount::default();
        account.deposit(amount(1_000)).unwrap();

        let err = account.withdraw(Address::ZERO, amount(1_001)).unwrap_err();
        assert!(matches!(err, ArbError::InsufficientCapital { .. }));
        assert_eq!(account.available, amount(1_000));

        account.withdraw(Address::ZERO, amount(400)).unwrap();
        assert_eq!(account.available, amount(600));
        assert!(account.is_conserved());
    }

    #[test]
    fn reserve_settle_credits_only_profit() {
        let mut account = CapitalAccount::default();
        account.deposit(amount(1_000)).unwrap();

        account.reserve(Address::ZERO, amount(300)).unwrap();
        assert_eq!(account.available, amount(700));
        assert!(account.is_conserved());

        let profit = account.settle(amount(330)).unwrap();
        assert_eq!(profit, amount(30));
        assert_eq!(account.available, amount(1_030));
        assert_eq!(account.reserved, U256::ZERO);
        assert!(account.is_conserved());
    }

    #[test]
    fn release_restores_reservation() {
        let mut account = CapitalAccount::default();
        account.deposit(amount(500)).unwrap();
        account.reserve(Address::ZERO, amount(500)).unwrap();
        assert!(account.reserve(Address::ZERO, amount(1)).is_err());

        account.release();
        assert_eq!(account.available, amount(500));
        assert!(account.settle(amount(1)).is_ok());
    }

    #[test]
    fn failed_settle_leaves_reservation_for_release() {
        let mut account = CapitalAccount::default();
        account.deposit(amount(800)).unwrap();
        let before = account.clone();

        account.reserve(Address::ZERO, amount(300)).unwrap();
        assert!(account.settle(amount(299)).is_err());
        assert_eq!(account.reserved, amount(300));
        assert_eq!(account.total_profit, U256::ZERO);

        account.release();
        assert_eq!(account, before);
    }

    #[test]
    fn status_reports_share_of_pool_per_trade() {
        let mut account = CapitalAccount::default();
        assert_eq!(account.status().utilization_bps, 0);

        account.deposit(amount(10_000)).unwrap();
        assert_eq!(account.status().utilization_bps, 10_000);

        account.max_per_trade = amount(2_500);
        let status = account.status();
        assert_eq!(status.utilization_bps, 2_500);
        assert_eq!(status.max_per_trade, amount(2_500));
        assert_eq!(account.trade_ceiling(), amount(2_500));
    }
}
