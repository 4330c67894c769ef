//! Asset addresses and monitored pair definitions

use alloy::primitives::{Address, address};

// Base mainnet token addresses used as asset identifiers
pub const WETH_BASE: Address = address!("4200000000000000000000000000000000000006");
pub const USDC_BASE: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const USDBC_BASE: Address = address!("d9aAEc86B65D86f6A7B5B1b0c42FFA531710b6CA");

/// Default operator identity; owns the manager when no OPERATOR_ADDRESS is set.
pub const DEFAULT_OPERATOR: Address = address!("00000000000000000000000000000000000a4b1e");

// (label, base asset, quote asset). Capital is held in the base asset.
pub const PAIRS: &[(&str, Address, Address)] = &[
    ("USDC/WETH", USDC_BASE, WETH_BASE),
    ("USDbC/WETH", USDBC_BASE, WETH_BASE),
];

pub fn pair_by_label(label: &str) -> Option<(&'static str, Address, Address)> {
    PAIRS.iter().copied().find(|(name, _, _)| name.eq_ignore_ascii_case(label))
}
