//! Fixed-point helpers for 256-bit amounts

use alloy::primitives::U256;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::str::FromStr;
use crate::errors::{ArbError, ArbResult};

/// Scaling factor for unit prices (1e18).
pub const PRECISION: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);
pub const BPS_DENOMINATOR: u64 = 10_000;
/// Decimals assumed when rendering raw amounts.
pub const DISPLAY_DECIMALS: i32 = 18;

pub fn pow10(n: i32) -> Decimal {
    match n {
        0 => dec!(1),
        6 => dec!(1_000_000),
        18 => dec!(1_000_000_000_000_000_000),
        _ => {
            let mut result = dec!(1);
            if n > 0 {
                for _ in 0..n {
                    result *= dec!(10);
                }
            } else {
                for _ in 0..(-n) {
                    result /= dec!(10);
                }
            }
            result
        }
    }
}

/// `a * b / denominator`, rounding down. Overflow or a zero denominator is an error.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> ArbResult<U256> {
    if denominator.is_zero() {
        return Err(ArbError::execution_failed("division by zero"));
    }
    a.checked_mul(b)
        .map(|product| product / denominator)
        .ok_or_else(|| ArbError::execution_failed(format!("overflow computing {a} * {b}")))
}

/// `amount * bps / 10000`, rounding down.
pub fn apply_bps(amount: U256, bps: u32) -> ArbResult<U256> {
    mul_div(amount, U256::from(bps), U256::from(BPS_DENOMINATOR))
}

/// Amount left after shaving off `bps` basis points.
pub fn less_bps(amount: U256, bps: u32) -> ArbResult<U256> {
    let bps = bps.min(BPS_DENOMINATOR as u32);
    mul_div(amount, U256::from(BPS_DENOMINATOR - bps as u64), U256::from(BPS_DENOMINATOR))
}

/// Converts whole units into a raw 18-decimal amount.
pub fn units(whole: u64) -> U256 {
    U256::from(whole) * PRECISION
}

/// Saturating conversion of a bps figure held in a U256.
pub fn bps_to_u32(bps: U256) -> u32 {
    u32::try_from(bps).unwrap_or(u32::MAX)
}

/// Renders a raw amount as a decimal number of whole units.
pub fn to_decimal(amount: U256) -> Decimal {
    Decimal::from_str(&amount.to_string())
        .map(|d| d / pow10(DISPLAY_DECIMALS))
        .unwrap_or(Decimal::MAX)
}

/// Scales a decimal (e.g. an exchange price) into an 18-decimal raw amount.
pub fn from_decimal(value: Decimal) -> Option<U256> {
    if value.is_sign_negative() {
        return None;
    }
    let scaled = value.checked_mul(pow10(DISPLAY_DECIMALS))?.trunc();
    U256::from_str(&scaled.to_string()).ok()
}
