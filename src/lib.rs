//! Cross-venue arbitrage engine
//!
//! Watches one asset pair on two liquidity venues (a maker-priced pool and a
//! pool that tracks an external reference price), sizes the trade that
//! maximizes round-trip profit, and executes buy-low/sell-high against
//! borrowed capital as a single all-or-nothing unit.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod venues;
pub mod arbitrage;
pub mod execution;
pub mod manager;
pub mod oracle;
pub mod utils;
pub mod storage;

// Re-export commonly used items
pub use config::{CONFIG, Config};
pub use errors::{ArbError, ArbResult};
pub use types::*;
