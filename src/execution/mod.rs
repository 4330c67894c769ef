//! Atomic arbitrage execution

pub mod capital;
pub mod engine;

pub use capital::*;
pub use engine::*;
