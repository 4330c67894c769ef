//! Error handling and recovery mechanisms

pub mod arb_error;
pub mod recovery;
pub mod circuit_breaker;

pub use arb_error::*;
pub use recovery::*;
pub use circuit_breaker::*;
