//! Outbound network helpers

pub mod retry;

pub use retry::*;
