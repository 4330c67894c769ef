//! Capital & strategy management

pub mod provider;
pub mod strategy_manager;

pub use provider::*;
pub use strategy_manager::*;
