//! Core data types and structures

pub mod addresses;
pub mod opportunity;
pub mod execution;
pub mod strategy;
pub mod capital;
pub mod stats;
pub mod health;

pub use addresses::*;
pub use opportunity::*;
pub use execution::*;
pub use strategy::*;
pub use capital::*;
pub use stats::*;
pub use health::*;
