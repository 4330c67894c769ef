//! Opportunity detection and trade sizing

pub mod detector;
pub mod solver;

pub use detector::*;
pub use solver::*;
