/// Mathematical utilities for the collateral rebalancer
///
/// This crate provides overflow-checked arithmetic and WAD fixed-point
/// helpers used by the ratio engine, the keeper and the simulation host.

pub mod safe;
pub mod wad;

// Re-export commonly used functions
pub use safe::*;
pub use wad::*;
