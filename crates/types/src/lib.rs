/// Shared types for the collateral rebalancer
///
/// This crate provides the constants, error taxonomy, parameter and
/// market types used by the strategy, the keeper and the simulation host.

pub mod constants;
pub mod errors;
pub mod market;
pub mod params;
pub mod report;
pub mod roles;

// Re-export all public types
pub use constants::*;
pub use errors::*;
pub use market::*;
pub use params::*;
pub use report::*;
pub use roles::*;

/// Result type alias using the shared error type
pub type RebalancerResult<T> = std::result::Result<T, RebalancerError>;
