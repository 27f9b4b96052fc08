//! # Collateral Rebalancer
//!
//! A strategy controller that borrows a debt token against deposited
//! collateral, invests the proceeds in a yield vault and keeps the
//! position at a target collateralization ratio. It provides:
//!
//! - The ratio engine and the pure rebalance decision (`engine`)
//! - Trigger predicates consumed by an external keeper (`triggers`)
//! - The collaborator traits the strategy drives (`host`)
//! - The `Strategy` entry points: harvest, tend, withdraw, emergency
//!   repayment, emergency exit, sweep and migration
//!
//! All collaborators are reached through [`host::Host`]; the crate holds
//! no ledger of its own.

pub mod engine;
pub mod host;
pub mod strategy;
pub mod triggers;

// Re-export commonly used items
pub use engine::{decide, Action, Decision, HoldReason, PositionSnapshot, PositionState};
pub use host::Host;
pub use strategy::{Strategy, StrategyConfig};
pub use triggers::{tend_trigger, HarvestInputs};

pub use rebalancer_types::{RebalancerError, RebalancerResult};
