//! Pure rebalancing logic: ratio arithmetic, debt sizing and the decision
//! function. No host access.

pub mod debt;
pub mod decision;
pub mod ratio;

pub use debt::{best_effort_repay, floor_adjusted_repay, plan_mint, plan_repay, MintPlan, RepayPlan};
pub use decision::{classify, decide, Action, Decision, HoldReason, PositionSnapshot, PositionState};
pub use ratio::*;
