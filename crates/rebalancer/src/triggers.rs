/// Trigger predicates consumed by the keeper

use serde::{Deserialize, Serialize};

use crate::engine::{Action, Decision, HoldReason, PositionState};

/// True when the position needs a tend pass.
///
/// On the mint side this follows `decision.action`, which already folds in
/// the tolerance band, the base-fee gate and the ceiling. An
/// under-collateralized position always fires, even with nothing to repay
/// with, unless its debt is stuck under the floor.
pub fn tend_trigger(decision: &Decision) -> bool {
    match decision.state {
        PositionState::NoPosition => false,
        PositionState::UnderCollateralized => decision.action != Action::Hold(HoldReason::DustDebt),
        _ => matches!(decision.action, Action::Mint(_) | Action::Repay(_)),
    }
}

/// Inputs to the outer-vault harvest heuristic evaluated by the keeper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestInputs {
    pub estimated_total_assets: u128,
    /// Want lent by the outer vault
    pub total_debt: u128,
    pub debt_outstanding: u128,
    pub credit_available: u128,
    pub last_report: u64,
    pub now: u64,
    pub emergency_exit: bool,
}

impl HarvestInputs {
    pub fn seconds_since_report(&self) -> u64 {
        self.now.saturating_sub(self.last_report)
    }

    /// Unrealised profit against the vault's books
    pub fn profit(&self) -> u128 {
        self.estimated_total_assets.saturating_sub(self.total_debt)
    }

    pub fn has_loss(&self) -> bool {
        self.total_debt > self.estimated_total_assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MintPlan, RepayPlan};

    fn decision(state: PositionState, action: Action) -> Decision {
        Decision {
            state,
            current_ratio: 0,
            action,
        }
    }

    #[test]
    fn test_tend_trigger_requires_action_and_position() {
        let mint = Action::Mint(MintPlan { borrow: 1, debt_increase: 1, ceiling_limited: false });
        assert!(!tend_trigger(&decision(PositionState::NoPosition, mint)));
        assert!(tend_trigger(&decision(PositionState::OverCollateralized, mint)));
        assert!(tend_trigger(&decision(
            PositionState::UnderCollateralized,
            Action::Repay(RepayPlan { amount: 1, full: false })
        )));
        assert!(!tend_trigger(&decision(
            PositionState::OverCollateralized,
            Action::Hold(HoldReason::BaseFeeTooHigh)
        )));
        assert!(!tend_trigger(&decision(PositionState::AtTarget, Action::Hold(HoldReason::WithinBand))));
    }

    #[test]
    fn test_tend_trigger_fires_when_under_collateralized_without_capacity() {
        assert!(tend_trigger(&decision(
            PositionState::UnderCollateralized,
            Action::Hold(HoldReason::NoRepayCapacity)
        )));
        assert!(!tend_trigger(&decision(
            PositionState::UnderCollateralized,
            Action::Hold(HoldReason::DustDebt)
        )));
    }

    #[test]
    fn test_harvest_inputs_helpers() {
        let inputs = HarvestInputs {
            estimated_total_assets: 110,
            total_debt: 100,
            last_report: 50,
            now: 80,
            ..Default::default()
        };
        assert_eq!(inputs.profit(), 10);
        assert!(!inputs.has_loss());
        assert_eq!(inputs.seconds_since_report(), 30);
    }
}
