//! Rebalance decision
//!
//! A pure function from a [`PositionSnapshot`] and the strategy parameters
//! to the action a rebalance pass should take. Nothing here touches the
//! host; the strategy builds the snapshot, calls [`decide`] and executes
//! the returned [`Action`].

use rebalancer_types::{MarketConstraints, RebalancerResult, StrategyParams};

use super::debt::{plan_mint, plan_repay, MintPlan, RepayPlan};
use super::ratio::{current_ratio, target_debt};

/// Everything the decision needs, read once at the start of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSnapshot {
    /// Raw want locked as collateral
    pub collateral: u128,
    /// Raw debt-token debt, fees included
    pub debt: u128,
    /// Collateral value in debt-token units
    pub collateral_value: u128,
    /// Idle debt token plus the value of yield-vault shares
    pub repay_capacity: u128,
    pub constraints: MarketConstraints,
    pub base_fee: u128,
}

impl PositionSnapshot {
    pub fn ratio(&self) -> RebalancerResult<u128> {
        current_ratio(self.collateral_value, self.debt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    NoPosition,
    AtTarget,
    UnderCollateralized,
    OverCollateralized,
}

/// Why a pass left the position unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    WithinBand,
    NoCollateral,
    /// Mint deferred until the base fee drops
    BaseFeeTooHigh,
    DebtCeilingReached,
    BelowDebtFloor,
    /// Debt sits under the floor and cannot be cleared
    DustDebt,
    NoRepayCapacity,
    EmergencyExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Mint(MintPlan),
    Repay(RepayPlan),
    Hold(HoldReason),
}

impl Action {
    pub fn is_hold(&self) -> bool {
        matches!(self, Action::Hold(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub state: PositionState,
    pub current_ratio: u128,
    pub action: Action,
}

/// Classify a position against the tolerance band
pub fn classify(snapshot: &PositionSnapshot, params: &StrategyParams) -> RebalancerResult<PositionState> {
    if snapshot.debt == 0 {
        return Ok(PositionState::NoPosition);
    }

    let ratio = snapshot.ratio()?;
    Ok(if ratio < params.lower_band() {
        PositionState::UnderCollateralized
    } else if ratio > params.upper_band() {
        PositionState::OverCollateralized
    } else {
        PositionState::AtTarget
    })
}

/// Decide what a rebalance pass should do
pub fn decide(
    snapshot: &PositionSnapshot,
    params: &StrategyParams,
    emergency_exit: bool,
) -> RebalancerResult<Decision> {
    let state = classify(snapshot, params)?;
    let current_ratio = snapshot.ratio()?;

    let action = match state {
        PositionState::AtTarget => Action::Hold(HoldReason::WithinBand),
        PositionState::NoPosition if snapshot.collateral == 0 => Action::Hold(HoldReason::NoCollateral),
        PositionState::NoPosition | PositionState::OverCollateralized => {
            mint_action(snapshot, params, emergency_exit)?
        }
        // Repayment is essential and ignores the base-fee gate
        PositionState::UnderCollateralized => {
            let target = target_debt(snapshot.collateral_value, params.target_collateral_ratio)?;
            plan_repay(
                snapshot.debt,
                target,
                snapshot.constraints.debt_floor,
                snapshot.repay_capacity,
            )
        }
    };

    Ok(Decision {
        state,
        current_ratio,
        action,
    })
}

fn mint_action(
    snapshot: &PositionSnapshot,
    params: &StrategyParams,
    emergency_exit: bool,
) -> RebalancerResult<Action> {
    if emergency_exit {
        return Ok(Action::Hold(HoldReason::EmergencyExit));
    }

    if snapshot.base_fee > params.max_acceptable_base_fee {
        return Ok(Action::Hold(HoldReason::BaseFeeTooHigh));
    }

    let target = target_debt(snapshot.collateral_value, params.target_collateral_ratio)?;
    let action = plan_mint(snapshot.debt, target, &snapshot.constraints)?;

    // An existing dust position that still cannot reach the floor stays put
    if action == Action::Hold(HoldReason::BelowDebtFloor) && snapshot.constraints.is_dust(snapshot.debt) {
        return Ok(Action::Hold(HoldReason::DustDebt));
    }

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rebalancer_types::{GWEI, WAD};

    fn constraints() -> MarketConstraints {
        MarketConstraints {
            liquidation_ratio: 1_450_000_000_000_000_000,
            debt_floor: 5_000 * WAD,
            debt_ceiling: 1_000_000_000 * WAD,
            total_market_debt: 0,
            borrow_opening_fee_bps: 0,
        }
    }

    fn snapshot(collateral_value: u128, debt: u128) -> PositionSnapshot {
        PositionSnapshot {
            collateral: collateral_value,
            debt,
            collateral_value,
            repay_capacity: debt,
            constraints: constraints(),
            base_fee: 10 * GWEI,
        }
    }

    #[test]
    fn test_classification() {
        let params = StrategyParams::default();
        assert_eq!(classify(&snapshot(100_000 * WAD, 0), &params).unwrap(), PositionState::NoPosition);
        assert_eq!(classify(&snapshot(163_000 * WAD, 100_000 * WAD), &params).unwrap(), PositionState::AtTarget);
        assert_eq!(
            classify(&snapshot(150_000 * WAD, 100_000 * WAD), &params).unwrap(),
            PositionState::UnderCollateralized
        );
        assert_eq!(
            classify(&snapshot(200_000 * WAD, 100_000 * WAD), &params).unwrap(),
            PositionState::OverCollateralized
        );
    }

    #[test]
    fn test_over_collateralized_mints_to_target() {
        let params = StrategyParams::default();
        let decision = decide(&snapshot(163_000 * WAD, 50_000 * WAD), &params, false).unwrap();
        assert_eq!(decision.state, PositionState::OverCollateralized);
        let Action::Mint(plan) = decision.action else {
            panic!("expected mint, got {:?}", decision.action);
        };
        assert_eq!(plan.debt_increase, 50_000 * WAD);
    }

    #[test]
    fn test_base_fee_gate_only_blocks_mints() {
        let mut params = StrategyParams::default();
        params.max_acceptable_base_fee = GWEI;

        let over = decide(&snapshot(200_000 * WAD, 100_000 * WAD), &params, false).unwrap();
        assert_eq!(over.action, Action::Hold(HoldReason::BaseFeeTooHigh));

        let under = decide(&snapshot(150_000 * WAD, 100_000 * WAD), &params, false).unwrap();
        assert!(matches!(under.action, Action::Repay(_)));
    }

    #[test]
    fn test_emergency_exit_blocks_minting() {
        let params = StrategyParams::default();
        let decision = decide(&snapshot(200_000 * WAD, 100_000 * WAD), &params, true).unwrap();
        assert_eq!(decision.action, Action::Hold(HoldReason::EmergencyExit));
    }

    #[test]
    fn test_fresh_collateral_opens_position_above_floor_only() {
        let params = StrategyParams::default();
        let decision = decide(&snapshot(16_300 * WAD, 0), &params, false).unwrap();
        assert!(matches!(decision.action, Action::Mint(_)));

        // target debt just under the floor
        let small = 5_000 * WAD * 163 / 100 - 10 * WAD;
        let decision = decide(&snapshot(small, 0), &params, false).unwrap();
        assert_eq!(decision.action, Action::Hold(HoldReason::BelowDebtFloor));

        let decision = decide(&snapshot(0, 0), &params, false).unwrap();
        assert_eq!(decision.action, Action::Hold(HoldReason::NoCollateral));
    }
}
