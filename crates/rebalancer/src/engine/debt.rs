/// Debt sizing under the market's floor, ceiling and opening fee
///
/// Floor binarity: no plan produced here leaves debt in `(0, debt_floor)`.

use rebalancer_math::mul_div_down;
use rebalancer_types::{MarketConstraints, RebalancerError, RebalancerResult, MAX_BPS};

use super::decision::{Action, HoldReason};

/// Borrow sized so that debt grows by `debt_increase` (fee included)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintPlan {
    /// Amount requested from the market (debt token received)
    pub borrow: u128,
    /// Debt added by the borrow, opening fee included
    pub debt_increase: u128,
    /// The ceiling headroom, not the target, bounded the increase
    pub ceiling_limited: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepayPlan {
    pub amount: u128,
    /// Repays the position's entire debt
    pub full: bool,
}

// ============================================================================
// Mint Sizing
// ============================================================================

/// Plan a mint that moves `debt` toward `target_debt`
pub fn plan_mint(debt: u128, target_debt: u128, constraints: &MarketConstraints) -> RebalancerResult<Action> {
    if target_debt <= debt {
        return Ok(Action::Hold(HoldReason::WithinBand));
    }

    let headroom = constraints.headroom();
    if headroom == 0 {
        return Ok(Action::Hold(HoldReason::DebtCeilingReached));
    }

    let desired = target_debt - debt;
    let ceiling_limited = desired > headroom;
    let increase = desired.min(headroom);

    let fee_scale = MAX_BPS
        .checked_add(constraints.borrow_opening_fee_bps)
        .ok_or_else(|| RebalancerError::math_overflow("opening fee scale"))?;
    let borrow = mul_div_down(increase, MAX_BPS, fee_scale)?;

    if borrow == 0 {
        let reason = if ceiling_limited {
            HoldReason::DebtCeilingReached
        } else {
            HoldReason::WithinBand
        };
        return Ok(Action::Hold(reason));
    }

    let debt_increase = constraints
        .debt_increase_for_borrow(borrow)
        .ok_or_else(|| RebalancerError::math_overflow("debt increase for borrow"))?;

    if debt.saturating_add(debt_increase) < constraints.debt_floor {
        return Ok(Action::Hold(HoldReason::BelowDebtFloor));
    }

    Ok(Action::Mint(MintPlan {
        borrow,
        debt_increase,
        ceiling_limited,
    }))
}

// ============================================================================
// Repay Sizing
// ============================================================================

/// Repayment of `desired` widened to the full debt when the residual would be dust
pub fn floor_adjusted_repay(debt: u128, desired: u128, debt_floor: u128) -> u128 {
    let desired = desired.min(debt);
    let residual = debt - desired;
    if residual > 0 && residual < debt_floor {
        debt
    } else {
        desired
    }
}

/// Largest repayment `capacity` allows without leaving dust
pub fn best_effort_repay(debt: u128, debt_floor: u128, capacity: u128) -> u128 {
    if capacity >= debt {
        debt
    } else {
        capacity.min(debt.saturating_sub(debt_floor))
    }
}

/// Plan a rebalance repayment toward `target_debt`, capped at `capacity`
pub fn plan_repay(debt: u128, target_debt: u128, debt_floor: u128, capacity: u128) -> Action {
    let desired = debt.saturating_sub(target_debt);
    if desired == 0 {
        return Action::Hold(HoldReason::WithinBand);
    }

    let amount = floor_adjusted_repay(debt, desired, debt_floor);
    if amount <= capacity {
        return Action::Repay(RepayPlan {
            amount,
            full: amount == debt,
        });
    }

    let capped = capacity.min(debt.saturating_sub(debt_floor));
    if capped == 0 {
        let reason = if debt <= debt_floor {
            HoldReason::DustDebt
        } else {
            HoldReason::NoRepayCapacity
        };
        return Action::Hold(reason);
    }

    Action::Repay(RepayPlan {
        amount: capped,
        full: false,
    })
}
