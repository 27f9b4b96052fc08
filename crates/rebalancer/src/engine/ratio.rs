/// Ratio engine: collateral valuation and target-debt arithmetic

use rebalancer_math::{mul_div_down, mul_div_up, pow10};
use rebalancer_types::{RebalancerError, RebalancerResult, WAD};

// ============================================================================
// Valuation
// ============================================================================

/// Value of `collateral` raw want units in raw debt-token units
pub fn collateral_value(collateral: u128, price: u128, want_decimals: u8) -> RebalancerResult<u128> {
    mul_div_down(collateral, price, pow10(want_decimals)?)
}

/// Convert a debt-token amount into want at the oracle price
pub fn debt_to_want(amount: u128, price: u128, want_decimals: u8) -> RebalancerResult<u128> {
    if price == 0 {
        return Err(RebalancerError::division_by_zero("debt_to_want: zero collateral price"));
    }
    mul_div_down(amount, pow10(want_decimals)?, price)
}

// ============================================================================
// Ratio
// ============================================================================

/// collateral value / debt, WAD scaled; zero when there is no debt
pub fn current_ratio(collateral_value: u128, debt: u128) -> RebalancerResult<u128> {
    if debt == 0 {
        return Ok(0);
    }
    mul_div_down(collateral_value, WAD, debt)
}

/// |current - target| <= tolerance
pub fn within_tolerance_band(current: u128, target: u128, tolerance: u128) -> bool {
    current.abs_diff(target) <= tolerance
}

/// Debt that puts `collateral_value` exactly at `target_ratio`
pub fn target_debt(collateral_value: u128, target_ratio: u128) -> RebalancerResult<u128> {
    if target_ratio == 0 {
        return Err(RebalancerError::division_by_zero("target_debt: zero target ratio"));
    }
    mul_div_down(collateral_value, WAD, target_ratio)
}

/// Collateral (raw want) needed to carry `debt` at `ratio`, rounded up
pub fn collateral_for_debt(
    debt: u128,
    ratio: u128,
    price: u128,
    want_decimals: u8,
) -> RebalancerResult<u128> {
    if price == 0 {
        return Err(RebalancerError::division_by_zero("collateral_for_debt: zero collateral price"));
    }
    let value = mul_div_up(debt, ratio, WAD)?;
    mul_div_up(value, pow10(want_decimals)?, price)
}

// ============================================================================
// Debt Delta
// ============================================================================

/// Direction and size of the debt change needed to reach the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtDelta {
    Mint(u128),
    Repay(u128),
    Unchanged,
}

impl DebtDelta {
    /// Signed form: positive mints, negative repays. Saturates at the i128 range.
    pub fn as_signed(&self) -> i128 {
        match *self {
            DebtDelta::Mint(amount) => i128::try_from(amount).unwrap_or(i128::MAX),
            DebtDelta::Repay(amount) => i128::try_from(amount).map(|a| -a).unwrap_or(i128::MIN),
            DebtDelta::Unchanged => 0,
        }
    }
}

/// Debt change that moves the position to `target_ratio`
pub fn debt_delta(collateral_value: u128, debt: u128, target_ratio: u128) -> RebalancerResult<DebtDelta> {
    let target = target_debt(collateral_value, target_ratio)?;
    Ok(match target.cmp(&debt) {
        std::cmp::Ordering::Greater => DebtDelta::Mint(target - debt),
        std::cmp::Ordering::Less => DebtDelta::Repay(debt - target),
        std::cmp::Ordering::Equal => DebtDelta::Unchanged,
    })
}

/// Debt scaled by `ratio / target`, as used by emergency repayment
pub fn scaled_debt(debt: u128, ratio: u128, target_ratio: u128) -> RebalancerResult<u128> {
    let scaled = mul_div_down(debt, ratio, target_ratio.max(1))?;
    Ok(scaled.min(debt))
}

/// Debt-token value of `shares` at a WAD price per share
pub fn shares_value(shares: u128, price_per_share: u128) -> RebalancerResult<u128> {
    mul_div_down(shares, price_per_share, WAD)
}

/// Shares to redeem for `amount` debt token, rounded up
pub fn shares_for_amount(amount: u128, price_per_share: u128) -> RebalancerResult<u128> {
    if price_per_share == 0 {
        return Err(RebalancerError::division_by_zero("shares_for_amount: zero price per share"));
    }
    mul_div_up(amount, WAD, price_per_share)
}
