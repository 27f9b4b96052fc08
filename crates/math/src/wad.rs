/// WAD fixed-point helpers
///
/// Products are taken in 256 bits so that `a * b / c` never overflows
/// before the division; only the final quotient must fit in a u128.

use rebalancer_types::{RebalancerError, RebalancerResult, MAX_BPS};
use ruint::aliases::U256;

/// Rounding modes for financial calculations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down, // Floor - round towards zero
    Up,   // Ceiling - round away from zero
}

// ============================================================================
// Conversions
// ============================================================================

#[inline]
fn to_u256(value: u128) -> U256 {
    U256::from_limbs([value as u64, (value >> 64) as u64, 0, 0])
}

#[inline]
fn to_u128(value: U256) -> Option<u128> {
    let limbs = value.as_limbs();
    if limbs[2] != 0 || limbs[3] != 0 {
        return None;
    }
    Some((limbs[0] as u128) | ((limbs[1] as u128) << 64))
}

// ============================================================================
// Multiply-Divide
// ============================================================================

/// `a * b / denominator` with the requested rounding
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> RebalancerResult<u128> {
    if denominator == 0 {
        return Err(RebalancerError::division_by_zero(&format!(
            "mul_div: {} * {} / 0",
            a, b
        )));
    }

    let product = to_u256(a) * to_u256(b);
    let (quotient, remainder) = product.div_rem(to_u256(denominator));

    let quotient = if rounding == Rounding::Up && !remainder.is_zero() {
        quotient
            .checked_add(U256::from_limbs([1, 0, 0, 0]))
            .ok_or_else(|| RebalancerError::math_overflow("mul_div rounding"))?
    } else {
        quotient
    };

    to_u128(quotient)
        .ok_or_else(|| RebalancerError::math_overflow(&format!("mul_div: {} * {} / {}", a, b, denominator)))
}

/// `a * b / denominator`, rounded down
pub fn mul_div_down(a: u128, b: u128, denominator: u128) -> RebalancerResult<u128> {
    mul_div(a, b, denominator, Rounding::Down)
}

/// `a * b / denominator`, rounded up
pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> RebalancerResult<u128> {
    mul_div(a, b, denominator, Rounding::Up)
}

// ============================================================================
// Basis Points
// ============================================================================

/// `amount` reduced by `bps`, rounded down
pub fn less_bps(amount: u128, bps: u128) -> RebalancerResult<u128> {
    let kept = MAX_BPS.saturating_sub(bps);
    mul_div_down(amount, kept, MAX_BPS)
}
