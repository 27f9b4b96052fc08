/// Checked decimal scaling
///
/// Returns errors instead of panicking.

use rebalancer_types::{RebalancerError, RebalancerResult};

// ============================================================================
// Decimal Scaling
// ============================================================================

/// 10^decimals as u128
pub fn pow10(decimals: u8) -> RebalancerResult<u128> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| RebalancerError::math_overflow(&format!("10^{}", decimals)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0).unwrap(), 1);
        assert_eq!(pow10(18).unwrap(), 1_000_000_000_000_000_000);
        assert!(pow10(38).is_ok());
        assert!(pow10(39).is_err());
    }
}
