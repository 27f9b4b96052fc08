/// Lending market view types

use serde::{Deserialize, Serialize};

use crate::constants::MAX_BPS;

/// Read-only limits imposed by the lending market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConstraints {
    /// Minimum collateralization ratio before liquidation (WAD)
    pub liquidation_ratio: u128,

    /// Smallest non-zero debt a position may carry
    pub debt_floor: u128,

    /// Aggregate debt cap across the whole market
    pub debt_ceiling: u128,

    /// Aggregate debt currently outstanding in the market
    pub total_market_debt: u128,

    /// Fee charged on top of every borrow, in bps
    pub borrow_opening_fee_bps: u128,
}

impl MarketConstraints {
    /// Debt that can still be minted before hitting the ceiling
    pub fn headroom(&self) -> u128 {
        self.debt_ceiling.saturating_sub(self.total_market_debt)
    }

    /// Debt is dust when positive but under the floor
    pub fn is_dust(&self, debt: u128) -> bool {
        debt > 0 && debt < self.debt_floor
    }

    /// Debt added by borrowing `amount`, fee included, rounded up
    pub fn debt_increase_for_borrow(&self, amount: u128) -> Option<u128> {
        let numerator = amount.checked_mul(MAX_BPS.checked_add(self.borrow_opening_fee_bps)?)?;
        Some(numerator.div_ceil(MAX_BPS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> MarketConstraints {
        MarketConstraints {
            liquidation_ratio: 1_450_000_000_000_000_000,
            debt_floor: 5_000,
            debt_ceiling: 1_000_000,
            total_market_debt: 990_000,
            borrow_opening_fee_bps: 50,
        }
    }

    #[test]
    fn test_headroom_saturates() {
        let mut c = constraints();
        assert_eq!(c.headroom(), 10_000);
        c.total_market_debt = 2_000_000;
        assert_eq!(c.headroom(), 0);
    }

    #[test]
    fn test_dust_detection() {
        let c = constraints();
        assert!(!c.is_dust(0));
        assert!(c.is_dust(4_999));
        assert!(!c.is_dust(5_000));
    }

    #[test]
    fn test_opening_fee_rounds_up() {
        let c = constraints();
        assert_eq!(c.debt_increase_for_borrow(10_000), Some(10_050));
        assert_eq!(c.debt_increase_for_borrow(1), Some(2));
        assert_eq!(c.debt_increase_for_borrow(0), Some(0));
    }
}
