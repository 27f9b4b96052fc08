/// Simulated lending market holding a single strategy position

use rebalancer_math::{mul_div_down, pow10};
use rebalancer_types::{AccountId, HostError, MarketConstraints, MAX_BPS, WAD};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimLendingMarket {
    pub account: AccountId,
    pub collateral: u128,
    pub debt: u128,
    pub liquidation_ratio: u128,
    pub debt_floor: u128,
    pub debt_ceiling: u128,
    /// Aggregate debt owed by everybody else
    pub other_debt: u128,
    pub borrow_opening_fee_bps: u128,
}

impl SimLendingMarket {
    pub fn new(liquidation_ratio: u128) -> Self {
        Self {
            account: AccountId::new("lending-market"),
            collateral: 0,
            debt: 0,
            liquidation_ratio,
            debt_floor: 0,
            debt_ceiling: u128::MAX / 2,
            other_debt: 0,
            borrow_opening_fee_bps: 0,
        }
    }

    pub fn constraints(&self) -> MarketConstraints {
        MarketConstraints {
            liquidation_ratio: self.liquidation_ratio,
            debt_floor: self.debt_floor,
            debt_ceiling: self.debt_ceiling,
            total_market_debt: self.other_debt.saturating_add(self.debt),
            borrow_opening_fee_bps: self.borrow_opening_fee_bps,
        }
    }

    /// Debt added by a borrow of `amount`, fee included
    pub fn debt_increase(&self, amount: u128) -> Result<u128, HostError> {
        self.constraints()
            .debt_increase_for_borrow(amount)
            .ok_or_else(|| HostError::Market("borrow amount overflow".into()))
    }

    /// Reject positions the market would not accept
    pub fn check_position(
        &self,
        collateral: u128,
        debt: u128,
        price: u128,
        want_decimals: u8,
    ) -> Result<(), HostError> {
        if debt == 0 {
            return Ok(());
        }
        if debt < self.debt_floor {
            return Err(HostError::Market(format!(
                "debt {} below floor {}",
                debt, self.debt_floor
            )));
        }

        let scale = pow10(want_decimals).map_err(|e| HostError::Market(e.to_string()))?;
        let value = mul_div_down(collateral, price, scale).map_err(|e| HostError::Market(e.to_string()))?;
        let ratio = mul_div_down(value, WAD, debt).map_err(|e| HostError::Market(e.to_string()))?;
        if ratio < self.liquidation_ratio {
            return Err(HostError::Market(format!(
                "ratio {} below liquidation ratio {}",
                ratio, self.liquidation_ratio
            )));
        }
        Ok(())
    }

    /// Grow the strategy's debt by `bps` of itself
    pub fn accrue_interest(&mut self, bps: u128) {
        let interest = self.debt.saturating_mul(bps) / MAX_BPS;
        self.debt = self.debt.saturating_add(interest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_checks() {
        let mut market = SimLendingMarket::new(1_500_000_000_000_000_000);
        market.debt_floor = 1_000;
        let price = 2_000 * WAD;

        // 1 want = 2000 debt of value
        assert!(market.check_position(WAD, 1_000 * WAD, price, 18).is_ok());
        assert!(market.check_position(WAD, 1_400 * WAD, price, 18).is_err());
        assert!(market.check_position(WAD, 999, price, 18).is_err());
        assert!(market.check_position(0, 0, price, 18).is_ok());
    }

    #[test]
    fn test_fee_and_interest() {
        let mut market = SimLendingMarket::new(WAD);
        market.borrow_opening_fee_bps = 50;
        assert_eq!(market.debt_increase(10_000).unwrap(), 10_050);

        market.debt = 10_000;
        market.accrue_interest(100);
        assert_eq!(market.debt, 10_100);
    }
}
