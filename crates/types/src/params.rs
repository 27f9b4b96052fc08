use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::errors::ConstraintViolation;

/// Tunable strategy parameters. All ratios are WAD scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Collateralization ratio the rebalancer converges to
    pub target_collateral_ratio: u128,

    /// Absolute band around the target inside which no rebalance happens
    pub rebalance_tolerance: u128,

    /// Base fee (wei) above which mints are deferred; repayments ignore it
    pub max_acceptable_base_fee: u128,

    /// Allow withdrawals to leave debt behind when repayment funds run short
    pub leave_debt_behind: bool,

    /// Maximum loss accepted on yield-vault redemption, in bps
    pub max_loss_bps: u128,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            target_collateral_ratio: DEFAULT_TARGET_COLLATERAL_RATIO,
            rebalance_tolerance: DEFAULT_REBALANCE_TOLERANCE,
            max_acceptable_base_fee: DEFAULT_MAX_ACCEPTABLE_BASE_FEE,
            leave_debt_behind: false,
            max_loss_bps: DEFAULT_MAX_LOSS_BPS,
        }
    }
}

impl StrategyParams {
    /// Check the params against the market liquidation ratio
    pub fn validate(&self, liquidation_ratio: u128) -> Result<(), ConstraintViolation> {
        let target = self.target_collateral_ratio;
        let tolerance = self.rebalance_tolerance;

        if tolerance >= target {
            return Err(ConstraintViolation::ToleranceExceedsTarget { target, tolerance });
        }

        if target - tolerance < liquidation_ratio {
            return Err(ConstraintViolation::RatioBelowLiquidation {
                target,
                tolerance,
                liquidation_ratio,
            });
        }

        if self.max_loss_bps > MAX_BPS {
            return Err(ConstraintViolation::MaxLossTooHigh {
                max_loss_bps: self.max_loss_bps,
            });
        }

        Ok(())
    }

    /// Lower edge of the tolerance band
    pub fn lower_band(&self) -> u128 {
        self.target_collateral_ratio.saturating_sub(self.rebalance_tolerance)
    }

    /// Upper edge of the tolerance band
    pub fn upper_band(&self) -> u128 {
        self.target_collateral_ratio.saturating_add(self.rebalance_tolerance)
    }

    pub fn with_collateralization_ratio(mut self, target: u128, tolerance: u128) -> Self {
        self.target_collateral_ratio = target;
        self.rebalance_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LIQUIDATION_RATIO: u128 = 1_450_000_000_000_000_000;

    #[test]
    fn test_default_params_are_valid() {
        let params = StrategyParams::default();
        assert!(params.validate(LIQUIDATION_RATIO).is_ok());
        assert_eq!(params.lower_band(), 1_620_000_000_000_000_000);
        assert_eq!(params.upper_band(), 1_640_000_000_000_000_000);
    }

    #[test]
    fn test_band_edge_at_liquidation_ratio_is_allowed() {
        let params = StrategyParams::default()
            .with_collateralization_ratio(LIQUIDATION_RATIO + WAD / 100, WAD / 100);
        assert!(params.validate(LIQUIDATION_RATIO).is_ok());

        let params = params.with_collateralization_ratio(LIQUIDATION_RATIO + WAD / 100 - 1, WAD / 100);
        assert!(matches!(
            params.validate(LIQUIDATION_RATIO),
            Err(ConstraintViolation::RatioBelowLiquidation { .. })
        ));
    }

    #[test]
    fn test_max_loss_bounds() {
        let mut params = StrategyParams::default();
        params.max_loss_bps = MAX_BPS;
        assert!(params.validate(LIQUIDATION_RATIO).is_ok());
        params.max_loss_bps = MAX_BPS + 1;
        assert_eq!(
            params.validate(LIQUIDATION_RATIO),
            Err(ConstraintViolation::MaxLossTooHigh { max_loss_bps: MAX_BPS + 1 })
        );
    }

    #[test]
    fn test_params_from_partial_toml() {
        let params: StrategyParams = toml::from_str(
            r#"
            target_collateral_ratio = 2000000000000000000
            leave_debt_behind = true
            "#,
        )
        .unwrap();
        assert_eq!(params.target_collateral_ratio, 2 * WAD);
        assert!(params.leave_debt_behind);
        assert_eq!(params.rebalance_tolerance, DEFAULT_REBALANCE_TOLERANCE);
    }

    proptest! {
        #[test]
        fn prop_validation_matches_band_rule(
            target in WAD..5 * WAD,
            tolerance in 0u128..WAD,
        ) {
            let params = StrategyParams::default().with_collateralization_ratio(target, tolerance);
            let ok = params.validate(LIQUIDATION_RATIO).is_ok();
            prop_assert_eq!(ok, tolerance < target && target - tolerance >= LIQUIDATION_RATIO);
        }
    }
}
