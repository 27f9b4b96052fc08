use log::{info, warn};

use rebalancer_types::{
    AccountId, Operation, RebalancerError, RebalancerResult, StrategyParams, TokenId,
};

use crate::engine;
use crate::host::Host;

use super::Strategy;

impl<H: Host> Strategy<H> {
    /// Replace the strategy parameters. Invalid params leave the old ones in place.
    pub fn update_strategy_params(&mut self, caller: &AccountId, params: StrategyParams) -> RebalancerResult<()> {
        self.authorize(caller, Operation::UpdateParams)?;
        self.atomically(|s| {
            params.validate(s.host.constraints().liquidation_ratio)?;
            s.config.params = params;
            info!(
                "{}: params updated (target {}, tolerance {}, max base fee {}, leave debt behind {}, max loss {} bps)",
                s.config.name,
                params.target_collateral_ratio,
                params.rebalance_tolerance,
                params.max_acceptable_base_fee,
                params.leave_debt_behind,
                params.max_loss_bps
            );
            Ok(())
        })
    }

    /// Scale debt down to `debt * ratio / target`. A zero ratio repays
    /// everything; a ratio at or above target changes nothing. Collateral is
    /// never touched and nothing is minted. Returns the debt repaid.
    pub fn emergency_debt_repayment(&mut self, caller: &AccountId, ratio: u128) -> RebalancerResult<u128> {
        self.authorize(caller, Operation::EmergencyDebtRepayment)?;
        self.atomically(|s| {
            let debt = s.host.current_debt();
            let target = s.config.params.target_collateral_ratio;
            if debt == 0 || ratio >= target {
                info!("{}: emergency repayment to ratio {} is a no-op", s.config.name, ratio);
                return Ok(0);
            }

            let new_debt = engine::scaled_debt(debt, ratio, target)?;
            let floor = s.host.constraints().debt_floor;
            let amount = engine::floor_adjusted_repay(debt, debt - new_debt, floor);
            s.repay(amount)?;

            warn!(
                "{}: emergency repayment of {} (debt {} -> {})",
                s.config.name,
                amount,
                debt,
                s.host.current_debt()
            );
            Ok(amount)
        })
    }

    /// Repay up to `amount` debt from idle debt token only. Returns the debt repaid.
    pub fn repay_debt_with_idle_balance(&mut self, caller: &AccountId, amount: u128) -> RebalancerResult<u128> {
        self.authorize(caller, Operation::RepayWithIdleBalance)?;
        self.atomically(|s| {
            let idle = s.balance_of_debt_token();
            let debt = s.host.current_debt();
            let floor = s.host.constraints().debt_floor;

            let desired = amount.min(idle).min(debt);
            let mut repay = engine::floor_adjusted_repay(debt, desired, floor);
            if repay > idle {
                repay = desired.min(debt.saturating_sub(floor));
            }

            s.repay(repay)?;
            Ok(repay)
        })
    }

    /// One-way switch: revoke the strategy in the outer vault and stop minting
    pub fn set_emergency_exit(&mut self, caller: &AccountId) -> RebalancerResult<()> {
        self.authorize(caller, Operation::SetEmergencyExit)?;
        self.atomically(|s| {
            if s.emergency_exit {
                return Ok(());
            }
            s.emergency_exit = true;
            s.host.revoke_strategy()?;
            warn!("{}: emergency exit enabled by {}", s.config.name, caller);
            Ok(())
        })
    }

    /// Send the full balance of an unprotected token to governance
    pub fn sweep(&mut self, caller: &AccountId, token: &TokenId) -> RebalancerResult<u128> {
        self.authorize(caller, Operation::Sweep)?;
        if self.config.protected_tokens().contains(&token) {
            return Err(RebalancerError::ProtectedAsset {
                token: token.to_string(),
            });
        }

        self.atomically(|s| {
            let amount = s.host.balance_of(token);
            if amount > 0 {
                let governance = s.config.roles.governance.clone();
                s.host.transfer(token, &governance, amount)?;
            }
            info!("{}: swept {} {}", s.config.name, amount, token);
            Ok(amount)
        })
    }
}
