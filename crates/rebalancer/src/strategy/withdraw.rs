use log::{info, warn};

use rebalancer_types::{
    AccountId, MigrationReceipt, Operation, RebalancerError, RebalancerResult, WithdrawalOutcome,
};

use crate::engine;
use crate::host::Host;

use super::Strategy;

impl<H: Host> Strategy<H> {
    /// Free `amount` want and send it to the outer vault.
    ///
    /// Debt is repaid alongside the collateral so the remaining position
    /// sits at the target ratio. Losses are never recognised here; they
    /// surface on the next harvest.
    pub fn withdraw(&mut self, caller: &AccountId, amount: u128) -> RebalancerResult<WithdrawalOutcome> {
        self.authorize(caller, Operation::Withdraw)?;
        self.atomically(|s| {
            let strict = !s.config.params.leave_debt_behind;
            let debt_repaid = s.liquidate_position(amount, strict)?;

            let liquidated = amount.min(s.balance_of_want());
            if liquidated > 0 {
                let want = s.config.want_token.clone();
                let vault = s.config.roles.vault.clone();
                s.host.transfer(&want, &vault, liquidated)?;
            }

            info!(
                "{}: withdrew {} of {} requested, repaid {} debt",
                s.config.name, liquidated, amount, debt_repaid
            );
            Ok(WithdrawalOutcome {
                liquidated,
                loss: 0,
                debt_repaid,
            })
        })
    }

    /// Hand every asset to `successor`, unwinding as far as funds allow
    pub fn migrate(&mut self, caller: &AccountId, successor: &AccountId) -> RebalancerResult<MigrationReceipt> {
        self.authorize(caller, Operation::Migrate)?;
        self.atomically(|s| {
            s.unwind_position()?;

            let want_transferred = s.balance_of_want();
            let debt_token_transferred = s.balance_of_debt_token();
            let vault_shares_transferred = s.host.share_balance();

            let transfers = [
                (s.config.want_token.clone(), want_transferred),
                (s.config.debt_token.clone(), debt_token_transferred),
                (s.config.yield_vault_token.clone(), vault_shares_transferred),
            ];
            for (token, amount) in transfers.iter() {
                if *amount > 0 {
                    s.host.transfer(token, successor, *amount)?;
                }
            }

            let receipt = MigrationReceipt {
                want_transferred,
                debt_token_transferred,
                vault_shares_transferred,
                residual_collateral: s.host.current_collateral(),
                residual_debt: s.host.current_debt(),
            };

            if receipt.is_clean() {
                info!("{}: migrated to {}", s.config.name, successor);
            } else {
                warn!(
                    "{}: migrated to {} leaving {} collateral and {} debt behind",
                    s.config.name, successor, receipt.residual_collateral, receipt.residual_debt
                );
            }
            Ok(receipt)
        })
    }

    /// Make `amount` want idle by withdrawing collateral and repaying debt in
    /// proportion. Returns the debt repaid.
    ///
    /// With `strict`, a repayment the strategy cannot fund fails with
    /// `InsufficientLiquidity`; otherwise debt is left behind and only the
    /// collateral it does not need is released.
    pub(crate) fn liquidate_position(&mut self, amount: u128, strict: bool) -> RebalancerResult<u128> {
        let idle = self.balance_of_want();
        if idle >= amount {
            return Ok(0);
        }

        let collateral = self.host.current_collateral();
        let to_withdraw = (amount - idle).min(collateral);
        if to_withdraw == 0 {
            return Ok(0);
        }

        let debt = self.host.current_debt();
        if debt == 0 {
            self.host.withdraw_collateral(to_withdraw)?;
            return Ok(0);
        }

        let price = self.host.collateral_price()?;
        let remaining_value =
            engine::collateral_value(collateral - to_withdraw, price, self.config.want_decimals)?;
        let target = engine::target_debt(remaining_value, self.config.params.target_collateral_ratio)?;
        let floor = self.host.constraints().debt_floor;
        let required = engine::floor_adjusted_repay(debt, debt.saturating_sub(target), floor);
        let capacity = self.repay_capacity()?;

        if required <= capacity {
            self.repay(required)?;
            self.host.withdraw_collateral(to_withdraw)?;
            return Ok(required);
        }

        if strict {
            return Err(RebalancerError::insufficient_liquidity(required, capacity));
        }

        let repaid = engine::best_effort_repay(debt, floor, capacity);
        self.repay(repaid)?;
        let withdrawn = self.withdraw_free_collateral(to_withdraw)?;
        warn!(
            "{}: left {} debt behind, freed {} of {} collateral",
            self.config.name,
            self.host.current_debt(),
            withdrawn,
            to_withdraw
        );
        Ok(repaid)
    }
}
