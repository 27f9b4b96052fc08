use log::{debug, info, warn};

use rebalancer_math::mul_div_up;
use rebalancer_types::{RebalancerError, RebalancerResult, MAX_BPS};

use crate::engine::{self, Action, Decision, HoldReason, MintPlan};
use crate::host::Host;

use super::Strategy;

impl<H: Host> Strategy<H> {
    /// Run one rebalance pass toward the target ratio.
    ///
    /// Plans are sized exactly, so a single pass either lands inside the
    /// band or stops at a market constraint.
    pub(crate) fn rebalance(&mut self) -> RebalancerResult<Decision> {
        let decision = self.evaluate()?;
        debug!(
            "{}: rebalance decision {:?} at ratio {} ({:?})",
            self.config.name, decision.action, decision.current_ratio, decision.state
        );

        match decision.action {
            Action::Mint(plan) => self.execute_mint(&plan)?,
            Action::Repay(plan) => self.repay(plan.amount)?,
            Action::Hold(HoldReason::BaseFeeTooHigh) => {
                warn!(
                    "{}: mint deferred, base fee {} above {}",
                    self.config.name,
                    self.host.base_fee(),
                    self.config.params.max_acceptable_base_fee
                );
            }
            Action::Hold(HoldReason::DebtCeilingReached) | Action::Hold(HoldReason::NoRepayCapacity) => {
                warn!("{}: rebalance held: {:?}", self.config.name, decision.action);
            }
            Action::Hold(_) => {}
        }

        Ok(decision)
    }

    fn execute_mint(&mut self, plan: &MintPlan) -> RebalancerResult<()> {
        let received = self.host.mint_debt(plan.borrow)?;
        let shares = self.host.vault_deposit(received)?;
        info!(
            "{}: minted {} (debt +{}{}), invested for {} shares",
            self.config.name,
            received,
            plan.debt_increase,
            if plan.ceiling_limited { ", ceiling limited" } else { "" },
            shares
        );
        Ok(())
    }

    /// Repay exactly `amount` of debt, redeeming shares if idle funds fall short
    pub(crate) fn repay(&mut self, amount: u128) -> RebalancerResult<()> {
        if amount == 0 {
            return Ok(());
        }
        self.fund_debt_token(amount)?;
        self.host.repay_debt(amount)?;
        info!(
            "{}: repaid {} debt, {} remaining",
            self.config.name,
            amount,
            self.host.current_debt()
        );
        Ok(())
    }

    /// Make sure at least `amount` debt token sits idle in the wallet
    pub(crate) fn fund_debt_token(&mut self, amount: u128) -> RebalancerResult<()> {
        let idle = self.balance_of_debt_token();
        if idle < amount {
            self.redeem_for(amount - idle)?;
        }

        // Redemption haircut: top up once, grossed up by the accepted loss
        let available = self.balance_of_debt_token();
        if available < amount && self.host.share_balance() > 0 {
            let kept_bps = MAX_BPS.saturating_sub(self.config.params.max_loss_bps).max(1);
            let grossed = mul_div_up(amount - available, MAX_BPS, kept_bps)?;
            self.redeem_for(grossed)?;
        }

        let available = self.balance_of_debt_token();
        if available < amount {
            return Err(RebalancerError::insufficient_liquidity(amount, available));
        }
        Ok(())
    }

    /// Redeem shares worth `amount` debt token, capped at the share balance.
    /// Returns the debt token received.
    pub(crate) fn redeem_for(&mut self, amount: u128) -> RebalancerResult<u128> {
        let balance = self.host.share_balance();
        if amount == 0 || balance == 0 {
            return Ok(0);
        }

        let price_per_share = self.host.price_per_share();
        if price_per_share == 0 {
            return Ok(0);
        }

        let shares = engine::shares_for_amount(amount, price_per_share)?.min(balance);
        let received = self
            .host
            .vault_withdraw(shares, self.config.params.max_loss_bps)?;
        debug!(
            "{}: redeemed {} shares for {} debt token",
            self.config.name, shares, received
        );
        Ok(received)
    }

    /// Invest whatever debt token sits idle
    pub(crate) fn deposit_idle_debt_token(&mut self) -> RebalancerResult<()> {
        let idle = self.balance_of_debt_token();
        if idle == 0 {
            return Ok(());
        }
        let shares = self.host.vault_deposit(idle)?;
        debug!("{}: invested {} idle debt token for {} shares", self.config.name, idle, shares);
        Ok(())
    }

    /// Collateral that can leave the position while the remaining debt stays
    /// at the target ratio
    pub(crate) fn free_collateral(&self) -> RebalancerResult<u128> {
        let collateral = self.host.current_collateral();
        let debt = self.host.current_debt();
        if debt == 0 {
            return Ok(collateral);
        }

        let price = self.host.collateral_price()?;
        let needed = engine::collateral_for_debt(
            debt,
            self.config.params.target_collateral_ratio,
            price,
            self.config.want_decimals,
        )?;
        Ok(collateral.saturating_sub(needed))
    }

    /// Withdraw up to `limit` of free collateral; returns the amount withdrawn
    pub(crate) fn withdraw_free_collateral(&mut self, limit: u128) -> RebalancerResult<u128> {
        let amount = self.free_collateral()?.min(limit);
        if amount > 0 {
            self.host.withdraw_collateral(amount)?;
        }
        Ok(amount)
    }

    /// Best-effort unwind: repay what capacity allows without leaving dust,
    /// then withdraw all collateral the residual debt does not need.
    pub(crate) fn unwind_position(&mut self) -> RebalancerResult<()> {
        let debt = self.host.current_debt();
        if debt > 0 {
            let capacity = self.repay_capacity()?;
            let floor = self.host.constraints().debt_floor;
            let amount = engine::best_effort_repay(debt, floor, capacity);
            self.repay(amount)?;
        }

        self.withdraw_free_collateral(u128::MAX)?;

        let residual = self.host.current_debt();
        if residual > 0 {
            warn!(
                "{}: unwind left {} debt against {} collateral",
                self.config.name,
                residual,
                self.host.current_collateral()
            );
        }
        Ok(())
    }
}
