use log::{debug, info, warn};

use rebalancer_math::less_bps;
use rebalancer_types::{AccountId, HarvestReport, Operation, RebalancerResult};

use crate::engine::{self, Decision};
use crate::host::Host;

use super::Strategy;

impl<H: Host> Strategy<H> {
    /// Realise profit, report to the outer vault and re-balance the position
    pub fn harvest(&mut self, caller: &AccountId) -> RebalancerResult<HarvestReport> {
        self.authorize(caller, Operation::Harvest)?;
        self.atomically(|s| s.harvest_inner())
    }

    /// Re-balance the position without reporting
    pub fn tend(&mut self, caller: &AccountId) -> RebalancerResult<Decision> {
        self.authorize(caller, Operation::Tend)?;
        self.atomically(|s| {
            let outstanding = s.host.debt_outstanding();
            s.adjust_position(outstanding)
        })
    }

    fn harvest_inner(&mut self) -> RebalancerResult<HarvestReport> {
        let outstanding = self.host.debt_outstanding();

        let (profit, loss, debt_payment) = if self.emergency_exit {
            self.exit_position(outstanding)?
        } else {
            self.prepare_return(outstanding)?
        };

        let debt_outstanding = self.host.report(profit, loss, debt_payment)?;
        self.adjust_position(debt_outstanding)?;

        info!(
            "{}: harvested profit {} loss {} debt payment {} (outstanding {})",
            self.config.name, profit, loss, debt_payment, debt_outstanding
        );

        Ok(HarvestReport {
            profit,
            loss,
            debt_payment,
            debt_outstanding,
        })
    }

    /// Free want for profit and `outstanding`; returns (profit, loss, debt payment)
    fn prepare_return(&mut self, outstanding: u128) -> RebalancerResult<(u128, u128, u128)> {
        self.take_debt_token_profit()?;

        let total_debt = self.host.strategy_total_debt();
        let total_assets = self.estimated_total_assets()?;
        let (profit, loss) = if total_assets >= total_debt {
            (total_assets - total_debt, 0)
        } else {
            (0, total_debt - total_assets)
        };

        let to_free = profit.saturating_add(outstanding);
        let idle = self.balance_of_want();
        if idle < to_free {
            self.liquidate_position(to_free - idle, false)?;
        }

        let idle = self.balance_of_want();
        let debt_payment = outstanding.min(idle);
        let profit = profit.min(idle - debt_payment);

        debug!(
            "{}: prepared return: assets {} vs debt {}, profit {} loss {} payment {}",
            self.config.name, total_assets, total_debt, profit, loss, debt_payment
        );
        Ok((profit, loss, debt_payment))
    }

    /// Emergency-exit variant: unwind everything, then settle against `outstanding`
    fn exit_position(&mut self, outstanding: u128) -> RebalancerResult<(u128, u128, u128)> {
        self.unwind_position()?;
        self.take_debt_token_profit()?;

        let freed = self.balance_of_want();
        let (profit, loss) = if freed < outstanding {
            (0, outstanding - freed)
        } else {
            (freed - outstanding, 0)
        };

        warn!(
            "{}: emergency exit freed {} want against {} outstanding",
            self.config.name, freed, outstanding
        );
        Ok((profit, loss, outstanding - loss))
    }

    /// Put idle want to work and bring the ratio back to target
    fn adjust_position(&mut self, outstanding: u128) -> RebalancerResult<Decision> {
        if !self.emergency_exit {
            let idle = self.balance_of_want();
            if idle > outstanding {
                let amount = idle - outstanding;
                self.host.deposit_collateral(amount)?;
                debug!("{}: deposited {} want as collateral", self.config.name, amount);
            }
        }

        let decision = self.rebalance()?;

        if !self.emergency_exit {
            self.deposit_idle_debt_token()?;
        }
        Ok(decision)
    }

    /// Swap the debt-token surplus (invested plus idle minus debt) into want
    fn take_debt_token_profit(&mut self) -> RebalancerResult<u128> {
        let debt = self.host.current_debt();
        let surplus = self.repay_capacity()?.saturating_sub(debt);
        if surplus == 0 {
            return Ok(0);
        }

        let idle = self.balance_of_debt_token();
        if idle < surplus {
            self.redeem_for(surplus - idle)?;
        }

        let amount_in = surplus.min(self.balance_of_debt_token());
        self.swap_debt_for_want(amount_in)
    }

    fn swap_debt_for_want(&mut self, amount_in: u128) -> RebalancerResult<u128> {
        let price = self.host.collateral_price()?;
        let expected = engine::debt_to_want(amount_in, price, self.config.want_decimals)?;
        if expected == 0 {
            return Ok(0);
        }

        let min_out = less_bps(expected, self.config.max_swap_slippage_bps)?;
        let received = self.host.swap_debt_for_want(amount_in, min_out)?;
        info!(
            "{}: swapped {} debt token for {} want (min {})",
            self.config.name, amount_in, received, min_out
        );
        Ok(received)
    }
}
