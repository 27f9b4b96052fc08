//! The strategy: owns one position and drives the host through it.
//!
//! Every mutating entry point checks the caller against the capability
//! table and runs inside [`Strategy::atomically`], so a failing pass leaves
//! both the host and the strategy exactly as they were.

mod admin;
mod config;
mod harvest;
mod rebalance;
mod withdraw;

pub use config::StrategyConfig;

use log::{debug, warn};

use rebalancer_types::{
    AccountId, Operation, RebalancerError, RebalancerResult, StrategyParams, TokenId,
};

use crate::engine::{self, Decision, PositionSnapshot};
use crate::host::Host;
use crate::triggers::{self, HarvestInputs};

pub struct Strategy<H: Host> {
    config: StrategyConfig,
    host: H,
    emergency_exit: bool,
}

impl<H: Host> Strategy<H> {
    /// Build a strategy on `host`, validating the configuration against the
    /// market's liquidation ratio.
    pub fn new(config: StrategyConfig, host: H) -> RebalancerResult<Self> {
        config.validate()?;
        let liquidation_ratio = host.constraints().liquidation_ratio;
        config.params.validate(liquidation_ratio)?;

        debug!(
            "Strategy {} created (target ratio {}, tolerance {})",
            config.name, config.params.target_collateral_ratio, config.params.rebalance_tolerance
        );

        Ok(Self {
            config,
            host,
            emergency_exit: false,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn params(&self) -> &StrategyParams {
        &self.config.params
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct host access for the environment driving the strategy
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn emergency_exit(&self) -> bool {
        self.emergency_exit
    }

    pub fn want_token(&self) -> &TokenId {
        &self.config.want_token
    }

    pub fn balance_of_want(&self) -> u128 {
        self.host.balance_of(&self.config.want_token)
    }

    pub fn balance_of_debt_token(&self) -> u128 {
        self.host.balance_of(&self.config.debt_token)
    }

    pub fn balance_of_collateral(&self) -> u128 {
        self.host.current_collateral()
    }

    pub fn balance_of_debt(&self) -> u128 {
        self.host.current_debt()
    }

    pub fn balance_of_vault_shares(&self) -> u128 {
        self.host.share_balance()
    }

    /// Debt-token value of the yield-vault shares, capped at what the vault holds
    pub fn invested_value(&self) -> RebalancerResult<u128> {
        let value = engine::shares_value(self.host.share_balance(), self.host.price_per_share())?;
        Ok(value.min(self.host.vault_total_assets()))
    }

    /// Idle debt token plus invested value
    pub fn repay_capacity(&self) -> RebalancerResult<u128> {
        Ok(self.balance_of_debt_token().saturating_add(self.invested_value()?))
    }

    pub fn collateral_value(&self) -> RebalancerResult<u128> {
        let price = self.host.collateral_price()?;
        engine::collateral_value(self.host.current_collateral(), price, self.config.want_decimals)
    }

    /// Current collateralization ratio, zero without debt
    pub fn current_ratio(&self) -> RebalancerResult<u128> {
        engine::current_ratio(self.collateral_value()?, self.host.current_debt())
    }

    /// Want held idle, as collateral, and the net debt-token surplus (or
    /// deficit) converted to want. Saturates at zero.
    pub fn estimated_total_assets(&self) -> RebalancerResult<u128> {
        let price = self.host.collateral_price()?;
        let decimals = self.config.want_decimals;

        let gross = self
            .balance_of_want()
            .saturating_add(self.host.current_collateral());
        let debt_assets = self.repay_capacity()?;
        let debt = self.host.current_debt();

        Ok(if debt_assets >= debt {
            gross.saturating_add(engine::debt_to_want(debt_assets - debt, price, decimals)?)
        } else {
            gross.saturating_sub(engine::debt_to_want(debt - debt_assets, price, decimals)?)
        })
    }

    // ========================================================================
    // Decision and Triggers
    // ========================================================================

    /// Snapshot of the position as the decision function sees it
    pub fn position_snapshot(&self) -> RebalancerResult<PositionSnapshot> {
        Ok(PositionSnapshot {
            collateral: self.host.current_collateral(),
            debt: self.host.current_debt(),
            collateral_value: self.collateral_value()?,
            repay_capacity: self.repay_capacity()?,
            constraints: self.host.constraints(),
            base_fee: self.host.base_fee(),
        })
    }

    /// Decision a rebalance pass would take right now
    pub fn evaluate(&self) -> RebalancerResult<Decision> {
        engine::decide(&self.position_snapshot()?, &self.config.params, self.emergency_exit)
    }

    pub fn tend_trigger(&self) -> RebalancerResult<bool> {
        let decision = self.evaluate()?;
        let triggered = triggers::tend_trigger(&decision);
        debug!(
            "{}: tend trigger {} (state {:?}, ratio {}, action {:?})",
            self.config.name, triggered, decision.state, decision.current_ratio, decision.action
        );
        Ok(triggered)
    }

    /// Inputs for the keeper's harvest heuristic
    pub fn harvest_inputs(&self) -> RebalancerResult<HarvestInputs> {
        Ok(HarvestInputs {
            estimated_total_assets: self.estimated_total_assets()?,
            total_debt: self.host.strategy_total_debt(),
            debt_outstanding: self.host.debt_outstanding(),
            credit_available: self.host.credit_available(),
            last_report: self.host.last_report(),
            now: self.host.timestamp(),
            emergency_exit: self.emergency_exit,
        })
    }

    // ========================================================================
    // Access Control and Atomicity
    // ========================================================================

    fn authorize(&self, caller: &AccountId, operation: Operation) -> RebalancerResult<()> {
        if self.config.roles.can_perform(caller, operation) {
            return Ok(());
        }
        warn!("{}: {} denied for {}", self.config.name, operation, caller);
        Err(RebalancerError::unauthorized(caller, operation))
    }

    /// Run `f`, restoring host and strategy state if it fails
    fn atomically<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> RebalancerResult<T>,
    ) -> RebalancerResult<T> {
        let checkpoint = self.host.snapshot();
        let config = self.config.clone();
        let emergency_exit = self.emergency_exit;

        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.host.restore(checkpoint);
                self.config = config;
                self.emergency_exit = emergency_exit;
                debug!("{}: pass rolled back: {}", self.config.name, err);
                Err(err)
            }
        }
    }
}
