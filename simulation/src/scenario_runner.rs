use collateral_rebalancer::host::{LendingMarket, YieldVault};
use rebalancer_types::{RebalancerResult, StrategyParams};

use crate::test_environment::{SimSetup, TestEnvironment};

/// Position figures captured after a scenario step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionReport {
    pub step: String,
    pub collateral: u128,
    pub debt: u128,
    pub ratio: u128,
    pub vault_shares: u128,
    pub estimated_total_assets: u128,
}

/// High-level scenario runner recording the position after every step
pub struct ScenarioRunner {
    pub env: TestEnvironment,
    pub reports: Vec<PositionReport>,
}

impl ScenarioRunner {
    pub fn new(setup: SimSetup, params: StrategyParams) -> RebalancerResult<Self> {
        Ok(Self {
            env: TestEnvironment::with_setup(setup, params)?,
            reports: Vec::new(),
        })
    }

    /// Record the current position under `step`
    pub fn record(&mut self, step: &str) -> RebalancerResult<&PositionReport> {
        let strategy = &self.env.strategy;
        let report = PositionReport {
            step: step.to_string(),
            collateral: strategy.host().current_collateral(),
            debt: strategy.host().current_debt(),
            ratio: strategy.current_ratio()?,
            vault_shares: strategy.host().share_balance(),
            estimated_total_assets: strategy.estimated_total_assets()?,
        };
        log::debug!("{}: {:?}", step, report);
        self.reports.push(report);
        Ok(&self.reports[self.reports.len() - 1])
    }

    /// Deposit into the outer vault and harvest the funds into a position
    pub fn run_deposit_and_harvest(&mut self, amount: u128) -> RebalancerResult<&PositionReport> {
        self.env.deposit(amount)?;
        self.env.harvest()?;
        self.record("deposit_and_harvest")
    }

    /// Let the yield vault earn `profit` debt token, then harvest it
    pub fn run_yield_cycle(&mut self, profit: u128) -> RebalancerResult<&PositionReport> {
        self.env.host_mut().yield_vault.earn(profit);
        self.env.harvest()?;
        self.record("yield_cycle")
    }

    /// Move the collateral price and tend toward the target
    pub fn run_price_move(&mut self, new_price: u128) -> RebalancerResult<&PositionReport> {
        self.env.set_price(new_price);
        self.env.tend()?;
        self.record("price_move")
    }

    /// Vault-initiated withdrawal
    pub fn run_withdrawal(&mut self, amount: u128) -> RebalancerResult<&PositionReport> {
        self.env.vault_withdraw(amount)?;
        self.record("withdrawal")
    }
}
