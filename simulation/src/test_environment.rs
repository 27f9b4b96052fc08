use std::collections::BTreeSet;

use collateral_rebalancer::host::{
    BlockContext, Checkpoint, LendingMarket, OuterVault, PriceOracle, TokenSwapper, TokenWallet, YieldVault,
};
use collateral_rebalancer::{Strategy, StrategyConfig};
use rebalancer_types::{AccountId, HostError, MarketConstraints, RebalancerResult, StrategyParams, TokenId, GWEI, WAD};

use crate::account_factory::TestAccounts;
use crate::lending_market::SimLendingMarket;
use crate::outer_vault::SimOuterVault;
use crate::swap_simulator::SwapSimulator;
use crate::token_factory::{TestTokens, TokenLedger};
use crate::yield_vault::SimYieldVault;

/// Collaborator call that can be forced to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailPoint {
    DepositCollateral,
    WithdrawCollateral,
    MintDebt,
    RepayDebt,
    VaultDeposit,
    VaultWithdraw,
    Report,
    Revoke,
    Oracle,
    Swap,
    Transfer,
}

/// Market and vault parameters for a simulated deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSetup {
    /// Debt-token units per whole want
    pub price: u128,
    pub liquidation_ratio: u128,
    pub debt_floor: u128,
    pub debt_ceiling: u128,
    pub other_market_debt: u128,
    pub borrow_opening_fee_bps: u128,
    pub base_fee: u128,
    pub swap_slippage_bps: u128,
    pub tokens: TestTokens,
}

impl Default for SimSetup {
    fn default() -> Self {
        Self {
            price: 3_000 * WAD,
            liquidation_ratio: 1_340_000_000_000_000_000,
            debt_floor: 0,
            debt_ceiling: 100_000_000 * WAD,
            other_market_debt: 0,
            borrow_opening_fee_bps: 0,
            base_fee: 10 * GWEI,
            swap_slippage_bps: 0,
            tokens: TestTokens::default(),
        }
    }
}

/// In-memory host implementing every collaborator trait for one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimHost {
    pub strategy: AccountId,
    pub tokens: TestTokens,
    pub ledger: TokenLedger,
    pub market: SimLendingMarket,
    pub yield_vault: SimYieldVault,
    pub outer_vault: SimOuterVault,
    pub swapper: SwapSimulator,
    pub price: u128,
    pub base_fee: u128,
    pub timestamp: u64,
    pub failures: BTreeSet<FailPoint>,
}

impl SimHost {
    pub fn new(setup: &SimSetup, strategy: AccountId) -> Self {
        let mut market = SimLendingMarket::new(setup.liquidation_ratio);
        market.debt_floor = setup.debt_floor;
        market.debt_ceiling = setup.debt_ceiling;
        market.other_debt = setup.other_market_debt;
        market.borrow_opening_fee_bps = setup.borrow_opening_fee_bps;

        Self {
            strategy,
            tokens: setup.tokens.clone(),
            ledger: TokenLedger::new(),
            market,
            yield_vault: SimYieldVault::default(),
            outer_vault: SimOuterVault::default(),
            swapper: SwapSimulator {
                slippage_bps: setup.swap_slippage_bps,
                swaps: 0,
            },
            price: setup.price,
            base_fee: setup.base_fee,
            timestamp: 1,
            failures: BTreeSet::new(),
        }
    }

    // ========================================================================
    // Environment Controls
    // ========================================================================

    pub fn fail_on(&mut self, point: FailPoint) {
        self.failures.insert(point);
    }

    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    fn check(&self, point: FailPoint) -> Result<(), HostError> {
        if !self.failures.contains(&point) {
            return Ok(());
        }
        let message = format!("injected failure at {:?}", point);
        Err(match point {
            FailPoint::DepositCollateral
            | FailPoint::WithdrawCollateral
            | FailPoint::MintDebt
            | FailPoint::RepayDebt => HostError::Market(message),
            FailPoint::VaultDeposit | FailPoint::VaultWithdraw => HostError::Vault(message),
            FailPoint::Report | FailPoint::Revoke => HostError::Report(message),
            FailPoint::Oracle => HostError::Oracle(message),
            FailPoint::Swap => HostError::Swap(message),
            FailPoint::Transfer => HostError::Transfer(message),
        })
    }

    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    /// A user deposit into the outer vault
    pub fn deposit_to_vault(&mut self, amount: u128) -> Result<(), HostError> {
        let vault = self.outer_vault.account.clone();
        let want = self.tokens.want.clone();
        self.ledger.mint(&vault, &want, amount)
    }

    /// Want held idle by the outer vault
    pub fn vault_idle(&self) -> u128 {
        self.ledger.balance(&self.outer_vault.account, &self.tokens.want)
    }

    /// Outer vault idle want plus what the strategy owes it
    pub fn outer_total_assets(&self) -> u128 {
        self.outer_vault.total_assets(self.vault_idle())
    }

    pub fn airdrop(&mut self, token: &TokenId, amount: u128) -> Result<(), HostError> {
        let strategy = self.strategy.clone();
        self.ledger.mint(&strategy, token, amount)
    }

    pub fn balance(&self, account: &AccountId, token: &TokenId) -> u128 {
        self.ledger.balance(account, token)
    }

    /// Fork the world for a successor strategy that received a migration.
    ///
    /// The successor inherits the outer vault's books for the strategy; the
    /// predecessor's position stays behind as other market debt.
    pub fn fork_for_successor(&mut self, successor: &AccountId) -> SimHost {
        let mut fork = self.clone();
        fork.strategy = successor.clone();
        fork.market.other_debt = self.market.other_debt.saturating_add(self.market.debt);
        fork.market.collateral = 0;
        fork.market.debt = 0;

        self.outer_vault.total_debt = 0;
        self.outer_vault.revoked = true;
        fork
    }

    fn strategy_ratio_check(&self, collateral: u128, debt: u128) -> Result<(), HostError> {
        self.market
            .check_position(collateral, debt, self.price, self.tokens.want_decimals)
    }
}

// ============================================================================
// Collaborator Trait Implementations
// ============================================================================

impl LendingMarket for SimHost {
    fn deposit_collateral(&mut self, amount: u128) -> Result<(), HostError> {
        self.check(FailPoint::DepositCollateral)?;
        let (strategy, market, want) = (self.strategy.clone(), self.market.account.clone(), self.tokens.want.clone());
        self.ledger.transfer(&want, &strategy, &market, amount)?;
        self.market.collateral += amount;
        Ok(())
    }

    fn withdraw_collateral(&mut self, amount: u128) -> Result<(), HostError> {
        self.check(FailPoint::WithdrawCollateral)?;
        if amount > self.market.collateral {
            return Err(HostError::Market(format!(
                "withdrawing {} of {} collateral",
                amount, self.market.collateral
            )));
        }
        self.strategy_ratio_check(self.market.collateral - amount, self.market.debt)?;

        let (strategy, market, want) = (self.strategy.clone(), self.market.account.clone(), self.tokens.want.clone());
        self.ledger.transfer(&want, &market, &strategy, amount)?;
        self.market.collateral -= amount;
        Ok(())
    }

    fn mint_debt(&mut self, amount: u128) -> Result<u128, HostError> {
        self.check(FailPoint::MintDebt)?;
        let increase = self.market.debt_increase(amount)?;
        let new_debt = self.market.debt + increase;
        let total = self.market.other_debt + new_debt;
        if total > self.market.debt_ceiling {
            return Err(HostError::Market(format!(
                "market debt {} above ceiling {}",
                total, self.market.debt_ceiling
            )));
        }
        self.strategy_ratio_check(self.market.collateral, new_debt)?;

        let (strategy, debt_token) = (self.strategy.clone(), self.tokens.debt.clone());
        self.ledger.mint(&strategy, &debt_token, amount)?;
        self.market.debt = new_debt;
        Ok(amount)
    }

    fn repay_debt(&mut self, amount: u128) -> Result<(), HostError> {
        self.check(FailPoint::RepayDebt)?;
        if amount > self.market.debt {
            return Err(HostError::Market(format!(
                "repaying {} of {} debt",
                amount, self.market.debt
            )));
        }
        let new_debt = self.market.debt - amount;
        if new_debt > 0 && new_debt < self.market.debt_floor {
            return Err(HostError::Market(format!(
                "debt {} below floor {}",
                new_debt, self.market.debt_floor
            )));
        }

        let (strategy, debt_token) = (self.strategy.clone(), self.tokens.debt.clone());
        self.ledger.burn(&strategy, &debt_token, amount)?;
        self.market.debt = new_debt;
        Ok(())
    }

    fn current_collateral(&self) -> u128 {
        self.market.collateral
    }

    fn current_debt(&self) -> u128 {
        self.market.debt
    }

    fn constraints(&self) -> MarketConstraints {
        self.market.constraints()
    }
}

impl YieldVault for SimHost {
    fn vault_deposit(&mut self, amount: u128) -> Result<u128, HostError> {
        self.check(FailPoint::VaultDeposit)?;
        let (strategy, debt_token, share_token) = (
            self.strategy.clone(),
            self.tokens.debt.clone(),
            self.tokens.yield_vault_share.clone(),
        );
        self.ledger.burn(&strategy, &debt_token, amount)?;
        let shares = self.yield_vault.deposit(amount)?;
        self.ledger.mint(&strategy, &share_token, shares)?;
        Ok(shares)
    }

    fn vault_withdraw(&mut self, shares: u128, max_loss_bps: u128) -> Result<u128, HostError> {
        self.check(FailPoint::VaultWithdraw)?;
        let (strategy, debt_token, share_token) = (
            self.strategy.clone(),
            self.tokens.debt.clone(),
            self.tokens.yield_vault_share.clone(),
        );
        self.ledger.burn(&strategy, &share_token, shares)?;
        let assets = self.yield_vault.redeem(shares, max_loss_bps)?;
        self.ledger.mint(&strategy, &debt_token, assets)?;
        Ok(assets)
    }

    fn share_balance(&self) -> u128 {
        self.ledger.balance(&self.strategy, &self.tokens.yield_vault_share)
    }

    fn price_per_share(&self) -> u128 {
        self.yield_vault.price_per_share()
    }

    fn vault_total_assets(&self) -> u128 {
        self.yield_vault.total_assets
    }
}

impl OuterVault for SimHost {
    fn strategy_total_debt(&self) -> u128 {
        self.outer_vault.total_debt
    }

    fn debt_outstanding(&self) -> u128 {
        self.outer_vault.debt_outstanding(self.vault_idle())
    }

    fn credit_available(&self) -> u128 {
        self.outer_vault.credit_available(self.vault_idle())
    }

    fn last_report(&self) -> u64 {
        self.outer_vault.last_report
    }

    fn report(&mut self, gain: u128, loss: u128, debt_payment: u128) -> Result<u128, HostError> {
        self.check(FailPoint::Report)?;
        let have = self.ledger.balance(&self.strategy, &self.tokens.want);
        if have < gain.saturating_add(debt_payment) {
            return Err(HostError::Report(format!(
                "strategy holds {} want, reported {} gain and {} payment",
                have, gain, debt_payment
            )));
        }

        let idle = self.vault_idle();
        let now = self.timestamp;
        let (pull, push, outstanding) = self.outer_vault.book_report(gain, loss, debt_payment, idle, now)?;

        let (strategy, vault, want) = (
            self.strategy.clone(),
            self.outer_vault.account.clone(),
            self.tokens.want.clone(),
        );
        if pull > 0 {
            self.ledger.transfer(&want, &strategy, &vault, pull)?;
        }
        if push > 0 {
            self.ledger.transfer(&want, &vault, &strategy, push)?;
        }
        Ok(outstanding)
    }

    fn revoke_strategy(&mut self) -> Result<(), HostError> {
        self.check(FailPoint::Revoke)?;
        self.outer_vault.revoked = true;
        self.outer_vault.debt_ratio_bps = 0;
        Ok(())
    }
}

impl PriceOracle for SimHost {
    fn collateral_price(&self) -> Result<u128, HostError> {
        self.check(FailPoint::Oracle)?;
        Ok(self.price)
    }
}

impl BlockContext for SimHost {
    fn base_fee(&self) -> u128 {
        self.base_fee
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

impl TokenWallet for SimHost {
    fn balance_of(&self, token: &TokenId) -> u128 {
        self.ledger.balance(&self.strategy, token)
    }

    fn transfer(&mut self, token: &TokenId, to: &AccountId, amount: u128) -> Result<(), HostError> {
        self.check(FailPoint::Transfer)?;
        let strategy = self.strategy.clone();
        self.ledger.transfer(token, &strategy, to, amount)
    }
}

impl TokenSwapper for SimHost {
    fn swap_debt_for_want(&mut self, amount_in: u128, min_out: u128) -> Result<u128, HostError> {
        self.check(FailPoint::Swap)?;
        let out = self
            .swapper
            .execute(amount_in, min_out, self.price, self.tokens.want_decimals)?;

        let (strategy, debt_token, want) = (self.strategy.clone(), self.tokens.debt.clone(), self.tokens.want.clone());
        self.ledger.burn(&strategy, &debt_token, amount_in)?;
        self.ledger.mint(&strategy, &want, out)?;
        Ok(out)
    }
}

impl Checkpoint for SimHost {
    type Snapshot = Box<SimHost>;

    fn snapshot(&self) -> Self::Snapshot {
        Box::new(self.clone())
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        *self = *snapshot;
    }
}

// ============================================================================
// Test Environment
// ============================================================================

/// A strategy wired to a fresh [`SimHost`] with the standard accounts
pub struct TestEnvironment {
    pub accounts: TestAccounts,
    pub strategy: Strategy<SimHost>,
}

impl TestEnvironment {
    pub fn new() -> RebalancerResult<Self> {
        Self::with_setup(SimSetup::default(), StrategyParams::default())
    }

    pub fn with_setup(setup: SimSetup, params: StrategyParams) -> RebalancerResult<Self> {
        let accounts = TestAccounts::default();
        let host = SimHost::new(&setup, accounts.strategy.clone());
        let config = Self::strategy_config(&accounts, &setup.tokens, params);
        let strategy = Strategy::new(config, host)?;
        Ok(Self { accounts, strategy })
    }

    pub fn strategy_config(accounts: &TestAccounts, tokens: &TestTokens, params: StrategyParams) -> StrategyConfig {
        StrategyConfig {
            name: "StrategyMIMyvWETH".to_string(),
            want_token: tokens.want.clone(),
            debt_token: tokens.debt.clone(),
            yield_vault_token: tokens.yield_vault_share.clone(),
            vault_share_token: tokens.vault_share.clone(),
            want_decimals: tokens.want_decimals,
            roles: accounts.role_assignments(),
            params,
            max_swap_slippage_bps: rebalancer_types::DEFAULT_MAX_SWAP_SLIPPAGE_BPS,
        }
    }

    pub fn host(&self) -> &SimHost {
        self.strategy.host()
    }

    pub fn host_mut(&mut self) -> &mut SimHost {
        self.strategy.host_mut()
    }

    /// User deposit into the outer vault
    pub fn deposit(&mut self, amount: u128) -> Result<(), HostError> {
        self.host_mut().deposit_to_vault(amount)
    }

    /// Advance one second and harvest as governance
    pub fn harvest(&mut self) -> RebalancerResult<rebalancer_types::HarvestReport> {
        self.host_mut().advance_time(1);
        let gov = self.accounts.governance.clone();
        self.strategy.harvest(&gov)
    }

    pub fn tend(&mut self) -> RebalancerResult<collateral_rebalancer::Decision> {
        let keeper = self.accounts.keeper.clone();
        self.strategy.tend(&keeper)
    }

    /// Outer vault pulls `amount` want from the strategy and pays it out to
    /// the user, writing the strategy's debt down by what it returned
    pub fn vault_withdraw(&mut self, amount: u128) -> RebalancerResult<rebalancer_types::WithdrawalOutcome> {
        let vault = self.accounts.vault.clone();
        let user = self.accounts.user.clone();
        let outcome = self.strategy.withdraw(&vault, amount)?;

        let host = self.host_mut();
        let want = host.tokens.want.clone();
        host.outer_vault.total_debt = host
            .outer_vault
            .total_debt
            .saturating_sub(outcome.liquidated + outcome.loss);
        host.ledger.transfer(&want, &vault, &user, outcome.liquidated)?;
        Ok(outcome)
    }

    pub fn set_debt_ratio(&mut self, bps: u128) {
        self.host_mut().outer_vault.debt_ratio_bps = bps;
    }

    pub fn set_price(&mut self, price: u128) {
        self.host_mut().price = price;
    }
}
