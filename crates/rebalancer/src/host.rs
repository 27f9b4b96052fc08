//! Collaborator traits
//!
//! The strategy never owns balances directly. Every read and write goes
//! through one of these traits, implemented by the host environment (or by
//! the in-memory simulation in tests). Writes either succeed completely or
//! return a [`HostError`]; the strategy then restores its [`Checkpoint`].

use rebalancer_types::{AccountId, HostError, MarketConstraints, TokenId};

/// Lending market holding the collateral and the debt of the strategy
pub trait LendingMarket {
    /// Move `amount` want from the strategy wallet into the position
    fn deposit_collateral(&mut self, amount: u128) -> Result<(), HostError>;

    /// Move `amount` collateral back to the strategy wallet
    fn withdraw_collateral(&mut self, amount: u128) -> Result<(), HostError>;

    /// Borrow `amount`; debt grows by amount plus the opening fee.
    /// Returns the debt token received.
    fn mint_debt(&mut self, amount: u128) -> Result<u128, HostError>;

    /// Repay `amount` of debt from the strategy wallet
    fn repay_debt(&mut self, amount: u128) -> Result<(), HostError>;

    fn current_collateral(&self) -> u128;

    fn current_debt(&self) -> u128;

    fn constraints(&self) -> MarketConstraints;
}

/// Yield-bearing vault the borrowed debt token is invested in
pub trait YieldVault {
    /// Deposit debt token, returns shares minted
    fn vault_deposit(&mut self, amount: u128) -> Result<u128, HostError>;

    /// Redeem shares, returns debt token received
    fn vault_withdraw(&mut self, shares: u128, max_loss_bps: u128) -> Result<u128, HostError>;

    fn share_balance(&self) -> u128;

    /// Debt token per share, WAD scaled
    fn price_per_share(&self) -> u128;

    /// Debt token held by the vault across all depositors
    fn vault_total_assets(&self) -> u128;
}

/// Outer asset-management vault the strategy reports to
pub trait OuterVault {
    /// Want lent to the strategy according to the vault's books
    fn strategy_total_debt(&self) -> u128;

    /// Want the vault wants back
    fn debt_outstanding(&self) -> u128;

    /// Want the vault is willing to lend more
    fn credit_available(&self) -> u128;

    /// Timestamp of the last report
    fn last_report(&self) -> u64;

    /// Report gain/loss; the vault pulls `gain + debt_payment` want and
    /// pushes new credit. Returns the debt outstanding after the report.
    fn report(&mut self, gain: u128, loss: u128, debt_payment: u128) -> Result<u128, HostError>;

    /// Set the strategy's debt ratio to zero
    fn revoke_strategy(&mut self) -> Result<(), HostError>;
}

pub trait PriceOracle {
    /// Raw debt-token units per whole want token
    fn collateral_price(&self) -> Result<u128, HostError>;
}

pub trait BlockContext {
    /// Current network base fee in wei
    fn base_fee(&self) -> u128;

    fn timestamp(&self) -> u64;
}

/// Balances held by the strategy account
pub trait TokenWallet {
    fn balance_of(&self, token: &TokenId) -> u128;

    fn transfer(&mut self, token: &TokenId, to: &AccountId, amount: u128) -> Result<(), HostError>;
}

pub trait TokenSwapper {
    /// Swap debt token into want, failing if fewer than `min_out` arrive
    fn swap_debt_for_want(&mut self, amount_in: u128, min_out: u128) -> Result<u128, HostError>;
}

/// Snapshot/restore used to make every entry point all-or-nothing
pub trait Checkpoint {
    type Snapshot;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot);
}

/// Everything a strategy needs from its environment
pub trait Host:
    LendingMarket + YieldVault + OuterVault + PriceOracle + BlockContext + TokenWallet + TokenSwapper + Checkpoint
{
}

impl<T> Host for T where
    T: LendingMarket + YieldVault + OuterVault + PriceOracle + BlockContext + TokenWallet + TokenSwapper + Checkpoint
{
}
