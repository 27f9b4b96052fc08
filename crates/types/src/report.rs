/// Outcome records returned by the strategy entry points

use serde::{Deserialize, Serialize};

/// Figures passed to the outer vault on harvest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub profit: u128,
    pub loss: u128,
    pub debt_payment: u128,
    /// Outstanding debt returned by the outer vault after reporting
    pub debt_outstanding: u128,
}

/// Result of a vault-initiated withdrawal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalOutcome {
    /// Want transferred to the vault
    pub liquidated: u128,
    /// Loss recognised by the withdrawal (always zero; losses surface on harvest)
    pub loss: u128,
    /// Debt repaid while freeing collateral
    pub debt_repaid: u128,
}

/// Balances handed to a successor strategy and what stayed behind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReceipt {
    pub want_transferred: u128,
    pub debt_token_transferred: u128,
    pub vault_shares_transferred: u128,
    pub residual_collateral: u128,
    pub residual_debt: u128,
}

impl MigrationReceipt {
    pub fn is_clean(&self) -> bool {
        self.residual_collateral == 0 && self.residual_debt == 0
    }
}
