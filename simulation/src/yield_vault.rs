/// Simulated share-based yield vault for the debt token

use rebalancer_math::{less_bps, mul_div_down};
use rebalancer_types::{AccountId, HostError, MAX_BPS, WAD};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimYieldVault {
    pub account: AccountId,
    pub total_shares: u128,
    pub total_assets: u128,
    /// Haircut applied on every redemption, in bps
    pub withdrawal_loss_bps: u128,
}

impl Default for SimYieldVault {
    fn default() -> Self {
        Self {
            account: AccountId::new("yield-vault"),
            total_shares: 0,
            total_assets: 0,
            withdrawal_loss_bps: 0,
        }
    }
}

impl SimYieldVault {
    pub fn price_per_share(&self) -> u128 {
        if self.total_shares == 0 {
            return WAD;
        }
        mul_div_down(self.total_assets, WAD, self.total_shares).unwrap_or(0)
    }

    /// Shares minted for a deposit of `amount`
    pub fn shares_for_deposit(&self, amount: u128) -> Result<u128, HostError> {
        if self.total_shares == 0 || self.total_assets == 0 {
            return Ok(amount);
        }
        mul_div_down(amount, self.total_shares, self.total_assets).map_err(|e| HostError::Vault(e.to_string()))
    }

    /// Assets paid out for `shares`, haircut included.
    /// Fails if the haircut exceeds `max_loss_bps`.
    pub fn assets_for_redeem(&self, shares: u128, max_loss_bps: u128) -> Result<u128, HostError> {
        if shares > self.total_shares {
            return Err(HostError::Vault(format!(
                "redeeming {} shares of {}",
                shares, self.total_shares
            )));
        }
        if self.withdrawal_loss_bps > max_loss_bps {
            return Err(HostError::Vault(format!(
                "withdrawal loss {} bps exceeds max loss {} bps",
                self.withdrawal_loss_bps, max_loss_bps
            )));
        }

        let gross = mul_div_down(shares, self.total_assets, self.total_shares)
            .map_err(|e| HostError::Vault(e.to_string()))?;
        less_bps(gross, self.withdrawal_loss_bps.min(MAX_BPS)).map_err(|e| HostError::Vault(e.to_string()))
    }

    pub fn deposit(&mut self, amount: u128) -> Result<u128, HostError> {
        let shares = self.shares_for_deposit(amount)?;
        self.total_assets = self.total_assets.saturating_add(amount);
        self.total_shares = self.total_shares.saturating_add(shares);
        Ok(shares)
    }

    /// Burn `shares` and pay out their assets; the haircut stays in the vault
    pub fn redeem(&mut self, shares: u128, max_loss_bps: u128) -> Result<u128, HostError> {
        let assets = self.assets_for_redeem(shares, max_loss_bps)?;
        self.total_assets = self.total_assets.saturating_sub(assets);
        self.total_shares -= shares;
        Ok(assets)
    }

    /// Yield earned by the vault's own strategies
    pub fn earn(&mut self, amount: u128) {
        self.total_assets = self.total_assets.saturating_add(amount);
    }

    /// Loss suffered by the vault's own strategies
    pub fn lose(&mut self, amount: u128) {
        self.total_assets = self.total_assets.saturating_sub(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_price_follows_yield() {
        let mut vault = SimYieldVault::default();
        assert_eq!(vault.shares_for_deposit(1_000).unwrap(), 1_000);
        vault.total_shares = 1_000;
        vault.total_assets = 1_000;

        vault.earn(100);
        assert_eq!(vault.price_per_share(), 1_100_000_000_000_000_000);
        assert_eq!(vault.shares_for_deposit(1_100).unwrap(), 1_000);
        assert_eq!(vault.assets_for_redeem(500, 0).unwrap(), 550);
    }

    #[test]
    fn test_redemption_respects_max_loss() {
        let mut vault = SimYieldVault::default();
        vault.total_shares = 1_000;
        vault.total_assets = 1_000;
        vault.withdrawal_loss_bps = 10;

        assert!(vault.redeem(100, 1).is_err());
        assert_eq!(vault.redeem(500, 10).unwrap(), 499);
        assert_eq!(vault.total_shares, 500);
        assert_eq!(vault.total_assets, 501);
    }
}
