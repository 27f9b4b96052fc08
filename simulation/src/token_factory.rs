use std::collections::BTreeMap;

use rebalancer_types::{AccountId, HostError, TokenId};

/// Token identifiers used by one simulated deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTokens {
    pub want: TokenId,
    pub debt: TokenId,
    pub yield_vault_share: TokenId,
    pub vault_share: TokenId,
    pub want_decimals: u8,
}

impl Default for TestTokens {
    fn default() -> Self {
        Self {
            want: TokenId::new("yvWETH"),
            debt: TokenId::new("MIM"),
            yield_vault_share: TokenId::new("yvMIM"),
            vault_share: TokenId::new("yvWETH-vault"),
            want_decimals: 18,
        }
    }
}

/// Balance book for every account and token in the simulation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLedger {
    balances: BTreeMap<(AccountId, TokenId), u128>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, account: &AccountId, token: &TokenId) -> u128 {
        self.balances
            .get(&(account.clone(), token.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Create `amount` of `token` out of thin air
    pub fn mint(&mut self, account: &AccountId, token: &TokenId, amount: u128) -> Result<(), HostError> {
        let entry = self.balances.entry((account.clone(), token.clone())).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| HostError::Transfer(format!("{} balance overflow for {}", token, account)))?;
        Ok(())
    }

    pub fn burn(&mut self, account: &AccountId, token: &TokenId, amount: u128) -> Result<(), HostError> {
        let balance = self.balance(account, token);
        if balance < amount {
            return Err(HostError::Transfer(format!(
                "{} holds {} {}, cannot burn {}",
                account, balance, token, amount
            )));
        }
        self.balances
            .insert((account.clone(), token.clone()), balance - amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), HostError> {
        self.burn(from, token, amount)?;
        self.mint(to, token, amount)
    }
}
