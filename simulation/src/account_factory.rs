use rebalancer_types::{AccountId, RoleAssignments};

/// Well-known accounts of a simulated deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestAccounts {
    pub governance: AccountId,
    pub management: AccountId,
    pub guardian: AccountId,
    pub strategist: AccountId,
    pub keeper: AccountId,
    /// The outer vault
    pub vault: AccountId,
    /// An ordinary depositor with no role
    pub user: AccountId,
    /// The strategy itself
    pub strategy: AccountId,
}

impl Default for TestAccounts {
    fn default() -> Self {
        Self {
            governance: AccountId::new("gov"),
            management: AccountId::new("management"),
            guardian: AccountId::new("guardian"),
            strategist: AccountId::new("strategist"),
            keeper: AccountId::new("keeper"),
            vault: AccountId::new("vault"),
            user: AccountId::new("user"),
            strategy: AccountId::new("strategy"),
        }
    }
}

impl TestAccounts {
    pub fn role_assignments(&self) -> RoleAssignments {
        RoleAssignments {
            governance: self.governance.clone(),
            management: self.management.clone(),
            guardian: self.guardian.clone(),
            strategist: self.strategist.clone(),
            keeper: self.keeper.clone(),
            vault: self.vault.clone(),
        }
    }

    /// Every account that holds a role able to call harvest/tend
    pub fn keepers(&self) -> Vec<AccountId> {
        vec![
            self.governance.clone(),
            self.management.clone(),
            self.guardian.clone(),
            self.strategist.clone(),
            self.keeper.clone(),
        ]
    }
}
