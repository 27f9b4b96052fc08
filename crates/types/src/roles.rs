//! Roles, operations and the capability table consulted by every
//! mutating entry point.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque account identifier as used by the host ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        AccountId(id.to_string())
    }
}

/// Token identifier (symbol or address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        TokenId(id.into())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(id: &str) -> Self {
        TokenId(id.to_string())
    }
}

// ============================================================================
// Roles and Operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Governance,
    Management,
    Guardian,
    Strategist,
    Keeper,
    /// The outer asset-management vault
    Vault,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Governance,
        Role::Management,
        Role::Guardian,
        Role::Strategist,
        Role::Keeper,
        Role::Vault,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Harvest,
    Tend,
    UpdateParams,
    EmergencyDebtRepayment,
    RepayWithIdleBalance,
    SetEmergencyExit,
    Sweep,
    Withdraw,
    Migrate,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Harvest => "harvest",
            Operation::Tend => "tend",
            Operation::UpdateParams => "update_params",
            Operation::EmergencyDebtRepayment => "emergency_debt_repayment",
            Operation::RepayWithIdleBalance => "repay_with_idle_balance",
            Operation::SetEmergencyExit => "set_emergency_exit",
            Operation::Sweep => "sweep",
            Operation::Withdraw => "withdraw",
            Operation::Migrate => "migrate",
        };
        f.write_str(name)
    }
}

/// Capability table: which role may perform which operation
pub fn is_allowed(operation: Operation, role: Role) -> bool {
    use Operation::*;
    use Role::*;

    match operation {
        Harvest | Tend => matches!(role, Governance | Management | Guardian | Strategist | Keeper),
        UpdateParams | EmergencyDebtRepayment | RepayWithIdleBalance => {
            matches!(role, Governance | Management)
        }
        SetEmergencyExit => matches!(role, Governance | Management | Guardian | Strategist),
        Sweep => role == Governance,
        Withdraw | Migrate => role == Vault,
    }
}

// ============================================================================
// Role Assignments
// ============================================================================

/// Accounts holding each role. One account may hold several roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignments {
    pub governance: AccountId,
    pub management: AccountId,
    pub guardian: AccountId,
    pub strategist: AccountId,
    pub keeper: AccountId,
    pub vault: AccountId,
}

impl RoleAssignments {
    pub fn account_for(&self, role: Role) -> &AccountId {
        match role {
            Role::Governance => &self.governance,
            Role::Management => &self.management,
            Role::Guardian => &self.guardian,
            Role::Strategist => &self.strategist,
            Role::Keeper => &self.keeper,
            Role::Vault => &self.vault,
        }
    }

    /// True if any role held by `account` grants `operation`
    pub fn can_perform(&self, account: &AccountId, operation: Operation) -> bool {
        Role::ALL
            .iter()
            .any(|role| self.account_for(*role) == account && is_allowed(operation, *role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignments() -> RoleAssignments {
        RoleAssignments {
            governance: "gov".into(),
            management: "mgmt".into(),
            guardian: "guardian".into(),
            strategist: "strategist".into(),
            keeper: "keeper".into(),
            vault: "vault".into(),
        }
    }

    #[test]
    fn test_capability_table() {
        assert!(is_allowed(Operation::Harvest, Role::Keeper));
        assert!(!is_allowed(Operation::Harvest, Role::Vault));
        assert!(is_allowed(Operation::EmergencyDebtRepayment, Role::Management));
        assert!(!is_allowed(Operation::EmergencyDebtRepayment, Role::Strategist));
        assert!(!is_allowed(Operation::EmergencyDebtRepayment, Role::Guardian));
        assert!(is_allowed(Operation::SetEmergencyExit, Role::Guardian));
        assert!(!is_allowed(Operation::SetEmergencyExit, Role::Keeper));
        assert!(is_allowed(Operation::Sweep, Role::Governance));
        assert!(!is_allowed(Operation::Sweep, Role::Management));
        assert!(is_allowed(Operation::Withdraw, Role::Vault));
        assert!(!is_allowed(Operation::Migrate, Role::Governance));
    }

    #[test]
    fn test_shared_account_accumulates_roles() {
        let mut roles = assignments();
        roles.vault = "guardian".into();

        let guardian = AccountId::from("guardian");
        assert!(roles.can_perform(&guardian, Operation::SetEmergencyExit));
        assert!(roles.can_perform(&guardian, Operation::Withdraw));
        assert!(!roles.can_perform(&guardian, Operation::Sweep));
        assert!(!roles.can_perform(&AccountId::from("vault"), Operation::Withdraw));
        assert!(!roles.can_perform(&AccountId::from("stranger"), Operation::Tend));
    }
}
