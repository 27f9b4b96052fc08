use serde::{Deserialize, Serialize};

use rebalancer_types::{
    RebalancerError, RebalancerResult, RoleAssignments, StrategyParams, TokenId,
    DEFAULT_MAX_SWAP_SLIPPAGE_BPS, MAX_BPS, MAX_TOKEN_DECIMALS,
};

/// Strategy configuration, usually loaded from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Name used in logs
    pub name: String,

    /// Collateral token the outer vault lends
    pub want_token: TokenId,

    /// Stablecoin borrowed from the lending market
    pub debt_token: TokenId,

    /// Share token of the yield vault the debt token is invested in
    pub yield_vault_token: TokenId,

    /// Share token of the outer vault
    pub vault_share_token: TokenId,

    pub want_decimals: u8,

    pub roles: RoleAssignments,

    #[serde(default)]
    pub params: StrategyParams,

    /// Slippage accepted when swapping debt-token profit into want
    #[serde(default = "default_max_swap_slippage_bps")]
    pub max_swap_slippage_bps: u128,
}

fn default_max_swap_slippage_bps() -> u128 {
    DEFAULT_MAX_SWAP_SLIPPAGE_BPS
}

impl StrategyConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(content: &str) -> RebalancerResult<Self> {
        toml::from_str(content)
            .map_err(|e| RebalancerError::invalid_configuration("strategy", format!("failed to parse: {}", e)))
    }

    /// Checks that do not need the market
    pub fn validate(&self) -> RebalancerResult<()> {
        if self.name.is_empty() {
            return Err(RebalancerError::invalid_configuration("strategy", "name must not be empty"));
        }

        if self.want_decimals > MAX_TOKEN_DECIMALS {
            return Err(RebalancerError::invalid_configuration(
                "want_decimals",
                format!("{} exceeds {}", self.want_decimals, MAX_TOKEN_DECIMALS),
            ));
        }

        if self.max_swap_slippage_bps > MAX_BPS {
            return Err(RebalancerError::invalid_configuration(
                "max_swap_slippage_bps",
                format!("{} exceeds {}", self.max_swap_slippage_bps, MAX_BPS),
            ));
        }

        let tokens = [
            &self.want_token,
            &self.debt_token,
            &self.yield_vault_token,
            &self.vault_share_token,
        ];
        for (i, a) in tokens.iter().enumerate() {
            if tokens[i + 1..].contains(a) {
                return Err(RebalancerError::invalid_configuration(
                    "tokens",
                    format!("token {} configured twice", a),
                ));
            }
        }

        Ok(())
    }

    /// Tokens that may never be swept
    pub fn protected_tokens(&self) -> [&TokenId; 4] {
        [
            &self.want_token,
            &self.vault_share_token,
            &self.debt_token,
            &self.yield_vault_token,
        ]
    }
}
