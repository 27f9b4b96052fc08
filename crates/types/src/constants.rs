/// Constants shared across the rebalancer crates

// ============================================================================
// Fixed-Point Scales
// ============================================================================

/// WAD fixed-point scale: 1e18 represents 1.0 (and a 100% ratio)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Basis points denominator (10,000 = 100%)
pub const MAX_BPS: u128 = 10_000;

/// One gwei expressed in wei
pub const GWEI: u128 = 1_000_000_000;

// ============================================================================
// Strategy Parameter Defaults
// ============================================================================

/// Default target collateralization ratio (163%)
pub const DEFAULT_TARGET_COLLATERAL_RATIO: u128 = 1_630_000_000_000_000_000;

/// Default rebalance tolerance, absolute (1%)
pub const DEFAULT_REBALANCE_TOLERANCE: u128 = 10_000_000_000_000_000;

/// Default base fee ceiling for non-essential rebalances
pub const DEFAULT_MAX_ACCEPTABLE_BASE_FEE: u128 = 100 * GWEI;

/// Default maximum loss accepted when redeeming yield-vault shares (0.01%)
pub const DEFAULT_MAX_LOSS_BPS: u128 = 1;

/// Default slippage allowed when swapping debt token into want (1%)
pub const DEFAULT_MAX_SWAP_SLIPPAGE_BPS: u128 = 100;

// ============================================================================
// Limits
// ============================================================================

/// Largest supported token decimals (10^38 still fits in u128)
pub const MAX_TOKEN_DECIMALS: u8 = 38;
