use std::fmt;
use thiserror::Error;

use crate::roles::Operation;

// ============================================================================
// Main Error Enum
// ============================================================================

/// Error enum for every rebalancer entry point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RebalancerError {
    // ========================================================================
    // Access Control Errors
    // ========================================================================

    /// Caller holds no role allowed to perform the operation
    #[error("Unauthorized: {caller} may not perform {operation}")]
    Unauthorized { caller: String, operation: Operation },

    // ========================================================================
    // Parameter Errors
    // ========================================================================

    /// A parameter update would break a strategy invariant
    #[error("Constraint violation: {0}")]
    ConstraintViolation(ConstraintViolation),

    /// Configuration rejected at construction time
    #[error("Invalid configuration for {component}: {reason}")]
    InvalidConfiguration { component: String, reason: String },

    // ========================================================================
    // Liquidity Errors
    // ========================================================================

    /// Not enough funds to honour a repayment or withdrawal
    #[error("Insufficient liquidity: need {required}, have {available}")]
    InsufficientLiquidity { required: u128, available: u128 },

    /// Token is protected from sweeping
    #[error("Protected asset cannot be swept: {token}")]
    ProtectedAsset { token: String },

    // ========================================================================
    // Collaborator Errors
    // ========================================================================

    /// A collaborator call failed; the pass is rolled back
    #[error("Host call failed: {0}")]
    Host(#[from] HostError),

    // ========================================================================
    // Math Errors
    // ========================================================================

    /// Arithmetic overflow occurred
    #[error("Math overflow in '{operation}'")]
    MathOverflow { operation: String },

    /// Division by zero
    #[error("Division by zero in context: {context}")]
    DivisionByZero { context: String },
}

/// Parameter invariants checked on every update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// target - tolerance dips under the market liquidation ratio
    RatioBelowLiquidation {
        target: u128,
        tolerance: u128,
        liquidation_ratio: u128,
    },
    /// tolerance is not strictly smaller than the target
    ToleranceExceedsTarget { target: u128, tolerance: u128 },
    /// max loss above 100%
    MaxLossTooHigh { max_loss_bps: u128 },
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintViolation::RatioBelowLiquidation { target, tolerance, liquidation_ratio } => write!(
                f,
                "target {} minus tolerance {} is below liquidation ratio {}",
                target, tolerance, liquidation_ratio
            ),
            ConstraintViolation::ToleranceExceedsTarget { target, tolerance } => {
                write!(f, "tolerance {} must be below target {}", tolerance, target)
            }
            ConstraintViolation::MaxLossTooHigh { max_loss_bps } => {
                write!(f, "max loss {} bps exceeds 10000", max_loss_bps)
            }
        }
    }
}

// ============================================================================
// Collaborator Errors
// ============================================================================

/// Failure reported by one of the external collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("lending market: {0}")]
    Market(String),

    #[error("yield vault: {0}")]
    Vault(String),

    #[error("price oracle: {0}")]
    Oracle(String),

    #[error("token transfer: {0}")]
    Transfer(String),

    #[error("swap: {0}")]
    Swap(String),

    #[error("outer vault report: {0}")]
    Report(String),
}

// ============================================================================
// Helper Constructors
// ============================================================================

impl RebalancerError {
    pub fn unauthorized(caller: impl fmt::Display, operation: Operation) -> Self {
        RebalancerError::Unauthorized {
            caller: caller.to_string(),
            operation,
        }
    }

    pub fn insufficient_liquidity(required: u128, available: u128) -> Self {
        RebalancerError::InsufficientLiquidity { required, available }
    }

    pub fn math_overflow(operation: &str) -> Self {
        RebalancerError::MathOverflow {
            operation: operation.to_string(),
        }
    }

    pub fn division_by_zero(context: &str) -> Self {
        RebalancerError::DivisionByZero {
            context: context.to_string(),
        }
    }

    pub fn invalid_configuration(component: &str, reason: impl Into<String>) -> Self {
        RebalancerError::InvalidConfiguration {
            component: component.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures that leave the strategy untouched and may succeed on a later pass
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RebalancerError::Host(_) | RebalancerError::InsufficientLiquidity { .. }
        )
    }
}

impl From<ConstraintViolation> for RebalancerError {
    fn from(violation: ConstraintViolation) -> Self {
        RebalancerError::ConstraintViolation(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RebalancerError::insufficient_liquidity(100, 40);
        assert_eq!(err.to_string(), "Insufficient liquidity: need 100, have 40");

        let err = RebalancerError::unauthorized("alice", Operation::Sweep);
        assert_eq!(err.to_string(), "Unauthorized: alice may not perform sweep");
    }

    #[test]
    fn test_host_errors_convert_and_retry() {
        let err: RebalancerError = HostError::Market("paused".into()).into();
        assert!(matches!(err, RebalancerError::Host(HostError::Market(_))));
        assert!(err.is_retryable());
        assert!(!RebalancerError::from(ConstraintViolation::MaxLossTooHigh { max_loss_bps: 10_001 })
            .is_retryable());
    }
}
