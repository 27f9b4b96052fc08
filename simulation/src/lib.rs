/// Simulation framework for testing the collateral rebalancer
///
/// Provides utilities for:
/// - An in-memory host implementing every collaborator trait
/// - Standard role accounts and token identifiers
/// - Failure injection to exercise rollback
/// - Scenario helpers that record the position step by step
pub mod account_factory;
pub mod lending_market;
pub mod outer_vault;
pub mod scenario_runner;
pub mod swap_simulator;
pub mod test_environment;
pub mod token_factory;
pub mod yield_vault;

pub use account_factory::TestAccounts;
pub use lending_market::SimLendingMarket;
pub use outer_vault::SimOuterVault;
pub use scenario_runner::{PositionReport, ScenarioRunner};
pub use swap_simulator::SwapSimulator;
pub use test_environment::{FailPoint, SimHost, SimSetup, TestEnvironment};
pub use token_factory::{TestTokens, TokenLedger};
pub use yield_vault::SimYieldVault;

/// Simulation error type
#[derive(thiserror::Error, Debug)]
pub enum SimulationError {
    #[error("Strategy error: {0}")]
    Strategy(#[from] rebalancer_types::RebalancerError),

    #[error("Host error: {0}")]
    Host(#[from] rebalancer_types::HostError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Simulation result type
pub type SimulationResult<T> = std::result::Result<T, SimulationError>;
