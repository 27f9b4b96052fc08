//! Keeper service for collateral rebalancer strategies
//!
//! Polls each configured strategy, harvests when the outer-vault heuristic
//! says a report is due and tends between harvests when the position drifts
//! out of its band. Failed calls are retried with exponential backoff.

pub mod config;
pub mod error;
pub mod keeper;
pub mod scheduler;

pub use self::config::{create_example_config, KeeperConfig, RetryConfig, StrategySchedule};
pub use self::error::{KeeperError, KeeperResult};
pub use self::keeper::{Keeper, KeeperTarget, StrategyTarget, TickSummary};
pub use self::scheduler::{harvest_due, harvest_reason, HarvestReason, Job};
