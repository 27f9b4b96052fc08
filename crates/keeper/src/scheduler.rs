//! Harvest heuristic
//!
//! Decides from a strategy's [`HarvestInputs`] whether a harvest is worth
//! calling now. Follows the usual outer-vault rules:
//!
//! 1. never inside `min_report_delay` of the last report;
//! 2. always once `max_report_delay` has passed;
//! 3. when outstanding debt exceeds `debt_threshold`;
//! 4. when the estimated assets trail the debt by more than `debt_threshold`;
//! 5. when profit plus available credit pays for the call `profit_factor` times.
//!
//! A strategy in emergency exit that still owes the vault is always due.

use serde::Serialize;

use collateral_rebalancer::HarvestInputs;

use crate::config::StrategySchedule;

/// Work the keeper can do for a strategy on one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Job {
    Harvest,
    Tend,
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Job::Harvest => write!(f, "harvest"),
            Job::Tend => write!(f, "tend"),
        }
    }
}

/// Reason a harvest was found due, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestReason {
    EmergencyExit,
    MaxReportDelay,
    DebtOutstanding,
    Loss,
    Profitable,
}

pub fn harvest_reason(inputs: &HarvestInputs, schedule: &StrategySchedule) -> Option<HarvestReason> {
    if inputs.emergency_exit && inputs.total_debt > 0 {
        return Some(HarvestReason::EmergencyExit);
    }

    let elapsed = inputs.seconds_since_report();
    if elapsed < schedule.min_report_delay {
        return None;
    }
    if elapsed >= schedule.max_report_delay {
        return Some(HarvestReason::MaxReportDelay);
    }

    let threshold = schedule.debt_threshold as u128;
    if inputs.debt_outstanding > threshold {
        return Some(HarvestReason::DebtOutstanding);
    }

    if inputs.estimated_total_assets.saturating_add(threshold) < inputs.total_debt {
        return Some(HarvestReason::Loss);
    }

    let call_cost = (schedule.profit_factor as u128).saturating_mul(schedule.harvest_call_cost as u128);
    if call_cost < inputs.credit_available.saturating_add(inputs.profit()) {
        return Some(HarvestReason::Profitable);
    }

    None
}

pub fn harvest_due(inputs: &HarvestInputs, schedule: &StrategySchedule) -> bool {
    harvest_reason(inputs, schedule).is_some()
}
