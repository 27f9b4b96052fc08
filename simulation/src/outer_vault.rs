/// Simulated outer vault: lends want to one strategy and books its reports.
///
/// Follows the usual debt-ratio accounting: the strategy may hold up to
/// `debt_ratio_bps` of the vault's total assets. Anything above that is
/// outstanding and is collected on the next report.

use rebalancer_math::mul_div_down;
use rebalancer_types::{AccountId, HostError, MAX_BPS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimOuterVault {
    pub account: AccountId,
    /// Want lent to the strategy
    pub total_debt: u128,
    pub debt_ratio_bps: u128,
    pub last_report: u64,
    pub total_gain: u128,
    pub total_loss: u128,
    pub revoked: bool,
}

impl Default for SimOuterVault {
    fn default() -> Self {
        Self {
            account: AccountId::new("vault"),
            total_debt: 0,
            debt_ratio_bps: MAX_BPS,
            last_report: 0,
            total_gain: 0,
            total_loss: 0,
            revoked: false,
        }
    }
}

impl SimOuterVault {
    /// Idle want plus what the strategy owes
    pub fn total_assets(&self, idle: u128) -> u128 {
        idle.saturating_add(self.total_debt)
    }

    pub fn debt_limit(&self, idle: u128) -> u128 {
        if self.revoked {
            return 0;
        }
        mul_div_down(self.total_assets(idle), self.debt_ratio_bps, MAX_BPS).unwrap_or(0)
    }

    pub fn debt_outstanding(&self, idle: u128) -> u128 {
        self.total_debt.saturating_sub(self.debt_limit(idle))
    }

    pub fn credit_available(&self, idle: u128) -> u128 {
        self.debt_limit(idle).saturating_sub(self.total_debt).min(idle)
    }

    /// Book a report. Returns (want to pull from the strategy, want to push
    /// to it, debt outstanding afterwards).
    pub fn book_report(
        &mut self,
        gain: u128,
        loss: u128,
        debt_payment: u128,
        idle: u128,
        now: u64,
    ) -> Result<(u128, u128, u128), HostError> {
        if loss > self.total_debt {
            return Err(HostError::Report(format!(
                "loss {} exceeds strategy debt {}",
                loss, self.total_debt
            )));
        }
        self.total_debt -= loss;
        self.total_loss = self.total_loss.saturating_add(loss);
        self.total_gain = self.total_gain.saturating_add(gain);

        let credit = self.credit_available(idle);
        let outstanding = self.debt_outstanding(idle);
        let debt_payment = debt_payment.min(outstanding);
        self.total_debt -= debt_payment;
        self.total_debt = self.total_debt.saturating_add(credit);

        let available = gain.saturating_add(debt_payment);
        let (pull, push) = if available >= credit {
            (available - credit, 0)
        } else {
            (0, credit - available)
        };

        self.last_report = now;
        let remaining = if self.revoked {
            self.total_debt
        } else {
            outstanding - debt_payment
        };
        Ok((pull, push, remaining))
    }
}
