use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use collateral_rebalancer::{Decision, HarvestInputs, Host, RebalancerResult, Strategy};
use rebalancer_types::{AccountId, HarvestReport};

use crate::config::{KeeperConfig, RetryConfig, StrategySchedule};
use crate::error::{KeeperError, KeeperResult};
use crate::scheduler::{harvest_reason, Job};

/// A strategy the keeper can poll and call
pub trait KeeperTarget: Send {
    fn name(&self) -> &str;
    fn harvest_inputs(&self) -> RebalancerResult<HarvestInputs>;
    fn tend_trigger(&self) -> RebalancerResult<bool>;
    fn harvest(&mut self) -> RebalancerResult<HarvestReport>;
    fn tend(&mut self) -> RebalancerResult<Decision>;
}

impl<T: KeeperTarget + ?Sized> KeeperTarget for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn harvest_inputs(&self) -> RebalancerResult<HarvestInputs> {
        (**self).harvest_inputs()
    }

    fn tend_trigger(&self) -> RebalancerResult<bool> {
        (**self).tend_trigger()
    }

    fn harvest(&mut self) -> RebalancerResult<HarvestReport> {
        (**self).harvest()
    }

    fn tend(&mut self) -> RebalancerResult<Decision> {
        (**self).tend()
    }
}

/// Strategy driven under the keeper role
pub struct StrategyTarget<H: Host + Send> {
    strategy: Strategy<H>,
    keeper: AccountId,
}

impl<H: Host + Send> StrategyTarget<H> {
    pub fn new(strategy: Strategy<H>, keeper: AccountId) -> Self {
        Self { strategy, keeper }
    }

    pub fn strategy(&self) -> &Strategy<H> {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut Strategy<H> {
        &mut self.strategy
    }

    pub fn into_strategy(self) -> Strategy<H> {
        self.strategy
    }
}

impl<H: Host + Send> KeeperTarget for StrategyTarget<H> {
    fn name(&self) -> &str {
        self.strategy.name()
    }

    fn harvest_inputs(&self) -> RebalancerResult<HarvestInputs> {
        self.strategy.harvest_inputs()
    }

    fn tend_trigger(&self) -> RebalancerResult<bool> {
        self.strategy.tend_trigger()
    }

    fn harvest(&mut self) -> RebalancerResult<HarvestReport> {
        self.strategy.harvest(&self.keeper)
    }

    fn tend(&mut self) -> RebalancerResult<Decision> {
        self.strategy.tend(&self.keeper)
    }
}

/// Outcome of one polling pass, by strategy name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub harvested: Vec<String>,
    pub tended: Vec<String>,
    pub idle: Vec<String>,
    /// Disabled or waiting out a retry delay
    pub skipped: Vec<String>,
    /// Gave up after a non-retryable error or too many retries
    pub failed: Vec<String>,
}

impl TickSummary {
    pub fn calls(&self) -> usize {
        self.harvested.len() + self.tended.len()
    }
}

#[derive(Debug, Clone, Copy)]
struct Backoff {
    failures: u32,
    retry_at: DateTime<Utc>,
}

/// Polls each target on an interval and harvests or tends it when due
pub struct Keeper<T: KeeperTarget = Box<dyn KeeperTarget>> {
    config: KeeperConfig,
    targets: Vec<T>,
    backoff: HashMap<String, Backoff>,
}

impl<T: KeeperTarget> Keeper<T> {
    /// Create a keeper; every target needs a schedule in `config`
    pub fn new(config: KeeperConfig, targets: Vec<T>) -> KeeperResult<Self> {
        config.validate()?;
        for target in &targets {
            if config.schedule_for(target.name()).is_none() {
                return Err(KeeperError::UnknownStrategy(target.name().to_string()));
            }
        }

        Ok(Self {
            config,
            targets,
            backoff: HashMap::new(),
        })
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut [T] {
        &mut self.targets
    }

    pub fn into_targets(self) -> Vec<T> {
        self.targets
    }

    /// Strategies currently waiting out a retry delay
    pub fn backing_off(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backoff.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run one pass over every target
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickSummary {
        let mut summary = TickSummary::default();

        for target in self.targets.iter_mut() {
            let name = target.name().to_string();
            let Some(schedule) = self.config.schedule_for(&name) else {
                summary.skipped.push(name);
                continue;
            };

            if !schedule.enabled {
                debug!("Strategy {} disabled, skipping", name);
                summary.skipped.push(name);
                continue;
            }

            if let Some(backoff) = self.backoff.get(&name) {
                if now < backoff.retry_at {
                    debug!("Strategy {} backing off until {}", name, backoff.retry_at);
                    summary.skipped.push(name);
                    continue;
                }
            }

            match run_job(target, schedule) {
                Ok(job) => {
                    self.backoff.remove(&name);
                    match job {
                        Some(Job::Harvest) => summary.harvested.push(name),
                        Some(Job::Tend) => summary.tended.push(name),
                        None => summary.idle.push(name),
                    }
                }
                Err(err) => {
                    if record_failure(&mut self.backoff, &self.config.retry, &name, &err, now) {
                        summary.skipped.push(name);
                    } else {
                        summary.failed.push(name);
                    }
                }
            }
        }

        summary
    }

    /// Poll until `shutdown` flips to true or its sender is dropped; returns the number of passes
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> KeeperResult<u64> {
        let mut interval = tokio::time::interval(self.config.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0u64;

        info!(
            "Keeper started: {} strategies, polling every {}s",
            self.targets.len(),
            self.config.poll_interval_secs
        );

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Keeper shutting down after {} passes", passes);
                        break;
                    }
                }
                _ = interval.tick() => {
                    let summary = self.tick(Utc::now());
                    passes += 1;
                    if summary.calls() > 0 || !summary.failed.is_empty() {
                        info!("Pass {}: {}", passes, serde_json::to_string(&summary)?);
                    } else {
                        debug!("Pass {}: nothing to do", passes);
                    }
                }
            }
        }

        Ok(passes)
    }
}

fn run_job(target: &mut dyn KeeperTarget, schedule: &StrategySchedule) -> RebalancerResult<Option<Job>> {
    let inputs = target.harvest_inputs()?;
    if let Some(reason) = harvest_reason(&inputs, schedule) {
        let report = target.harvest()?;
        info!(
            "Harvested {} ({:?}): profit={} loss={} debt_payment={} outstanding={}",
            target.name(),
            reason,
            report.profit,
            report.loss,
            report.debt_payment,
            report.debt_outstanding
        );
        return Ok(Some(Job::Harvest));
    }

    if schedule.tend_enabled && target.tend_trigger()? {
        let decision = target.tend()?;
        info!(
            "Tended {}: state={:?} ratio={} action={:?}",
            target.name(),
            decision.state,
            decision.current_ratio,
            decision.action
        );
        return Ok(Some(Job::Tend));
    }

    Ok(None)
}

/// Book a failed job; returns true while the target is scheduled for a retry
fn record_failure(
    backoff: &mut HashMap<String, Backoff>,
    retry: &RetryConfig,
    name: &str,
    err: &collateral_rebalancer::RebalancerError,
    now: DateTime<Utc>,
) -> bool {
    if !err.is_retryable() {
        error!("Strategy {} failed: {}", name, err);
        backoff.remove(name);
        return false;
    }

    let failures = backoff.get(name).map_or(0, |b| b.failures) + 1;
    if failures > retry.max_retries {
        error!("Strategy {} failed after {} retries: {}", name, retry.max_retries, err);
        backoff.remove(name);
        return false;
    }

    let delay = retry.delay_for_attempt(failures - 1);
    let retry_at = now + chrono::Duration::milliseconds(delay.as_millis() as i64);
    warn!(
        "Strategy {} failed (attempt {}/{}), retrying in {:?}: {}",
        name, failures, retry.max_retries, delay, err
    );
    backoff.insert(name.to_string(), Backoff { failures, retry_at });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use collateral_rebalancer::{Action, HoldReason, PositionState, RebalancerError};
    use rebalancer_types::HostError;
    use tokio_test::assert_ok;

    /// Target whose harvest results are scripted
    struct ScriptedTarget {
        name: String,
        inputs: HarvestInputs,
        triggered: bool,
        harvests: VecDeque<RebalancerResult<HarvestReport>>,
        harvest_calls: usize,
        tend_calls: usize,
    }

    impl ScriptedTarget {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                inputs: HarvestInputs {
                    last_report: 0,
                    now: 100,
                    ..Default::default()
                },
                triggered: false,
                harvests: VecDeque::new(),
                harvest_calls: 0,
                tend_calls: 0,
            }
        }

        fn due(mut self) -> Self {
            self.inputs.now = 1_000_000;
            self
        }
    }

    impl KeeperTarget for ScriptedTarget {
        fn name(&self) -> &str {
            &self.name
        }

        fn harvest_inputs(&self) -> RebalancerResult<HarvestInputs> {
            Ok(self.inputs)
        }

        fn tend_trigger(&self) -> RebalancerResult<bool> {
            Ok(self.triggered)
        }

        fn harvest(&mut self) -> RebalancerResult<HarvestReport> {
            self.harvest_calls += 1;
            self.harvests.pop_front().unwrap_or(Ok(HarvestReport::default()))
        }

        fn tend(&mut self) -> RebalancerResult<Decision> {
            self.tend_calls += 1;
            Ok(Decision {
                state: PositionState::OverCollateralized,
                current_ratio: 0,
                action: Action::Hold(HoldReason::WithinBand),
            })
        }
    }

    fn config(names: &[&str]) -> KeeperConfig {
        KeeperConfig {
            poll_interval_secs: 1,
            retry: RetryConfig {
                max_retries: 2,
                base_delay_ms: 1_000,
                max_delay_ms: 10_000,
                backoff_multiplier: 2.0,
            },
            strategies: names
                .iter()
                .map(|name| StrategySchedule {
                    name: name.to_string(),
                    min_report_delay: 0,
                    max_report_delay: 86_400,
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn host_failure() -> RebalancerError {
        RebalancerError::Host(HostError::Market("node unavailable".to_string()))
    }

    #[test]
    fn test_new_rejects_unscheduled_target() {
        let targets: Vec<Box<dyn KeeperTarget>> = vec![Box::new(ScriptedTarget::new("other"))];
        let result = Keeper::new(config(&["A"]), targets);
        assert!(matches!(result, Err(KeeperError::UnknownStrategy(name)) if name == "other"));

        assert!(matches!(
            Keeper::new(KeeperConfig::default(), Vec::<Box<dyn KeeperTarget>>::new()),
            Err(KeeperError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tick_harvests_tends_or_idles() {
        let mut tendable = ScriptedTarget::new("tend");
        tendable.triggered = true;
        let targets: Vec<Box<dyn KeeperTarget>> = vec![
            Box::new(ScriptedTarget::new("harvest").due()),
            Box::new(tendable),
            Box::new(ScriptedTarget::new("idle")),
        ];
        let mut keeper = assert_ok!(Keeper::new(config(&["harvest", "tend", "idle"]), targets));

        let summary = keeper.tick(Utc::now());
        assert_eq!(summary.harvested, vec!["harvest"]);
        assert_eq!(summary.tended, vec!["tend"]);
        assert_eq!(summary.idle, vec!["idle"]);
        assert_eq!(summary.calls(), 2);
    }

    #[test]
    fn test_tend_disabled_by_schedule() {
        let mut tendable = ScriptedTarget::new("A");
        tendable.triggered = true;
        let mut config = config(&["A"]);
        config.strategies[0].tend_enabled = false;

        let mut keeper = assert_ok!(Keeper::new(config, vec![Box::new(tendable)]));
        assert_eq!(keeper.tick(Utc::now()).idle, vec!["A"]);
    }

    #[test]
    fn test_disabled_strategy_skipped() {
        let mut config = config(&["A"]);
        config.strategies[0].enabled = false;
        let mut keeper = assert_ok!(Keeper::new(config, vec![Box::new(ScriptedTarget::new("A").due())]));

        assert_eq!(keeper.tick(Utc::now()).skipped, vec!["A"]);
    }

    #[test]
    fn test_retryable_failure_backs_off_then_gives_up() {
        let mut target = ScriptedTarget::new("A").due();
        target.harvests = VecDeque::from(vec![Err(host_failure()), Err(host_failure()), Err(host_failure())]);
        let mut keeper = assert_ok!(Keeper::new(config(&["A"]), vec![Box::new(target)]));
        let start = Utc::now();

        // First failure: retry after 1s
        assert_eq!(keeper.tick(start).skipped, vec!["A"]);
        assert_eq!(keeper.backing_off(), vec!["A"]);
        assert_eq!(keeper.tick(start).skipped, vec!["A"]);

        // Second failure: retry after 2s more
        let second = start + chrono::Duration::seconds(1);
        assert_eq!(keeper.tick(second).skipped, vec!["A"]);
        assert_eq!(keeper.tick(second + chrono::Duration::seconds(1)).skipped, vec!["A"]);

        // Third failure exhausts max_retries
        let third = second + chrono::Duration::seconds(2);
        assert_eq!(keeper.tick(third).failed, vec!["A"]);
        assert!(keeper.backing_off().is_empty());

        // Script exhausted, next harvest succeeds
        assert_eq!(keeper.tick(third).harvested, vec!["A"]);
    }

    #[test]
    fn test_success_clears_backoff() {
        let mut target = ScriptedTarget::new("A").due();
        target.harvests = VecDeque::from(vec![Err(host_failure())]);
        let mut keeper = assert_ok!(Keeper::new(config(&["A"]), vec![Box::new(target)]));
        let start = Utc::now();

        keeper.tick(start);
        assert_eq!(keeper.tick(start + chrono::Duration::seconds(1)).harvested, vec!["A"]);
        assert!(keeper.backing_off().is_empty());
    }

    #[test]
    fn test_non_retryable_failure_not_retried() {
        let mut target = ScriptedTarget::new("A").due();
        target.harvests = VecDeque::from(vec![Err(RebalancerError::unauthorized(
            "keeper",
            rebalancer_types::Operation::Harvest,
        ))]);
        let mut keeper = assert_ok!(Keeper::new(config(&["A"]), vec![Box::new(target)]));

        assert_eq!(keeper.tick(Utc::now()).failed, vec!["A"]);
        assert!(keeper.backing_off().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut keeper = assert_ok!(Keeper::new(
            config(&["A"]),
            vec![Box::new(ScriptedTarget::new("A").due())]
        ));
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        // Interval fires immediately, then waits a full second
        let passes = assert_ok!(keeper.run(rx).await);
        assert_eq!(passes, 1);
    }

    #[tokio::test]
    async fn test_run_stops_when_sender_dropped() {
        let mut keeper = assert_ok!(Keeper::new(config(&["A"]), vec![Box::new(ScriptedTarget::new("A"))]));
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let passes = assert_ok!(keeper.run(rx).await);
        assert_eq!(passes, 0);
    }
}
