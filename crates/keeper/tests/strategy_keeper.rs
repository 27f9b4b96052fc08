//! Keeper passes against a strategy running on the in-memory host

use chrono::{Duration, TimeZone, Utc};
use collateral_rebalancer::host::LendingMarket;
use rebalancer_keeper::{Keeper, KeeperConfig, KeeperTarget, RetryConfig, StrategySchedule, StrategyTarget};
use rebalancer_simulation::{FailPoint, SimHost, TestEnvironment};
use rebalancer_types::{AccountId, WAD};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn keeper_config() -> KeeperConfig {
    KeeperConfig {
        poll_interval_secs: 60,
        retry: RetryConfig::default(),
        strategies: vec![StrategySchedule {
            name: "StrategyMIMyvWETH".to_string(),
            min_report_delay: 0,
            max_report_delay: 86_400,
            debt_threshold: 1_000_000_000_000_000,
            profit_factor: 100,
            harvest_call_cost: 1_000_000_000_000_000,
            ..Default::default()
        }],
    }
}

/// Funded strategy wrapped for the keeper, plus the guardian account
fn keeper_with_deposit(amount: u128) -> anyhow::Result<(Keeper<StrategyTarget<SimHost>>, AccountId)> {
    let mut env = TestEnvironment::new()?;
    env.deposit(amount)?;

    let TestEnvironment { accounts, strategy } = env;
    let target = StrategyTarget::new(strategy, accounts.keeper.clone());
    let keeper = Keeper::new(keeper_config(), vec![target])?;
    Ok((keeper, accounts.guardian))
}

fn target(keeper: &mut Keeper<StrategyTarget<SimHost>>) -> &mut StrategyTarget<SimHost> {
    &mut keeper.targets_mut()[0]
}

#[test]
fn test_first_pass_harvests_available_credit() -> anyhow::Result<()> {
    init_logger();
    let (mut keeper, _) = keeper_with_deposit(10 * WAD)?;
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    let summary = keeper.tick(now);
    assert_eq!(summary.harvested, vec!["StrategyMIMyvWETH"]);

    let inputs = keeper.targets()[0].harvest_inputs()?;
    assert_eq!(inputs.total_debt, 10 * WAD);
    assert_eq!(inputs.credit_available, 0);
    assert!(target(&mut keeper).strategy().host().current_debt() > 0);

    // Position sits at target, nothing left to do
    let summary = keeper.tick(now + Duration::seconds(60));
    assert_eq!(summary.idle, vec!["StrategyMIMyvWETH"]);
    Ok(())
}

#[test]
fn test_price_move_is_tended() -> anyhow::Result<()> {
    init_logger();
    let (mut keeper, _) = keeper_with_deposit(10 * WAD)?;
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    keeper.tick(now);

    let debt_before = target(&mut keeper).strategy().host().current_debt();
    target(&mut keeper).strategy_mut().host_mut().price = 3_300 * WAD;

    let summary = keeper.tick(now + Duration::seconds(60));
    assert_eq!(summary.tended, vec!["StrategyMIMyvWETH"]);

    let debt_after = target(&mut keeper).strategy().host().current_debt();
    let growth = debt_after as f64 / debt_before as f64;
    assert!((growth - 1.1).abs() < 1e-6, "debt grew by {}", growth);
    Ok(())
}

#[test]
fn test_emergency_exit_forces_harvest() -> anyhow::Result<()> {
    init_logger();
    let (mut keeper, guardian) = keeper_with_deposit(10 * WAD)?;
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    keeper.tick(now);

    target(&mut keeper).strategy_mut().set_emergency_exit(&guardian)?;

    let summary = keeper.tick(now + Duration::seconds(60));
    assert_eq!(summary.harvested, vec!["StrategyMIMyvWETH"]);

    let inputs = keeper.targets()[0].harvest_inputs()?;
    assert_eq!(inputs.total_debt, 0);
    assert!(inputs.emergency_exit);
    assert_eq!(target(&mut keeper).strategy().host().current_debt(), 0);

    // Nothing owed any more
    let summary = keeper.tick(now + Duration::seconds(120));
    assert_eq!(summary.idle, vec!["StrategyMIMyvWETH"]);
    Ok(())
}

#[test]
fn test_oracle_outage_backs_off_and_recovers() -> anyhow::Result<()> {
    init_logger();
    let (mut keeper, _) = keeper_with_deposit(10 * WAD)?;
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    keeper.tick(now);

    target(&mut keeper).strategy_mut().host_mut().fail_on(FailPoint::Oracle);
    let summary = keeper.tick(now + Duration::seconds(60));
    assert_eq!(summary.skipped, vec!["StrategyMIMyvWETH"]);
    assert_eq!(keeper.backing_off(), vec!["StrategyMIMyvWETH"]);

    target(&mut keeper).strategy_mut().host_mut().clear_failures();
    target(&mut keeper).strategy_mut().host_mut().price = 3_300 * WAD;

    // Still inside the retry delay
    let summary = keeper.tick(now + Duration::milliseconds(60_500));
    assert_eq!(summary.skipped, vec!["StrategyMIMyvWETH"]);

    let summary = keeper.tick(now + Duration::seconds(62));
    assert_eq!(summary.tended, vec!["StrategyMIMyvWETH"]);
    assert!(keeper.backing_off().is_empty());
    Ok(())
}

#[test]
fn test_unknown_strategy_rejected() -> anyhow::Result<()> {
    let env = TestEnvironment::new()?;
    let TestEnvironment { accounts, strategy } = env;

    let mut config = keeper_config();
    config.strategies[0].name = "StrategyDAIyvYFI".to_string();

    let result = Keeper::new(config, vec![StrategyTarget::new(strategy, accounts.keeper)]);
    assert!(matches!(result, Err(rebalancer_keeper::KeeperError::UnknownStrategy(_))));
    Ok(())
}
