//! Migration to a successor strategy

use collateral_rebalancer::host::{LendingMarket, TokenWallet, YieldVault};
use collateral_rebalancer::{RebalancerError, Strategy};
use rebalancer_simulation::{SimSetup, TestEnvironment};
use rebalancer_types::{AccountId, Operation, StrategyParams, WAD};

fn funded_environment(setup: SimSetup) -> anyhow::Result<TestEnvironment> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = TestEnvironment::with_setup(setup, StrategyParams::default())?;
    env.deposit(10 * WAD)?;
    env.harvest()?;
    Ok(env)
}

#[test]
fn test_migration_hands_over_everything() -> anyhow::Result<()> {
    let mut env = funded_environment(SimSetup::default())?;
    let vault = env.accounts.vault.clone();
    let successor = AccountId::new("strategy-v2");

    let receipt = env.strategy.migrate(&vault, &successor)?;

    assert!(receipt.is_clean());
    assert_eq!(receipt.want_transferred, 10 * WAD);
    assert_eq!(env.host().current_debt(), 0);
    assert_eq!(env.host().current_collateral(), 0);
    assert_eq!(env.strategy.balance_of_want(), 0);
    assert_eq!(env.host().share_balance(), 0);

    let want = env.host().tokens.want.clone();
    assert_eq!(env.host().balance(&successor, &want), 10 * WAD);
    Ok(())
}

#[test]
fn test_successor_rebuilds_position() -> anyhow::Result<()> {
    let mut env = funded_environment(SimSetup::default())?;
    let vault = env.accounts.vault.clone();
    let successor = AccountId::new("strategy-v2");
    let debt_before = env.host().current_debt();

    env.strategy.migrate(&vault, &successor)?;
    let host = env.host_mut().fork_for_successor(&successor);
    let config = TestEnvironment::strategy_config(&env.accounts, &host.tokens, *env.strategy.params());
    let mut next = Strategy::new(config, host)?;

    assert_eq!(next.balance_of_want(), 10 * WAD);
    let gov = env.accounts.governance.clone();
    next.host_mut().advance_time(1);
    let report = next.harvest(&gov)?;

    assert_eq!(report.profit, 0);
    assert_eq!(report.loss, 0);
    assert_eq!(next.host().current_collateral(), 10 * WAD);
    assert_eq!(next.host().current_debt(), debt_before);
    assert_eq!(next.host().balance_of(&next.config().want_token), 0);

    // The old strategy no longer owes the vault anything
    assert_eq!(env.host().outer_vault.total_debt, 0);
    Ok(())
}

#[test]
fn test_migration_with_opening_fee_reports_residual_debt() -> anyhow::Result<()> {
    let mut env = funded_environment(SimSetup {
        borrow_opening_fee_bps: 50,
        ..Default::default()
    })?;
    let vault = env.accounts.vault.clone();
    let successor = AccountId::new("strategy-v2");

    let receipt = env.strategy.migrate(&vault, &successor)?;

    // Invested funds cover the borrowed amount but not the fee
    assert!(!receipt.is_clean());
    assert!(receipt.residual_debt > 0);
    assert!(receipt.residual_collateral > 0);
    assert_eq!(receipt.residual_debt, env.host().current_debt());
    assert!(receipt.want_transferred > 9 * WAD);
    Ok(())
}

#[test]
fn test_only_the_vault_can_migrate() -> anyhow::Result<()> {
    let mut env = funded_environment(SimSetup::default())?;
    let gov = env.accounts.governance.clone();
    let successor = AccountId::new("strategy-v2");

    match env.strategy.migrate(&gov, &successor) {
        Err(RebalancerError::Unauthorized { operation, .. }) => assert_eq!(operation, Operation::Migrate),
        other => panic!("governance migrated: {:?}", other),
    }
    assert!(env.host().current_debt() > 0);
    Ok(())
}
