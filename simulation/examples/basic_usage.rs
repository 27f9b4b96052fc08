/// Basic usage example for the collateral rebalancer simulation framework
///
/// This example demonstrates:
/// - Opening a position through the outer vault and a first harvest
/// - Re-balancing after collateral price moves
/// - Realising yield-vault profit on harvest
/// - Emergency debt repayment and a vault withdrawal
use collateral_rebalancer::host::{LendingMarket, YieldVault};
use rebalancer_simulation::{PositionReport, ScenarioRunner, SimSetup, SimulationError, SimulationResult};
use rebalancer_types::{StrategyParams, WAD};

fn main() -> SimulationResult<()> {
    env_logger::init();

    println!("Collateral Rebalancer Simulation - Basic Usage");
    println!("==============================================\n");

    // Step 1: Deploy against a market with a 5k debt floor
    println!("1. Creating simulation environment...");
    let setup = SimSetup {
        debt_floor: 5_000 * WAD,
        ..Default::default()
    };
    println!("   - Collateral price: {}", display_wad(setup.price));
    println!("   - Liquidation ratio: {}", display_wad(setup.liquidation_ratio));
    println!("   - Debt floor: {}\n", display_wad(setup.debt_floor));
    let mut runner = ScenarioRunner::new(setup, StrategyParams::default())?;

    // Step 2: Open the position
    println!("2. Depositing 10 want and harvesting...");
    print_report(runner.run_deposit_and_harvest(10 * WAD)?);

    // Step 3: Price moves in both directions
    println!("3. Price rises 10%, tend mints more debt...");
    print_report(runner.run_price_move(3_300 * WAD)?);
    println!("4. Price falls to 2,700, tend repays debt...");
    print_report(runner.run_price_move(2_700 * WAD)?);

    // Step 4: Yield
    println!("5. Yield vault earns 2%, harvest realises it...");
    let gain = runner.env.host().yield_vault.total_assets / 50;
    print_report(runner.run_yield_cycle(gain)?);
    println!("   - Outer vault total assets: {}\n", display_wad(runner.env.host().outer_total_assets()));

    // Step 5: Emergency repayment by management
    println!("6. Management scales debt down to 70%...");
    let management = runner.env.accounts.management.clone();
    let ratio = runner.env.strategy.params().target_collateral_ratio * 7 / 10;
    let repaid = runner.env.strategy.emergency_debt_repayment(&management, ratio)?;
    println!("   - Repaid: {}", display_wad(repaid));
    print_report(runner.record("emergency_repayment")?);

    // Step 6: Withdraw part of the funds
    println!("7. Vault withdraws 4 want...");
    print_report(runner.run_withdrawal(4 * WAD)?);

    let host = runner.env.host();
    if host.current_debt() > 0 && host.current_debt() < 5_000 * WAD {
        return Err(SimulationError::InvalidParameter("debt left under the floor".into()));
    }
    println!(
        "Final position: {} collateral, {} debt, {} yield-vault shares",
        display_wad(host.current_collateral()),
        display_wad(host.current_debt()),
        display_wad(host.share_balance())
    );

    println!("\nBasic usage example completed successfully!");
    Ok(())
}

fn print_report(report: &PositionReport) {
    println!("   - Step: {}", report.step);
    println!("   - Collateral: {}", display_wad(report.collateral));
    println!("   - Debt: {}", display_wad(report.debt));
    println!("   - Ratio: {}", display_wad(report.ratio));
    println!("   - Estimated total assets: {}\n", display_wad(report.estimated_total_assets));
}

fn display_wad(value: u128) -> String {
    format!("{:.4}", value as f64 / WAD as f64)
}
