mod common;

use alloy::primitives::U256;
use common::*;
use cross_venue_arb::errors::{ArbError, CircuitBreaker};
use cross_venue_arb::types::{CapitalAccount, Opportunity, PerformanceStats, USDC_BASE, USDBC_BASE, WETH_BASE};
use cross_venue_arb::utils::units;
use cross_venue_arb::venues::VenueConfig;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn configuration_is_owner_only() {
    let manager = manager(10, 50);

    let err = manager.deposit_capital(STRANGER, USDC_BASE, units(1)).await.unwrap_err();
    assert!(matches!(err, ArbError::UnauthorizedCaller { caller } if caller == STRANGER));
    assert!(manager.set_min_profit_bps(STRANGER, 5).await.is_err());
    assert!(manager.set_min_discrepancy_bps(STRANGER, 5).await.is_err());
    assert!(manager.set_max_capital_per_arbitrage(STRANGER, USDC_BASE, units(1)).await.is_err());
    assert!(manager.set_executor(STRANGER, STRANGER, true).await.is_err());
    assert!(manager.withdraw_capital(STRANGER, USDC_BASE, U256::ZERO).await.is_err());

    assert!(manager.set_min_profit_bps(OWNER, 10_001).await.is_err());
    manager.set_min_profit_bps(OWNER, 25).await.unwrap();
    assert_eq!(manager.risk_settings().await.min_profit_bps, 25);
}

#[tokio::test]
async fn execution_requires_authorized_executor() {
    let manager = manager(10, 50);
    assert!(matches!(
        manager.scan_all_strategies(STRANGER).await,
        Err(ArbError::UnauthorizedCaller { .. })
    ));

    manager.set_executor(OWNER, STRANGER, true).await.unwrap();
    assert!(manager.scan_all_strategies(STRANGER).await.unwrap().is_none());

    manager.set_executor(OWNER, STRANGER, false).await.unwrap();
    assert!(!manager.is_executor(STRANGER).await);
}

#[tokio::test]
async fn withdraw_beyond_available_fails_and_keeps_balance() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(1_000)).await.unwrap();

    let err = manager.withdraw_capital(OWNER, USDC_BASE, units(1_001)).await.unwrap_err();
    assert!(matches!(err, ArbError::InsufficientCapital { .. }));
    assert_eq!(manager.get_capital_status(USDC_BASE).await.available, units(1_000));

    manager.withdraw_capital(OWNER, USDC_BASE, units(250)).await.unwrap();
    let account = manager.capital_account(USDC_BASE).await;
    assert_eq!(account.available, units(750));
    assert!(account.is_conserved());
}

#[tokio::test]
async fn capital_status_reports_trade_share() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(10_000)).await.unwrap();
    manager.set_max_capital_per_arbitrage(OWNER, USDC_BASE, units(1_000)).await.unwrap();

    let status = manager.get_capital_status(USDC_BASE).await;
    assert_eq!(status.available, units(10_000));
    assert_eq!(status.max_per_trade, units(1_000));
    assert_eq!(status.utilization_bps, 1_000);

    assert_eq!(manager.get_capital_status(USDBC_BASE).await.utilization_bps, 0);
}

#[tokio::test]
async fn execution_beyond_available_is_rejected_up_front() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(1_000)).await.unwrap();
    let cheap = venue("cheap", dec!(2.0), DEEP);
    let expensive = venue("expensive", dec!(2.2), DEEP);

    let err = manager
        .execute_arbitrage(OWNER, &opportunity(&cheap, &expensive), units(2_000), U256::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, ArbError::InsufficientCapital { .. }));
    assert_eq!(manager.get_capital_status(USDC_BASE).await.available, units(1_000));
    assert_eq!(manager.get_performance_stats(USDC_BASE).await, PerformanceStats::default());
}

#[tokio::test]
async fn discrepancy_below_minimum_is_not_executable() {
    let manager = manager(0, 100);
    manager.deposit_capital(OWNER, USDC_BASE, units(10_000)).await.unwrap();
    manager.set_max_capital_per_arbitrage(OWNER, USDC_BASE, units(1_000)).await.unwrap();

    // 50 bps apart: nominally profitable with no fee, but under the 100 bps floor.
    let cheap = venue("cheap", dec!(2.0), DEEP);
    let expensive = venue("expensive", dec!(2.01), DEEP);
    manager
        .add_strategy(OWNER, USDC_BASE, WETH_BASE, vec![config(&cheap)], vec![config(&expensive)])
        .await
        .unwrap();

    let opp = opportunity(&cheap, &expensive);
    assert!(cross_venue_arb::arbitrage::estimate_profit(&opp, units(1_000)).await.unwrap() > U256::ZERO);

    assert_eq!(manager.check_for_opportunities().await.unwrap(), (false, U256::ZERO));
    assert!(manager.scan_all_strategies(OWNER).await.unwrap().is_none());

    let err = manager
        .execute_arbitrage(OWNER, &opp, units(1_000), U256::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ArbError::PriceDiscrepancyTooLow { actual_bps, required_bps: 100 } if actual_bps < 100
    ));
    assert_eq!(manager.session_stats().await.executions_attempted, 0);
}

#[tokio::test]
async fn successful_execution_credits_exactly_the_profit() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(5_000)).await.unwrap();
    let cheap = venue("cheap", dec!(2.0), DEEP);
    let expensive = venue("expensive", dec!(2.2), DEEP);
    let before = manager.capital_account(USDC_BASE).await;

    let result = manager
        .execute_arbitrage(OWNER, &opportunity(&cheap, &expensive), units(1_000), units(1))
        .await
        .unwrap();

    let after = manager.capital_account(USDC_BASE).await;
    assert!(result.profit > units(90));
    assert_eq!(result.amount_out, result.amount_in + result.profit);
    assert_eq!(after.available, before.available + result.profit);
    assert_eq!(after.total_profit, result.profit);
    assert_eq!(after.reserved, U256::ZERO);
    assert!(after.is_conserved());

    let stats = manager.get_performance_stats(USDC_BASE).await;
    assert_eq!(stats.total_executions, 1);
    assert_eq!(stats.total_profit, result.profit);
    assert_eq!(stats.largest_profit, result.profit);
    assert!(stats.last_execution_time.is_some());

    let records = manager.drain_execution_records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].cheap_venue, "cheap");
    assert!(manager.drain_execution_records().await.is_empty());
}

#[tokio::test]
async fn failed_execution_leaves_everything_untouched() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(5_000)).await.unwrap();
    let cheap = venue("cheap", dec!(2.0), 100_000);
    let inner = venue("expensive", dec!(2.2), 100_000);
    let halted = VenueConfig::new(Arc::new(HaltedVenue { inner: inner.clone() }));
    let opp = Opportunity::new(USDC_BASE, WETH_BASE, config(&cheap), halted, 10).unwrap();

    let account_before: CapitalAccount = manager.capital_account(USDC_BASE).await;
    let venues_before = (cheap.reserves().await, inner.reserves().await);

    let err = manager
        .execute_arbitrage(OWNER, &opp, units(1_000), U256::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, ArbError::ExecutionFailed { .. }));
    assert_eq!(manager.capital_account(USDC_BASE).await, account_before);
    assert_eq!((cheap.reserves().await, inner.reserves().await), venues_before);
    assert_eq!(manager.get_performance_stats(USDC_BASE).await, PerformanceStats::default());

    let session = manager.session_stats().await;
    assert_eq!(session.executions_attempted, 1);
    assert_eq!(session.executions_failed, 1);
}

#[tokio::test]
async fn scan_picks_best_pair_in_either_direction() {
    let manager = manager(10, 50);
    let low = venue("low", dec!(2.0), DEEP);
    let mid = venue("mid", dec!(2.1), DEEP);
    let high = venue("high", dec!(2.4), DEEP);

    // "high" is listed as a cheap candidate; only the reversed direction profits.
    let best = manager
        .scan_opportunities(
            USDC_BASE,
            WETH_BASE,
            &[config(&high), config(&mid)],
            &[config(&low), config(&mid)],
            units(100),
        )
        .await
        .unwrap()
        .expect("a profitable pairing exists");

    assert_eq!(best.opportunity.cheap_venue.name(), "low");
    assert_eq!(best.opportunity.expensive_venue.name(), "high");
    assert!(best.estimated_profit > units(19));

    let none = manager
        .scan_opportunities(USDC_BASE, WETH_BASE, &[config(&low)], &[config(&low)], units(100))
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn scan_all_executes_only_the_most_profitable_strategy() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(10_000)).await.unwrap();
    manager.set_max_capital_per_arbitrage(OWNER, USDC_BASE, units(1_000)).await.unwrap();

    let maker_a = venue("maker a", dec!(2.0), DEEP);
    let tracker_a = venue("tracker a", dec!(2.1), DEEP);
    let maker_b = venue("maker b", dec!(2.0), DEEP);
    let tracker_b = venue("tracker b", dec!(2.4), DEEP);
    manager
        .add_strategy(OWNER, USDC_BASE, WETH_BASE, vec![config(&maker_a)], vec![config(&tracker_a)])
        .await
        .unwrap();
    manager
        .add_strategy(OWNER, USDC_BASE, WETH_BASE, vec![config(&maker_b)], vec![config(&tracker_b)])
        .await
        .unwrap();
    let untouched = maker_a.reserves().await;

    let (has_any, best_profit) = manager.check_for_opportunities().await.unwrap();
    assert!(has_any);
    assert!(best_profit > units(150));

    let result = manager.scan_all_strategies(OWNER).await.unwrap().expect("strategy b executes");

    assert!(result.discrepancy_bps > 1_500);
    assert_eq!(manager.get_performance_stats(USDC_BASE).await.total_executions, 1);
    assert_eq!(maker_a.reserves().await, untouched);
    assert_ne!(maker_b.reserves().await.0, units(DEEP));
}

#[tokio::test]
async fn inactive_strategies_are_skipped() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(10_000)).await.unwrap();
    let cheap = venue("cheap", dec!(2.0), DEEP);
    let expensive = venue("expensive", dec!(2.4), DEEP);
    let id = manager
        .add_strategy(OWNER, USDC_BASE, WETH_BASE, vec![config(&cheap)], vec![config(&expensive)])
        .await
        .unwrap();

    manager.set_strategy_active(OWNER, id, false).await.unwrap();
    assert_eq!(manager.check_for_opportunities().await.unwrap(), (false, U256::ZERO));
    assert!(manager.scan_and_execute_strategy(OWNER, id).await.unwrap().is_none());
    assert!(matches!(
        manager.set_strategy_active(OWNER, 99, true).await,
        Err(ArbError::UnknownStrategy(99))
    ));

    manager.set_strategy_active(OWNER, id, true).await.unwrap();
    let result = manager.scan_and_execute_strategy(OWNER, id).await.unwrap();
    assert!(result.is_some());
}

#[tokio::test]
async fn strategy_registration_validates_inputs() {
    let manager = manager(10, 50);
    let v = venue("v", dec!(2.0), DEEP);

    assert!(manager
        .add_strategy(OWNER, USDC_BASE, USDC_BASE, vec![config(&v)], vec![config(&v)])
        .await
        .is_err());
    assert!(manager
        .add_strategy(OWNER, USDC_BASE, WETH_BASE, vec![], vec![config(&v)])
        .await
        .is_err());
    assert!(manager
        .add_strategy(STRANGER, USDC_BASE, WETH_BASE, vec![config(&v)], vec![config(&v)])
        .await
        .is_err());
    assert!(Opportunity::new(USDC_BASE, WETH_BASE, config(&v), config(&v), 10).is_err());
}

#[tokio::test]
async fn unreachable_venue_fails_scans_instead_of_looking_quiet() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(10_000)).await.unwrap();
    let cheap = venue("cheap", dec!(2.0), DEEP);
    let down = VenueConfig::new(Arc::new(UnreachableVenue));

    let err = manager
        .scan_opportunities(USDC_BASE, WETH_BASE, &[config(&cheap)], &[down.clone()], units(100))
        .await
        .unwrap_err();
    assert!(matches!(err, ArbError::ExecutionFailed { .. }));

    let id = manager
        .add_strategy(OWNER, USDC_BASE, WETH_BASE, vec![config(&cheap)], vec![down])
        .await
        .unwrap();
    assert!(manager.check_for_opportunities().await.is_err());
    assert_eq!(manager.health().await.consecutive_errors, 0);

    assert!(manager.scan_all_strategies(OWNER).await.is_err());
    assert!(manager.scan_and_execute_strategy(OWNER, id).await.is_err());
    assert!(manager.scan_cycle().await.is_err());
    assert_eq!(manager.health().await.consecutive_errors, 3);
    assert_eq!(manager.session_stats().await.scan_cycles, 0);
}

#[tokio::test]
async fn breaker_cooldown_survives_concurrent_failures_and_health_checks() {
    let manager = manager_with_breaker(0, 50, CircuitBreaker::new(1, 0));
    manager.deposit_capital(OWNER, USDC_BASE, units(5_000)).await.unwrap();
    manager.deposit_capital(OWNER, USDBC_BASE, units(5_000)).await.unwrap();

    let cheap = venue("cheap", dec!(2.0), DEEP);
    manager
        .add_strategy(
            OWNER,
            USDC_BASE,
            WETH_BASE,
            vec![config(&cheap)],
            vec![VenueConfig::new(Arc::new(UnreachableVenue))],
        )
        .await
        .unwrap();
    assert!(manager.scan_all_strategies(OWNER).await.is_err());
    tokio::time::sleep(Duration::from_millis(5)).await;

    let other_cheap = Arc::new(
        cross_venue_arb::venues::ManualPriceVenue::new("other cheap", USDBC_BASE, WETH_BASE, units(DEEP), price(dec!(2.0)), 0)
            .unwrap(),
    );
    let other_inner = Arc::new(
        cross_venue_arb::venues::ManualPriceVenue::new("other expensive", USDBC_BASE, WETH_BASE, units(DEEP), price(dec!(2.4)), 0)
            .unwrap(),
    );
    let halted = VenueConfig::new(Arc::new(HaltedVenue { inner: other_inner }));
    let other = Opportunity::new(USDBC_BASE, WETH_BASE, VenueConfig::new(other_cheap), halted, 10).unwrap();

    let concurrent = async {
        tokio::join!(
            manager.execute_arbitrage(OWNER, &other, units(1_000), U256::ZERO),
            manager.health(),
            manager.scan_all_strategies(OWNER),
        )
    };
    let (failed, _, _) = tokio::time::timeout(Duration::from_secs(5), concurrent)
        .await
        .expect("no lock cycle between breaker updates and checks");
    assert!(matches!(failed, Err(ArbError::ExecutionFailed { .. })));

    tokio::time::sleep(Duration::from_millis(5)).await;
    let health = tokio::time::timeout(Duration::from_secs(5), manager.health())
        .await
        .expect("health check after cooldown returns");
    assert!(!health.circuit_breaker_active);
}

#[tokio::test]
async fn concurrent_executions_on_one_pool_run_one_at_a_time() {
    let manager = manager(0, 50);
    let deposit = units(1_500);
    manager.deposit_capital(OWNER, USDC_BASE, deposit).await.unwrap();
    let cheap = venue("cheap", dec!(2.0), DEEP);
    let expensive = venue("expensive", dec!(2.4), DEEP);
    let opp = opportunity(&cheap, &expensive);

    // Each fits the pool alone; together they only fit once the first profit is credited.
    let (first, second) = tokio::join!(
        manager.execute_arbitrage(OWNER, &opp, units(1_000), U256::ZERO),
        manager.execute_arbitrage(OWNER, &opp, units(1_000), U256::ZERO),
    );

    let mut realized = U256::ZERO;
    let mut successes = 0u64;
    for outcome in [first, second] {
        match outcome {
            Ok(result) => {
                realized += result.profit;
                successes += 1;
            }
            Err(e) => assert!(e.is_market_condition(), "unexpected failure: {e}"),
        }
    }
    assert!(successes >= 1);

    let account = manager.capital_account(USDC_BASE).await;
    assert_eq!(account.available, deposit + realized);
    assert_eq!(account.reserved, U256::ZERO);
    assert_eq!(account.total_profit, realized);
    assert!(account.is_conserved());
    assert_eq!(manager.get_performance_stats(USDC_BASE).await.total_executions, successes);
    assert_eq!(manager.session_stats().await.executions_succeeded, successes);
}

#[tokio::test]
async fn one_survey_per_cycle_feeds_detection_and_execution() {
    let manager = manager(10, 50);
    manager.deposit_capital(OWNER, USDC_BASE, units(10_000)).await.unwrap();
    manager.set_max_capital_per_arbitrage(OWNER, USDC_BASE, units(1_000)).await.unwrap();
    let cheap = venue("cheap", dec!(2.0), DEEP);
    let expensive = venue("expensive", dec!(2.4), DEEP);
    manager
        .add_strategy(OWNER, USDC_BASE, WETH_BASE, vec![config(&cheap)], vec![config(&expensive)])
        .await
        .unwrap();

    let (has_any, _) = manager.check_for_opportunities().await.unwrap();
    assert!(has_any);
    assert_eq!(manager.session_stats().await.scan_cycles, 0);
    assert_eq!(cheap.reserves().await.0, units(DEEP));

    let candidates = manager.scan_cycle().await.unwrap();
    let session = manager.session_stats().await;
    assert_eq!(session.scan_cycles, 1);
    assert_eq!(session.opportunities_detected, 1);

    assert!(matches!(
        manager.execute_best(STRANGER, &candidates).await,
        Err(ArbError::UnauthorizedCaller { .. })
    ));
    let result = manager.execute_best(OWNER, &candidates).await.unwrap().expect("candidate executes");
    assert!(result.profit > U256::ZERO);
    assert_eq!(manager.get_performance_stats(USDC_BASE).await.total_executions, 1);
}
