//! Cross-venue arbitrage bot - main entry point

use cross_venue_arb::*;
use alloy::primitives::{Address, U256};
use anyhow::Result;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{debug, error, info, warn};
use cross_venue_arb::config::ReferenceSource;
use cross_venue_arb::errors::{ErrorRecovery, RecoveryAction};
use cross_venue_arb::manager::StrategyManager;
use cross_venue_arb::oracle::{BinancePriceOracle, PriceOracle, SimulatedPriceOracle, validate_reference_move};
use cross_venue_arb::utils::{PRECISION, mul_div, to_decimal};
use cross_venue_arb::venues::{Inventory, ManualPriceVenue, OracleTrackingVenue, VenueConfig};

/// Both venues of one monitored pair.
struct PairVenues {
    label: String,
    base: Address,
    maker: Arc<ManualPriceVenue>,
    tracker: Arc<OracleTrackingVenue>,
}

struct MonitoringState {
    cycle: u64,
    error_counts: HashMap<String, u32>,
    oracle_last_update: Option<Instant>,
    last_reference_price: U256,
    consecutive_oracle_failures: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    let config = CONFIG.clone();

    info!("⚖️  Cross-Venue Arbitrage Bot v{}", env!("CARGO_PKG_VERSION"));
    info!("📋 Configuration:");
    info!("   Operator: {}", config.operator);
    info!("   Pairs: {}", config.trading_pairs.join(", "));
    info!("   Min Profit: {} bps", config.min_profit_bps);
    info!("   Min Discrepancy: {} bps", config.min_discrepancy_bps);
    info!("   Max Capital / Arbitrage: {:.2}", to_decimal(config.max_capital_per_arbitrage));
    info!("   Reference Source: {:?}", config.reference_source);
    info!("   Execution: {}", if config.enable_execution { "ENABLED" } else { "monitor only" });
    if config.enable_execution {
        info!("   Slippage Tolerance: {} bps", config.slippage_tolerance_bps);
    }

    let oracle: Box<dyn PriceOracle> = match config.reference_source {
        ReferenceSource::Simulated => Box::new(SimulatedPriceOracle::new(
            config.reference_start_price_raw(),
            config.reference_step_bps,
        )?),
        ReferenceSource::Binance => Box::new(BinancePriceOracle::new(&config.binance_symbol)?),
    };
    let error_recovery = ErrorRecovery::new();

    let start_price = match oracle.latest_price().await {
        Ok(price) => price,
        Err(e) => {
            warn!("⚠️ Initial {} price unavailable ({}), starting from configured price", oracle.source(), e);
            config.reference_start_price_raw()
        }
    };
    info!("💹 Reference price: {:.4} ({})", to_decimal(start_price), oracle.source());

    let manager = Arc::new(StrategyManager::from_config(&config));
    let pairs = setup_pairs(&config, &manager, start_price).await?;
    if pairs.is_empty() {
        return Err(anyhow::anyhow!("No trading pairs configured"));
    }

    // Setup shutdown handler
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        let _ = shutdown_tx.send(());
    });

    info!("\n🚀 Starting main monitoring loop...\n");

    let start_time = Instant::now();
    let mut state = MonitoringState {
        cycle: 0,
        error_counts: HashMap::new(),
        oracle_last_update: Some(Instant::now()),
        last_reference_price: start_price,
        consecutive_oracle_failures: 0,
    };
    let mut interval = time::interval(Duration::from_secs(config.scan_interval_secs));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = run_monitoring_cycle(
                    &config,
                    oracle.as_ref(),
                    &manager,
                    &pairs,
                    &error_recovery,
                    &mut state,
                    start_time,
                ).await {
                    error!("Monitoring cycle error: {}", e);
                    if e.downcast_ref::<ArbError>().is_some_and(|e| matches!(e, ArbError::UnauthorizedCaller { .. })) {
                        break;
                    }
                }
            }
            _ = &mut shutdown_rx => {
                info!("Shutdown signal received, exiting main loop...");
                break;
            }
        }
    }

    print_statistics(&manager, &pairs, &state, start_time).await;
    Ok(())
}

/// One maker-priced and one oracle-tracking venue per pair, funded and registered as a strategy.
async fn setup_pairs(config: &Config, manager: &StrategyManager, reference_price: U256) -> Result<Vec<PairVenues>> {
    let owner = config.operator;
    let mut pairs = Vec::new();

    for label in &config.trading_pairs {
        let Some((label, base, quote)) = pair_by_label(label) else {
            warn!("Unknown pair {}, skipping", label);
            continue;
        };

        let maker = Arc::new(ManualPriceVenue::new(
            &format!("maker {label}"),
            base,
            quote,
            config.venue_depth,
            reference_price,
            config.venue_fee_bps,
        )?);
        let tracker = Arc::new(OracleTrackingVenue::new(
            &format!("tracker {label}"),
            base,
            quote,
            config.venue_depth,
            reference_price,
            Inventory {
                base: config.venue_depth,
                quote: mul_div(config.venue_depth, PRECISION, reference_price)?,
            },
            config.venue_fee_bps,
        )?);

        manager.deposit_capital(owner, base, config.initial_capital).await?;
        manager
            .set_max_capital_per_arbitrage(owner, base, config.max_capital_per_arbitrage)
            .await?;
        let id = manager
            .add_strategy(
                owner,
                base,
                quote,
                vec![VenueConfig::with_descriptor(maker.clone(), json!({ "kind": "manual", "pair": label }))],
                vec![VenueConfig::with_descriptor(tracker.clone(), json!({ "kind": "oracle", "pair": label }))],
            )
            .await?;
        info!("✅ {} ready as strategy #{}", label, id);

        pairs.push(PairVenues {
            label: label.to_string(),
            base,
            maker,
            tracker,
        });
    }

    Ok(pairs)
}

async fn run_monitoring_cycle(
    config: &Config,
    oracle: &dyn PriceOracle,
    manager: &StrategyManager,
    pairs: &[PairVenues],
    error_recovery: &ErrorRecovery,
    state: &mut MonitoringState,
    start_time: Instant,
) -> Result<()> {
    state.cycle += 1;

    // Periodic health check
    if state.cycle % 15 == 0 {
        let staleness = Duration::from_secs(config.scan_interval_secs * 5);
        let health = utils::run_health_check(manager, state.oracle_last_update, staleness).await;
        info!(
            "🏥 Health Check: Oracle={}, Strategies={}, Breaker={}, Uptime={}s, Errors={}",
            if health.oracle_connection { "OK" } else { "STALE" },
            health.active_strategies,
            if health.circuit_breaker_active { "OPEN" } else { "closed" },
            health.uptime_seconds,
            health.consecutive_errors
        );
    }

    // Refresh the reference and push it into the tracking venues
    let fetched = match oracle.latest_price().await {
        Ok(price) => validate_reference_move(state.last_reference_price, price, oracle.source()).map(|_| price),
        Err(e) => Err(e),
    };
    let reference_price = match fetched {
        Ok(price) => {
            state.oracle_last_update = Some(Instant::now());
            state.last_reference_price = price;
            state.consecutive_oracle_failures = 0;
            error_recovery.reset("network_timeout").await;
            price
        }
        Err(e) => {
            state.consecutive_oracle_failures += 1;
            *state.error_counts.entry("oracle".to_string()).or_insert(0) += 1;
            match error_recovery.handle_error(&e, "reference price").await {
                RecoveryAction::Retry { delay } => {
                    warn!("Oracle error (attempt {}): {}. Retrying in {:?}", state.consecutive_oracle_failures, e, delay);
                    tokio::time::sleep(delay).await;
                    return Ok(());
                }
                RecoveryAction::Fallback { source } if state.consecutive_oracle_failures <= 3 => {
                    warn!("Rejected reference price ({}), using {}", e, source);
                    state.last_reference_price
                }
                RecoveryAction::Shutdown { reason } => {
                    return Err(anyhow::anyhow!("Critical error - shutting down: {}", reason));
                }
                _ => {
                    error!("Reference price unavailable: {}", e);
                    return Ok(());
                }
            }
        }
    };

    for pair in pairs {
        pair.tracker.sync_reference(reference_price).await?;
        // The maker only catches up every few cycles; the lag is the opportunity.
        if state.cycle % config.maker_lag_cycles == 0 {
            pair.maker.reprice(reference_price).await?;
        }
        let maker_price = pair.maker.spot_price().await?;
        info!(
            "💹 {} | Maker: {:.4} | Reference: {:.4}",
            pair.label,
            to_decimal(maker_price),
            to_decimal(reference_price)
        );
    }

    let candidates = match manager.scan_cycle().await {
        Ok(candidates) => candidates,
        Err(e) => {
            handle_cycle_error(e, "scan", error_recovery, state).await?;
            Vec::new()
        }
    };
    let executable: Vec<_> = candidates.iter().filter(|c| c.executable).collect();
    for candidate in &executable {
        utils::print_opportunity(candidate);
        if let Err(e) = storage::save_opportunity_record(Path::new(storage::OPPORTUNITIES_DIR), &candidate.record()) {
            error!("Failed to save opportunity: {}", e);
        }
    }
    if executable.is_empty() {
        debug!("No executable opportunity this cycle");
    } else if config.enable_execution {
        match manager.execute_best(config.operator, &candidates).await {
            Ok(Some(result)) => {
                debug!(profit = %result.profit, "cycle executed arbitrage");
                error_recovery.reset("market_moved").await;
            }
            Ok(None) => debug!("No candidate executable this cycle"),
            Err(e) => handle_cycle_error(e, "execution", error_recovery, state).await?,
        }
    }

    for record in manager.drain_execution_records().await {
        utils::print_execution(&record);
        if let Err(e) = storage::save_execution_record(Path::new(storage::EXECUTIONS_DIR), &record) {
            error!("Failed to save execution: {}", e);
        }
    }

    if state.cycle % 30 == 0 {
        print_statistics(manager, pairs, state, start_time).await;
    }

    Ok(())
}

async fn handle_cycle_error(
    e: ArbError,
    context: &str,
    error_recovery: &ErrorRecovery,
    state: &mut MonitoringState,
) -> Result<()> {
    *state.error_counts.entry(error_recovery.classify_error(&e)).or_insert(0) += 1;
    match error_recovery.handle_error(&e, context).await {
        RecoveryAction::Skip { .. } => debug!("{} skipped: {}", context, e),
        RecoveryAction::Shutdown { reason } => {
            error!("Critical {} error: {}", context, reason);
            return Err(e.into());
        }
        _ => warn!("{} failed: {}", context, e),
    }
    Ok(())
}

async fn print_statistics(manager: &StrategyManager, pairs: &[PairVenues], state: &MonitoringState, start_time: Instant) {
    let mut performance = Vec::new();
    for pair in pairs {
        performance.push((
            pair.label.clone(),
            manager.get_performance_stats(pair.base).await,
            manager.get_capital_status(pair.base).await,
        ));
    }
    let health = manager.health().await;
    utils::print_session_stats(
        start_time,
        &manager.session_stats().await,
        &performance,
        &state.error_counts,
        health.circuit_breaker_active,
    );
}
