//! Display and printing utilities

use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};
use crate::{
    manager::StrategyCandidate,
    types::{CapitalStatus, ExecutionRecord, PerformanceStats, SessionStats},
    utils::to_decimal,
};

pub fn print_session_stats(
    start_time: Instant,
    session: &SessionStats,
    performance: &[(String, PerformanceStats, CapitalStatus)],
    error_counts: &HashMap<String, u32>,
    circuit_breaker_open: bool,
) {
    let runtime = start_time.elapsed().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   📈 SCANNING:");
    info!("     Scan cycles: {}", session.scan_cycles);
    info!("     Cycles with executable opportunity: {}", session.opportunities_detected);

    info!("   🚀 EXECUTION:");
    info!("     Attempted: {}", session.executions_attempted);
    info!("     Succeeded: {}", session.executions_succeeded);
    info!("     Failed: {}", session.executions_failed);
    info!("     Success rate: {:.1}%", session.success_rate_pct());

    for (label, stats, capital) in performance {
        info!("   💰 {}:", label);
        info!("     Executions: {}", stats.total_executions);
        info!("     Total profit: {:.6}", to_decimal(stats.total_profit));
        info!("     Largest profit: {:.6}", to_decimal(stats.largest_profit));
        info!("     Total cost: {:.6}", to_decimal(stats.total_cost));
        info!(
            "     Available: {:.4} (max/trade {:.4}, {:.1}% of pool per trade)",
            to_decimal(capital.available),
            to_decimal(capital.max_per_trade),
            capital.utilization_bps as f64 / 100.0
        );
    }

    info!("   ⚙️  SYSTEM:");
    info!("     Circuit breaker: {}", if circuit_breaker_open { "OPEN" } else { "CLOSED" });

    if !error_counts.is_empty() {
        info!("     Error summary:");
        for (error_type, count) in error_counts.iter() {
            info!("       {}: {}", error_type, count);
        }
    }

    info!("");
}

pub fn print_opportunity(candidate: &StrategyCandidate) {
    let opportunity = &candidate.scan.opportunity;
    warn!("\n🎯 ARBITRAGE OPPORTUNITY (strategy #{})", candidate.strategy_id);
    warn!("📍 Route: buy on {}, sell on {}", opportunity.cheap_venue.name(), opportunity.expensive_venue.name());
    warn!("💰 Profit Analysis:");
    warn!("   Sample size:      {:.4}", to_decimal(candidate.sample_amount));
    warn!("   Estimated profit: {:.6}", to_decimal(candidate.scan.estimated_profit));
    warn!("   Required profit:  {:.6}", to_decimal(candidate.required_profit));
    warn!("   Discrepancy:      {} bps", candidate.discrepancy_bps);
    warn!("");
}

pub fn print_execution(record: &ExecutionRecord) {
    warn!("\n✅ ARBITRAGE EXECUTED #{}", record.id);
    warn!("📍 Route: {} -> {}", record.cheap_venue, record.expensive_venue);
    warn!("💰 Execution Details:");
    warn!("   Amount in:  {}", record.amount_in);
    warn!("   Amount out: {}", record.amount_out);
    warn!("   Profit:     {:.6}", record.profit_units);
    warn!("   Gap:        {} bps", record.discrepancy_bps);
    warn!("   Execution Time: {}ms", record.execution_time_ms);
}
