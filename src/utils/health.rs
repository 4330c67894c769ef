//! Health monitoring utilities

use std::time::{Duration, Instant};
use crate::{manager::StrategyManager, types::HealthStatus};

/// Manager health plus oracle freshness; the oracle counts as connected
/// while its last good reading is younger than `staleness`.
pub async fn run_health_check(
    manager: &StrategyManager,
    oracle_last_update: Option<Instant>,
    staleness: Duration,
) -> HealthStatus {
    let mut status = manager.health().await;
    status.oracle_connection = oracle_last_update
        .map(|t| t.elapsed() < staleness)
        .unwrap_or(false);
    status.last_oracle_update = oracle_last_update;
    status
}
