//! Health monitoring types

use std::time::Instant;

#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub oracle_connection: bool,
    pub last_oracle_update: Option<Instant>,
    pub consecutive_errors: u32,
    pub circuit_breaker_active: bool,
    pub active_strategies: usize,
    pub uptime_seconds: u64,
}
