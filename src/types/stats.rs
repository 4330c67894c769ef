//! Performance and session statistics

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use super::ExecutionResult;

/// Per-asset aggregation, updated exactly once per successful execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformanceStats {
    pub total_executions: u64,
    pub total_profit: U256,
    pub total_cost: U256,
    pub largest_profit: U256,
    pub last_execution_time: Option<DateTime<Utc>>,
}

impl PerformanceStats {
    pub fn record(&mut self, result: &ExecutionResult, at: DateTime<Utc>) {
        self.total_executions += 1;
        self.total_profit = self.total_profit.saturating_add(result.profit);
        self.total_cost = self.total_cost.saturating_add(result.cost);
        self.largest_profit = self.largest_profit.max(result.profit);
        self.last_execution_time = Some(at);
    }
}

/// Counters for the bot's periodic report.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub scan_cycles: u64,
    pub opportunities_detected: u64,
    pub executions_attempted: u64,
    pub executions_succeeded: u64,
    pub executions_failed: u64,
}

impl SessionStats {
    pub fn success_rate_pct(&self) -> f64 {
        if self.executions_attempted == 0 {
            0.0
        } else {
            self.executions_succeeded as f64 / self.executions_attempted as f64 * 100.0
        }
    }
}
