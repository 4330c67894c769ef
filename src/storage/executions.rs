//! Execution record storage

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::types::ExecutionRecord;
use super::append_record;

pub fn save_execution_record(dir: &Path, record: &ExecutionRecord) -> Result<PathBuf> {
    let path = append_record(dir, "executions", record)?;

    info!(
        execution_id = %record.id,
        route = %format!("{} -> {}", record.cheap_venue, record.expensive_venue),
        profit = %record.profit_units,
        "Saved execution"
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExecutionResult, Opportunity, USDC_BASE, WETH_BASE};
    use crate::utils::{PRECISION, units};
    use crate::venues::{ManualPriceVenue, VenueConfig};
    use alloy::primitives::U256;
    use std::sync::Arc;

    #[test]
    fn appends_one_line_per_record() {
        let dir = std::env::temp_dir().join(format!("arb-exec-{}", uuid::Uuid::new_v4()));
        let venue = |name: &str| {
            VenueConfig::new(Arc::new(
                ManualPriceVenue::new(name, USDC_BASE, WETH_BASE, units(1_000), PRECISION, 30).unwrap(),
            ))
        };
        let opportunity = Opportunity::new(USDC_BASE, WETH_BASE, venue("maker"), venue("tracker"), 10).unwrap();
        let result = ExecutionResult {
            amount_in: units(10),
            amount_out: units(11),
            profit: units(1),
            discrepancy_bps: 120,
            cost: U256::ZERO,
        };

        let first = save_execution_record(&dir, &ExecutionRecord::new(Some(0), &opportunity, &result, 3)).unwrap();
        let second = save_execution_record(&dir, &ExecutionRecord::new(None, &opportunity, &result, 4)).unwrap();
        assert_eq!(first, second);

        let contents = std::fs::read_to_string(&first).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["cheap_venue"], "maker");
        assert_eq!(lines[0]["profit"], units(1).to_string());
        assert_eq!(lines[1]["execution_time_ms"], 4);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
