//! Opportunity record storage

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use crate::types::OpportunityRecord;
use super::append_record;

pub fn save_opportunity_record(dir: &Path, record: &OpportunityRecord) -> Result<PathBuf> {
    let path = append_record(dir, "opportunities", record)?;

    info!(
        opportunity_id = %record.id,
        estimated_profit = %record.estimated_profit_units,
        discrepancy_bps = record.discrepancy_bps,
        "Saved opportunity"
    );

    Ok(path)
}
