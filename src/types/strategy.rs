//! Registered monitoring strategies

use alloy::primitives::Address;
use crate::venues::VenueConfig;

pub type StrategyId = u64;

/// Long-lived scan configuration, owned by the manager.
#[derive(Clone)]
pub struct Strategy {
    pub id: StrategyId,
    pub pair_asset_a: Address,
    pub pair_asset_b: Address,
    pub candidate_cheap_venues: Vec<VenueConfig>,
    pub candidate_expensive_venues: Vec<VenueConfig>,
    pub active: bool,
}

impl Strategy {
    pub fn base_asset(&self) -> Address {
        self.pair_asset_a
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_cheap_venues.len() * self.candidate_expensive_venues.len()
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |venues: &[VenueConfig]| {
            venues.iter().map(|v| v.name().to_string()).collect::<Vec<_>>()
        };
        f.debug_struct("Strategy")
            .field("id", &self.id)
            .field("pair_asset_a", &self.pair_asset_a)
            .field("pair_asset_b", &self.pair_asset_b)
            .field("candidate_cheap_venues", &names(&self.candidate_cheap_venues))
            .field("candidate_expensive_venues", &names(&self.candidate_expensive_venues))
            .field("active", &self.active)
            .finish()
    }
}
