use hashbrown::HashMap;
use serde::Serialize;

use crate::session::{CharacterInstance, DeathRecord, GlobalStats};

/// Read-only view of aggregated state, produced after every live
/// state-changing event and handed to sinks. A deep copy: sinks can hold
/// it as long as they like without touching core state.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub stats: GlobalStats,
    pub characters: HashMap<String, Vec<CharacterInstance>>,
}

impl StateSnapshot {
    pub fn total_deaths(&self) -> u64 {
        self.stats.deaths.total
    }

    /// Most recent deaths across all characters, oldest first.
    pub fn recent_deaths(&self) -> impl Iterator<Item = &DeathRecord> {
        self.stats.deaths.recent()
    }
}
