use chrono::NaiveDateTime;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::events::StateSnapshot;
use crate::session::instance::{CharacterInstance, GlobalStats};

/// Parameters of the last generated area, applied lazily to instances on
/// the next death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaInfo {
    pub name: String,
    pub level: u32,
    pub seed: u64,
    pub entered_at: NaiveDateTime,
}

/// Pure storage for tracker state.
/// Routing logic lives in EventProcessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCache {
    pub global: GlobalStats,
    pub current_area: Option<AreaInfo>,

    /// Per-name instance histories; insertion order = session order.
    characters: HashMap<String, Vec<CharacterInstance>>,
    /// Index of the active instance within each name's history.
    active: HashMap<String, usize>,

    recent_cap: usize,
}

impl SessionCache {
    pub fn new(recent_cap: usize) -> Self {
        Self {
            global: GlobalStats::with_cap(recent_cap),
            current_area: None,
            characters: HashMap::new(),
            active: HashMap::new(),
            recent_cap,
        }
    }

    // --- Instance Management ---

    pub fn active_instance(&self, name: &str) -> Option<&CharacterInstance> {
        let idx = *self.active.get(name)?;
        self.characters.get(name)?.get(idx)
    }

    pub fn active_instance_mut(&mut self, name: &str) -> Option<&mut CharacterInstance> {
        let idx = *self.active.get(name)?;
        self.characters.get_mut(name)?.get_mut(idx)
    }

    /// Append a new instance to its name's history and mark it active.
    pub fn push_instance(&mut self, instance: CharacterInstance) {
        let name = instance.name.clone();
        let history = self.characters.entry(name.clone()).or_default();
        history.push(instance);
        self.active.insert(name, history.len() - 1);
    }

    // --- Accessors ---

    pub fn instances(&self, name: &str) -> &[CharacterInstance] {
        self.characters.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn characters(&self) -> &HashMap<String, Vec<CharacterInstance>> {
        &self.characters
    }

    pub fn instance_count(&self) -> usize {
        self.characters.values().map(Vec::len).sum()
    }

    pub fn recent_cap(&self) -> usize {
        self.recent_cap
    }

    // --- Snapshots ---

    /// Deep, read-only copy handed to sinks.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            stats: self.global.clone(),
            characters: self.characters.clone(),
        }
    }
}
