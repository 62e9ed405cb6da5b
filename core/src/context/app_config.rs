use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const APP_NAME: &str = "slain";

const DEFAULT_OUTPUT_DIR: &str = "death-stats";
const DEFAULT_RECENT_DEATHS: usize = 5;

/// Tracker configuration, persisted as TOML in the platform config
/// directory. Every field has a default so a missing or partial file
/// loads cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path to the game client's Client.txt; auto-discovered when unset.
    pub log_path: Option<PathBuf>,
    /// Directory overlay text files and the state file are written to.
    pub output_dir: PathBuf,
    /// Capacity of the global and per-instance recent-death lists.
    pub recent_deaths_cap: usize,
    /// When true (the shipped behavior), a death for a character whose
    /// active instance never leveled past 1 starts a fresh instance;
    /// when false such deaths merge into the existing instance.
    pub fresh_instance_on_unleveled_death: bool,
    /// Persist aggregated state to `<output_dir>/stats.json` after each
    /// live state change so restarts can resume without a full replay.
    pub write_state_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            recent_deaths_cap: DEFAULT_RECENT_DEATHS,
            fresh_instance_on_unleveled_death: true,
            write_state_file: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn save(&self) -> Result<()> {
        Ok(confy::store(APP_NAME, None, self)?)
    }

    pub fn state_file(&self) -> PathBuf {
        self.output_dir.join("stats.json")
    }
}
