//! Saved-state file: enough to reconstruct the global totals and every
//! per-character instance history without replaying the log.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::SessionCache;

const STATE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedState {
    pub version: u32,
    pub state: SessionCache,
}

impl SavedState {
    pub fn of(cache: &SessionCache) -> Self {
        Self {
            version: STATE_VERSION,
            state: cache.clone(),
        }
    }
}

pub fn save(cache: &SessionCache, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&SavedState::of(cache))?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a previously saved state. `None` when no file exists; an
/// unreadable or version-mismatched file is an error so the caller can
/// decide between aborting and rebuilding from the log.
pub fn load(path: &Path) -> Result<Option<SessionCache>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    let saved: SavedState = serde_json::from_str(&json)?;
    if saved.version != STATE_VERSION {
        return Err(Error::Persist {
            path: path.to_path_buf(),
            reason: format!("unsupported state version {}", saved.version),
        });
    }
    Ok(Some(saved.state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{CharacterInstance, DeathRecord};
    use chrono::NaiveDateTime;

    fn ts(text: &str) -> NaiveDateTime {
        text.parse().unwrap()
    }

    #[test]
    fn round_trip_reconstructs_totals_and_histories() {
        let mut cache = SessionCache::new(5);
        let mut instance = CharacterInstance::new(
            "Player123".to_string(),
            Some("Witch".to_string()),
            Some(12),
            ts("2025-01-02T03:00:00"),
            Some("The Riverbank".to_string()),
            5,
        );
        let record = DeathRecord {
            timestamp: ts("2025-01-02T03:05:00"),
            name: "Player123".to_string(),
            class_name: "Witch".to_string(),
            level: 12,
            area: Some("The Riverbank".to_string()),
        };
        instance.deaths.record(record.clone());
        cache.global.deaths.record(record);
        cache.push_instance(instance);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        save(&cache, &path).unwrap();

        let restored = load(&path).unwrap().expect("state file should load");
        assert_eq!(restored.global.deaths.total, 1);
        assert_eq!(restored.instances("Player123").len(), 1);
        assert_eq!(restored.instances("Player123")[0].max_level, 12);
        assert_eq!(
            restored.active_instance("Player123").map(|i| i.deaths.total),
            Some(1)
        );
        assert_eq!(restored.recent_cap(), 5);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.json")).unwrap().is_none());
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let cache = SessionCache::new(5);
        let mut saved = SavedState::of(&cache);
        saved.version = 99;
        fs::write(&path, serde_json::to_string(&saved).unwrap()).unwrap();

        assert!(load(&path).is_err());
    }
}
