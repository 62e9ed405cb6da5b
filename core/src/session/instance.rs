use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Class placeholder for instances first seen through a classless event.
pub const UNKNOWN_CLASS: &str = "Unknown";

/// Game-mode flag. Hardcore converts to standard permanently on death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Hardcore,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueStatus {
    pub current: League,
    /// Stamped once, when a hardcore death converted this instance to
    /// standard.
    pub hardcore_until: Option<NaiveDateTime>,
}

impl LeagueStatus {
    pub fn hardcore() -> Self {
        Self {
            current: League::Hardcore,
            hardcore_until: None,
        }
    }

    /// One-way and idempotent: a second death while already standard
    /// moves neither the flag nor `hardcore_until`.
    pub fn demote(&mut self, timestamp: NaiveDateTime) {
        if self.current == League::Hardcore {
            self.current = League::Standard;
            self.hardcore_until = Some(timestamp);
        }
    }
}

/// A single fully-resolved death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathRecord {
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub class_name: String,
    pub level: u32,
    pub area: Option<String>,
}

/// Death counter plus a bounded window of the most recent records.
/// Eviction is FIFO and the window never reorders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathTally {
    pub total: u64,
    recent: VecDeque<DeathRecord>,
    cap: usize,
}

impl DeathTally {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            total: 0,
            recent: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn record(&mut self, record: DeathRecord) {
        self.total += 1;
        self.recent.push_back(record);
        while self.recent.len() > self.cap {
            self.recent.pop_front();
        }
    }

    /// Recent deaths, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &DeathRecord> {
        self.recent.iter()
    }

    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }
}

/// Process-wide death statistics across every character instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub deaths: DeathTally,
}

impl GlobalStats {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            deaths: DeathTally::with_cap(cap),
        }
    }
}

/// One play-session of a named character.
///
/// Instances are never deleted; each name accumulates an append-only,
/// chronological history of them (deletion and recreation in-game shows
/// up here as a second instance under the same name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterInstance {
    pub name: String,
    pub class_name: String,
    pub max_level: u32,
    pub deaths: DeathTally,
    pub league: LeagueStatus,
    pub created: NaiveDateTime,
    pub last_seen: NaiveDateTime,
    pub area: Option<String>,
}

impl CharacterInstance {
    pub fn new(
        name: String,
        class_name: Option<String>,
        level: Option<u32>,
        timestamp: NaiveDateTime,
        area: Option<String>,
        recent_cap: usize,
    ) -> Self {
        Self {
            name,
            class_name: class_name.unwrap_or_else(|| UNKNOWN_CLASS.to_string()),
            max_level: level.unwrap_or(1),
            deaths: DeathTally::with_cap(recent_cap),
            league: LeagueStatus::hardcore(),
            created: timestamp,
            last_seen: timestamp,
            area,
        }
    }
}
