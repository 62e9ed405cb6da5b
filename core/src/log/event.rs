use chrono::NaiveDateTime;

/// Timestamp prefix carried by every recognized Client.txt line.
/// Log-local time, seconds resolution, no timezone.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A structured event extracted from a single log line.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Death {
        timestamp: NaiveDateTime,
        name: String,
    },
    LevelUp {
        timestamp: NaiveDateTime,
        name: String,
        class_name: String,
        level: u32,
    },
    AreaGenerated {
        timestamp: NaiveDateTime,
        name: String,
        level: u32,
        seed: u64,
    },
    ItemsIdentified {
        timestamp: NaiveDateTime,
        count: u32,
    },
    PassiveAllocated {
        timestamp: NaiveDateTime,
        skill_id: String,
        skill_name: String,
    },
    AfkStatus {
        timestamp: NaiveDateTime,
        enabled: bool,
        auto_reply: Option<String>,
    },
}

impl GameEvent {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            GameEvent::Death { timestamp, .. }
            | GameEvent::LevelUp { timestamp, .. }
            | GameEvent::AreaGenerated { timestamp, .. }
            | GameEvent::ItemsIdentified { timestamp, .. }
            | GameEvent::PassiveAllocated { timestamp, .. }
            | GameEvent::AfkStatus { timestamp, .. } => *timestamp,
        }
    }

    /// Character name carried by the line itself, if any.
    pub fn character_name(&self) -> Option<&str> {
        match self {
            GameEvent::Death { name, .. } | GameEvent::LevelUp { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Character identity attached to an event after enrichment. Fields the
/// line did not carry are backfilled from the last-known context; the
/// name falls back to an empty string when nothing is known yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterRecord {
    pub name: String,
    pub class_name: Option<String>,
    pub level: Option<u32>,
    pub area: Option<String>,
}

/// A raw event plus its resolved character context.
/// Never mutated after creation.
#[derive(Debug, Clone)]
pub struct EnrichedEvent {
    pub event: GameEvent,
    pub character: CharacterRecord,
    /// Set for events replayed from the file's pre-existing content, so
    /// sinks are not flooded with historical data.
    pub is_startup: bool,
}
