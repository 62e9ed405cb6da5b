//! Pattern matching over raw Client.txt lines.
//!
//! Six line shapes are recognized; everything else is irrelevant chatter
//! and classifies to `None`. Rules are checked in a fixed order and the
//! first match wins. A rule whose captures fail to convert (bad calendar
//! date, out-of-range integer) is treated as a non-match so the line can
//! still fall through to later rules.

use chrono::NaiveDateTime;
use regex::Regex;

use super::event::{GameEvent, LOG_TIMESTAMP_FORMAT};

pub struct LineClassifier {
    death: Regex,
    level_up: Regex,
    identify: Regex,
    area: Regex,
    passive: Regex,
    afk: Regex,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self {
            // 2025/01/02 03:04:05 12345 abcdef [INFO Client 1] : Player123 has been slain.
            death: Regex::new(
                r"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*\[INFO Client.*\] : (.*) has been slain\.",
            )
            .unwrap(),

            // ... [INFO Client 1] : Player123 (Witch) is now level 2
            level_up: Regex::new(
                r"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*\[INFO Client.*\] : (.*) \((.*)\) is now level (\d+)",
            )
            .unwrap(),

            // ... [INFO Client 1] : 4 Items identified
            identify: Regex::new(
                r"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*\[INFO Client \d+\] : (\d+) Items? identified",
            )
            .unwrap(),

            // ... [DEBUG Client 1] Generating level 5 area "The Riverbank" with seed 77889
            area: Regex::new(
                r#"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*\[DEBUG Client \d+\] Generating level (\d+) area "([^"]+)" with seed (\d+)"#,
            )
            .unwrap(),

            // ... [INFO Client 1] Successfully allocated passive skill id: X, name: Y
            passive: Regex::new(
                r"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*\[INFO Client.*\] Successfully allocated passive skill id: ([^,]+), name: (.+)",
            )
            .unwrap(),

            // ... [INFO Client 1] : AFK mode is now ON. Autoreply "..."
            afk: Regex::new(
                r"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}).*\[INFO Client.*\] : AFK mode is now (ON|OFF)",
            )
            .unwrap(),
        }
    }

    /// Classify a single line. `None` means the line is irrelevant, which
    /// is the common case and not an error.
    pub fn classify(&self, line: &str) -> Option<GameEvent> {
        if let Some(event) = self.try_death(line) {
            return Some(event);
        }
        if let Some(event) = self.try_level_up(line) {
            return Some(event);
        }
        if let Some(event) = self.try_identify(line) {
            return Some(event);
        }
        if let Some(event) = self.try_area(line) {
            return Some(event);
        }
        if let Some(event) = self.try_passive(line) {
            return Some(event);
        }
        if let Some(event) = self.try_afk(line) {
            return Some(event);
        }
        None
    }

    fn try_death(&self, line: &str) -> Option<GameEvent> {
        let caps = self.death.captures(line)?;
        Some(GameEvent::Death {
            timestamp: parse_timestamp(&caps[1])?,
            name: caps[2].to_string(),
        })
    }

    fn try_level_up(&self, line: &str) -> Option<GameEvent> {
        let caps = self.level_up.captures(line)?;
        Some(GameEvent::LevelUp {
            timestamp: parse_timestamp(&caps[1])?,
            name: caps[2].to_string(),
            class_name: caps[3].to_string(),
            level: caps[4].parse().ok()?,
        })
    }

    fn try_identify(&self, line: &str) -> Option<GameEvent> {
        let caps = self.identify.captures(line)?;
        Some(GameEvent::ItemsIdentified {
            timestamp: parse_timestamp(&caps[1])?,
            count: caps[2].parse().ok()?,
        })
    }

    fn try_area(&self, line: &str) -> Option<GameEvent> {
        let caps = self.area.captures(line)?;
        Some(GameEvent::AreaGenerated {
            timestamp: parse_timestamp(&caps[1])?,
            level: caps[2].parse().ok()?,
            name: caps[3].to_string(),
            seed: caps[4].parse().ok()?,
        })
    }

    fn try_passive(&self, line: &str) -> Option<GameEvent> {
        let caps = self.passive.captures(line)?;
        Some(GameEvent::PassiveAllocated {
            timestamp: parse_timestamp(&caps[1])?,
            skill_id: caps[2].trim().to_string(),
            skill_name: caps[3].trim().to_string(),
        })
    }

    fn try_afk(&self, line: &str) -> Option<GameEvent> {
        let caps = self.afk.captures(line)?;
        let enabled = &caps[2] == "ON";
        Some(GameEvent::AfkStatus {
            timestamp: parse_timestamp(&caps[1])?,
            enabled,
            auto_reply: enabled.then(|| "This player is AFK.".to_string()),
        })
    }
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, LOG_TIMESTAMP_FORMAT).ok()
}
