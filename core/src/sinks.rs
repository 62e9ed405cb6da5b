//! Snapshot sinks: overlay-friendly files for streaming software.
//!
//! Sinks consume read-only snapshots and must never push failures back
//! into the pipeline; everything here logs and moves on.

use std::fs;
use std::path::PathBuf;

use crate::events::{SnapshotSink, StateSnapshot};
use crate::log::{EnrichedEvent, LOG_TIMESTAMP_FORMAT};
use crate::session::{DeathRecord, UNKNOWN_CLASS};

/// Writes stat files into the output directory for OBS-style overlays to
/// pick up: a total counter and the recent deaths in both orders.
pub struct OverlayFileSink {
    output_dir: PathBuf,
}

impl OverlayFileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn write(&self, filename: &str, content: &str) {
        let path = self.output_dir.join(filename);
        if let Err(err) = fs::write(&path, content) {
            tracing::warn!("[SINK] failed to write {}: {err}", path.display());
        }
    }

    // 2025/01/02 03:04:05 | 12 Player123 (Witch) | The Riverbank
    fn format_death(record: &DeathRecord) -> String {
        let class_name = if record.class_name.is_empty() {
            UNKNOWN_CLASS
        } else {
            &record.class_name
        };
        format!(
            "{} | {} {} ({}) | {}",
            record.timestamp.format(LOG_TIMESTAMP_FORMAT),
            record.level,
            record.name,
            class_name,
            record.area.as_deref().unwrap_or(""),
        )
    }
}

impl SnapshotSink for OverlayFileSink {
    fn handle_snapshot(&mut self, _event: &EnrichedEvent, snapshot: &StateSnapshot) {
        if let Err(err) = fs::create_dir_all(&self.output_dir) {
            tracing::warn!(
                "[SINK] cannot create {}: {err}",
                self.output_dir.display()
            );
            return;
        }

        self.write(
            "total_deaths.txt",
            &format!("Total Deaths: {}", snapshot.total_deaths()),
        );

        let ascending: Vec<String> = snapshot.recent_deaths().map(Self::format_death).collect();
        if !ascending.is_empty() {
            let descending: Vec<String> = ascending.iter().rev().cloned().collect();
            self.write("last_five_deaths_asc.txt", &ascending.join("\n"));
            self.write("last_five_deaths_desc.txt", &descending.join("\n"));
        }

        match serde_json::to_string_pretty(&snapshot.characters) {
            Ok(json) => self.write("character_stats.json", &json),
            Err(err) => tracing::warn!("[SINK] character stats serialization failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextEnricher;
    use crate::events::EventProcessor;
    use crate::log::GameEvent;
    use crate::session::SessionCache;

    #[test]
    fn overlay_files_are_written_from_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = OverlayFileSink::new(dir.path());

        let mut enricher = ContextEnricher::new();
        let mut processor = EventProcessor::default();
        let mut cache = SessionCache::new(5);

        let enriched = enricher.process(
            GameEvent::LevelUp {
                timestamp: "2025-01-02T03:00:00".parse().unwrap(),
                name: "Player123".to_string(),
                class_name: "Witch".to_string(),
                level: 12,
            },
            false,
        );
        processor.process_event(&enriched, &mut cache);

        let enriched = enricher.process(
            GameEvent::Death {
                timestamp: "2025-01-02T03:04:05".parse().unwrap(),
                name: "Player123".to_string(),
            },
            false,
        );
        let snapshot = processor.process_event(&enriched, &mut cache).unwrap();
        sink.handle_snapshot(&enriched, &snapshot);

        let total = fs::read_to_string(dir.path().join("total_deaths.txt")).unwrap();
        assert_eq!(total, "Total Deaths: 1");

        let recent = fs::read_to_string(dir.path().join("last_five_deaths_desc.txt")).unwrap();
        assert_eq!(recent, "2025/01/02 03:04:05 | 12 Player123 (Witch) | ");

        let json = fs::read_to_string(dir.path().join("character_stats.json")).unwrap();
        assert!(json.contains("\"Player123\""));
    }
}
