//! Routing of enriched events into session state.
//!
//! The one genuinely ambiguous decision lives in `should_reuse_active`:
//! the log carries no explicit "character switched" marker, so instance
//! boundaries are inferred from level regressions and unresolved classes.
//! Keeping that heuristic in a single function lets it change without
//! touching any of the bookkeeping around it.

use chrono::NaiveDateTime;

use super::StateSnapshot;
use crate::log::{EnrichedEvent, GameEvent};
use crate::session::{AreaInfo, CharacterInstance, DeathRecord, SessionCache, UNKNOWN_CLASS};

/// What to do with a death whose active instance never leveled past 1.
/// The log alone cannot distinguish "fresh character died at level 1"
/// from "existing character we simply have no level-ups for".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// A level-less death on a level-1 instance starts a new instance.
    #[default]
    FreshOnUnleveled,
    /// A level-less death always merges into the active instance.
    MergeUnleveled,
}

#[derive(Debug, Default)]
pub struct EventProcessor {
    policy: ResolutionPolicy,
}

impl EventProcessor {
    pub fn new(policy: ResolutionPolicy) -> Self {
        Self { policy }
    }

    /// Apply one enriched event to the cache.
    ///
    /// Returns a snapshot for live events that changed character-visible
    /// state. Startup events mutate state silently so sinks are not
    /// flooded during replay. Unhandled variants are accepted as no-ops;
    /// nothing in here can fail a single event's processing.
    pub fn process_event(
        &mut self,
        event: &EnrichedEvent,
        cache: &mut SessionCache,
    ) -> Option<StateSnapshot> {
        let changed = match &event.event {
            GameEvent::Death { timestamp, .. } => self.handle_death(event, *timestamp, cache),
            GameEvent::LevelUp { timestamp, .. } => self.handle_level_up(event, *timestamp, cache),
            GameEvent::AreaGenerated {
                timestamp,
                name,
                level,
                seed,
            } => {
                // Only the current-area pointer moves; it reaches the
                // instances lazily, on the next death.
                cache.current_area = Some(AreaInfo {
                    name: name.clone(),
                    level: *level,
                    seed: *seed,
                    entered_at: *timestamp,
                });
                tracing::debug!("[STATE] entered area {name} (level {level})");
                false
            }
            // Classified but intentionally not aggregated.
            GameEvent::ItemsIdentified { .. }
            | GameEvent::PassiveAllocated { .. }
            | GameEvent::AfkStatus { .. } => false,
        };

        (changed && !event.is_startup).then(|| cache.snapshot())
    }

    fn handle_death(
        &mut self,
        event: &EnrichedEvent,
        timestamp: NaiveDateTime,
        cache: &mut SessionCache,
    ) -> bool {
        let name = event.character.name.clone();
        if name.is_empty() {
            tracing::warn!("[STATE] death line with no resolvable character name; skipping");
            return false;
        }

        // Deaths carry no level or class of their own.
        self.resolve_instance(cache, &name, None, None, timestamp);
        let area_name = cache.current_area.as_ref().map(|a| a.name.clone());

        let Some(instance) = cache.active_instance_mut(&name) else {
            return false;
        };
        instance.area = area_name.clone();
        instance.last_seen = timestamp;

        let record = DeathRecord {
            timestamp,
            name: instance.name.clone(),
            class_name: instance.class_name.clone(),
            level: instance.max_level,
            area: area_name,
        };
        instance.deaths.record(record.clone());
        instance.league.demote(timestamp);
        let instance_total = instance.deaths.total;
        let level = record.level;

        cache.global.deaths.record(record);
        tracing::info!(
            "[STATE] {name} died at level {level} ({instance_total} for this run, {} overall)",
            cache.global.deaths.total
        );
        true
    }

    fn handle_level_up(
        &mut self,
        event: &EnrichedEvent,
        timestamp: NaiveDateTime,
        cache: &mut SessionCache,
    ) -> bool {
        let GameEvent::LevelUp {
            name,
            class_name,
            level,
            ..
        } = &event.event
        else {
            return false;
        };
        if name.is_empty() {
            return false;
        }

        self.resolve_instance(cache, name, Some(class_name.as_str()), Some(*level), timestamp);
        let Some(instance) = cache.active_instance_mut(name) else {
            return false;
        };

        // Resolution guarantees monotonicity when reusing; a fresh
        // instance was already seeded at this level.
        instance.max_level = *level;
        // Subclass designations change at higher levels (e.g. Sorceress
        // -> Stormweaver); always take the latest reported value.
        instance.class_name = class_name.clone();
        instance.last_seen = timestamp;

        tracing::info!("[STATE] {name} ({class_name}) reached level {level}");
        true
    }

    /// Ensure `name` has an active instance, creating a fresh one when
    /// the reuse heuristic rejects the current candidate. New instances
    /// are seeded from the raw event's own fields only (a death line
    /// contributes neither class nor level) plus the last recorded area.
    fn resolve_instance(
        &self,
        cache: &mut SessionCache,
        name: &str,
        class_name: Option<&str>,
        level: Option<u32>,
        timestamp: NaiveDateTime,
    ) {
        if let Some(active) = cache.active_instance(name)
            && self.should_reuse_active(active, level)
        {
            return;
        }

        let area = cache.current_area.as_ref().map(|a| a.name.clone());
        let instance = CharacterInstance::new(
            name.to_string(),
            class_name.map(str::to_string),
            level,
            timestamp,
            area,
            cache.recent_cap(),
        );
        tracing::info!(
            "[STATE] new character instance {name} (class {}, level {})",
            instance.class_name,
            instance.max_level
        );
        cache.push_instance(instance);
    }

    /// The instance-boundary heuristic. `level` is whatever level the
    /// event itself carried, if any.
    fn should_reuse_active(&self, active: &CharacterInstance, level: Option<u32>) -> bool {
        match level {
            // Level-less events (deaths): an instance that has leveled is
            // treated as a continuation of the same run; for one that
            // never did, the policy decides.
            None => active.max_level > 1 || self.policy == ResolutionPolicy::MergeUnleveled,
            // A level regression, or an instance whose class never
            // resolved, is evidence of a different character.
            Some(level) => level > active.max_level && active.class_name != UNKNOWN_CLASS,
        }
    }
}
