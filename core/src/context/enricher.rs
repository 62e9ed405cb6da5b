use crate::log::{CharacterRecord, EnrichedEvent, GameEvent};

/// Last known character identity, accumulated across events.
///
/// A flat memoization of the most recent values: a field is overwritten
/// whenever an event supplies something more specific and is never rolled
/// back. Instance-boundary detection is the EventProcessor's job, not
/// this one's.
#[derive(Debug, Clone, Default)]
pub struct CharacterContext {
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub level: Option<u32>,
    pub area: Option<String>,
}

/// Fills in the fields a raw event could not determine from its line
/// alone (a death line carries no class, level, or area).
#[derive(Debug, Default)]
pub struct ContextEnricher {
    context: CharacterContext,
}

impl ContextEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &CharacterContext {
        &self.context
    }

    pub fn process(&mut self, event: GameEvent, is_startup: bool) -> EnrichedEvent {
        self.absorb(&event);
        // absorb() ran first, so the context already carries this event's
        // own identity fields; the snapshot below is the enriched record.
        let character = CharacterRecord {
            name: self.context.name.clone().unwrap_or_default(),
            class_name: self.context.class_name.clone(),
            level: self.context.level,
            area: self.context.area.clone(),
        };
        EnrichedEvent {
            event,
            character,
            is_startup,
        }
    }

    /// Fold identity-bearing fields into the stored context. Name always
    /// overwrites when present and non-empty; class and level only on
    /// level-ups; area only on area generation.
    fn absorb(&mut self, event: &GameEvent) {
        if let Some(name) = event.character_name()
            && !name.is_empty()
        {
            self.context.name = Some(name.to_string());
        }
        match event {
            GameEvent::LevelUp {
                class_name, level, ..
            } => {
                self.context.class_name = Some(class_name.clone());
                self.context.level = Some(*level);
            }
            GameEvent::AreaGenerated { name, .. } => {
                self.context.area = Some(name.clone());
            }
            _ => {}
        }
    }
}
