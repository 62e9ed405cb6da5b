pub mod classifier;
pub mod event;

pub use classifier::LineClassifier;
pub use event::{CharacterRecord, EnrichedEvent, GameEvent, LOG_TIMESTAMP_FORMAT};
