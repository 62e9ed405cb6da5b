pub mod context;
pub mod discover;
pub mod error;
pub mod events;
pub mod log;
pub mod session;
pub mod sinks;
pub mod tail;

// Re-exports for convenience
pub use context::{AppConfig, CharacterContext, ContextEnricher, TrackerSession};
pub use error::{Error, Result};
pub use events::{EventProcessor, ResolutionPolicy, SnapshotSink, StateSnapshot};
pub use log::{EnrichedEvent, GameEvent, LineClassifier};
pub use session::SessionCache;
pub use tail::{LogTailer, TailMessage, TailerHandle};
