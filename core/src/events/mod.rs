pub mod handler;
pub mod processor;
pub mod snapshot;


pub use handler::SnapshotSink;
pub use processor::{EventProcessor, ResolutionPolicy};
pub use snapshot::StateSnapshot;
