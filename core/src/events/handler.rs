use super::StateSnapshot;
use crate::log::EnrichedEvent;

/// Receives a read-only snapshot after each live state-changing event.
///
/// Implementations render or forward the data; they have no influence on
/// core state. Failures must stay inside the sink (log and move on) so a
/// slow or broken consumer can never stall log ingestion.
pub trait SnapshotSink {
    fn handle_snapshot(&mut self, event: &EnrichedEvent, snapshot: &StateSnapshot);
}
