use std::path::PathBuf;

use crate::context::AppConfig;
use crate::context::enricher::ContextEnricher;
use crate::events::{EventProcessor, ResolutionPolicy, SnapshotSink};
use crate::session::{SessionCache, persist};
use crate::tail::TailMessage;

/// Owns the enrichment and aggregation stages and fans snapshots out to
/// registered sinks. Exactly one logical event stream flows through here;
/// there is no internal parallelism.
pub struct TrackerSession {
    enricher: ContextEnricher,
    processor: EventProcessor,
    cache: SessionCache,
    sinks: Vec<Box<dyn SnapshotSink + Send>>,
    state_file: Option<PathBuf>,
}

impl TrackerSession {
    pub fn new(config: &AppConfig) -> Self {
        let policy = if config.fresh_instance_on_unleveled_death {
            ResolutionPolicy::FreshOnUnleveled
        } else {
            ResolutionPolicy::MergeUnleveled
        };
        Self {
            enricher: ContextEnricher::new(),
            processor: EventProcessor::new(policy),
            cache: SessionCache::new(config.recent_deaths_cap),
            sinks: Vec::new(),
            state_file: config.write_state_file.then(|| config.state_file()),
        }
    }

    /// Resume from previously persisted state instead of an empty cache.
    /// Pair this with a tailer that skips the startup replay, or the
    /// restored totals will be counted a second time.
    pub fn with_cache(mut self, cache: SessionCache) -> Self {
        self.cache = cache;
        self
    }

    /// Register a sink to receive snapshots of live state changes.
    pub fn add_sink(&mut self, sink: Box<dyn SnapshotSink + Send>) {
        self.sinks.push(sink);
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// Drive one tail message through enrichment and aggregation.
    pub fn process_message(&mut self, message: TailMessage) {
        match message {
            TailMessage::StartupComplete => {
                tracing::info!(
                    "[SESSION] startup replay complete; {} deaths across {} instances",
                    self.cache.global.deaths.total,
                    self.cache.instance_count()
                );
                // Replayed totals are saved right away so the next start
                // can resume without re-reading the whole log.
                self.persist();
            }
            TailMessage::Event { event, is_startup } => {
                let enriched = self.enricher.process(event, is_startup);
                if let Some(snapshot) = self.processor.process_event(&enriched, &mut self.cache) {
                    for sink in &mut self.sinks {
                        sink.handle_snapshot(&enriched, &snapshot);
                    }
                    self.persist();
                }
            }
        }
    }

    fn persist(&self) {
        let Some(path) = &self.state_file else {
            return;
        };
        if let Err(err) = persist::save(&self.cache, path) {
            tracing::warn!("[SESSION] failed to persist state to {}: {err}", path.display());
        }
    }
}
