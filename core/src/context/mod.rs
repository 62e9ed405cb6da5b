mod app_config;
mod enricher;
mod tracker_session;

pub use app_config::{APP_NAME, AppConfig};
pub use enricher::{CharacterContext, ContextEnricher};
pub use tracker_session::TrackerSession;
