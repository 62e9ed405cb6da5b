pub mod cache;
pub mod instance;
pub mod persist;

pub use cache::{AreaInfo, SessionCache};
pub use instance::{
    CharacterInstance, DeathRecord, DeathTally, GlobalStats, League, LeagueStatus, UNKNOWN_CLASS,
};
pub use persist::SavedState;
