pub mod config;
pub mod field;
pub mod journal;
pub mod overworld;
pub mod replay;
pub mod scenario;
pub mod session;
pub mod sight;
pub mod state;
pub mod types;

pub use config::SightConfig;
pub use field::Field;
pub use journal::{InputJournal, InputPayload, InputRecord};
pub use overworld::Overworld;
pub use replay::*;
pub use scenario::{ScenarioError, ScenarioFile};
pub use session::{AdvanceResult, AdvanceStopReason, Session, SessionError};
pub use sight::{ApproachFollowup, ApproachingTrainer, TrainerSight};
pub use state::{Actor, Map, Tile};
pub use types::*;
