//! Services
//!
//! Progression repository, membership tracking and the tick scheduler.

pub mod engine;
pub mod membership;
pub mod repository;

pub use engine::{level_up_message, EngineConfig, MemberOutcome, ProgressionEngine, TickReport};
pub use membership::MembershipTracker;
pub use repository::{Lookup, ProgressionRepository, RecordSource, RepositoryConfig};
